use super::batch_writer::BatchWriter;
use crate::application::dto::{EnrichmentOutcome, EnrichmentStatus};
use crate::bom_import::domain::{ImportPhase, Vulnerability};
use crate::ports::outbound::{GraphStore, ProgressReporter, VulnerabilityFeed};
use crate::shared::error::ImportError;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Feed answer for one component purl
#[derive(Debug)]
pub struct FeedLookup {
    pub purl: String,
    pub result: Result<Vec<Vulnerability>, ImportError>,
}

/// Fetches vulnerabilities for the components of one project version and
/// links them in the store.
///
/// Lookups run chunk by chunk; the lookups inside a chunk run together.
/// A failed lookup is recorded for its component and does not stop the
/// others. Persisting runs per component with bounded concurrency and every
/// task is awaited before the phase ends.
pub struct VulnerabilityEnricher<'a, S: ?Sized, F: ?Sized> {
    store: &'a S,
    feed: &'a F,
    project_version_id: &'a str,
    chunk_size: usize,
    concurrency: usize,
    cancellation: &'a CancellationToken,
}

impl<'a, S, F> VulnerabilityEnricher<'a, S, F>
where
    S: GraphStore + ?Sized,
    F: VulnerabilityFeed + ?Sized,
{
    pub fn new(
        store: &'a S,
        feed: &'a F,
        project_version_id: &'a str,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            store,
            feed,
            project_version_id,
            chunk_size: 10,
            concurrency: 4,
            cancellation,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Looks up every purl, returning one entry per purl in input order
    pub async fn fetch(
        &self,
        purls: &[String],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<FeedLookup>, ImportError> {
        let feed = self.feed;

        BatchWriter::new(ImportPhase::FetchVulnerabilities, self.chunk_size)
            .with_cancellation(self.cancellation)
            .run(purls, progress, |_, chunk| async move {
                let lookups = join_all(chunk.iter().map(|purl| async move {
                    let result = feed.fetch_vulnerabilities(purl).await.map_err(|e| {
                        tracing::warn!(purl = %purl, error = %e, "vulnerability lookup failed");
                        ImportError::ExternalFeed {
                            purl: purl.clone(),
                            details: format!("{:#}", e),
                        }
                    });
                    FeedLookup {
                        purl: purl.clone(),
                        result,
                    }
                }))
                .await;
                Ok::<_, anyhow::Error>(lookups)
            })
            .await
    }

    /// Writes the fetched vulnerabilities, returning one outcome per lookup
    /// in input order.
    ///
    /// Components still waiting when the import is cancelled are not
    /// written; the phase then fails with `Cancelled`.
    pub async fn persist(
        &self,
        lookups: Vec<FeedLookup>,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<EnrichmentOutcome>, ImportError> {
        let phase = ImportPhase::PersistVulnerabilities;
        let total = lookups.len();

        let mut pending = stream::iter(lookups.into_iter().enumerate())
            .map(|(index, lookup)| async move {
                if self.cancellation.is_cancelled() {
                    return (index, None);
                }
                let status = self.persist_one(&lookup).await;
                (index, Some(EnrichmentOutcome::new(lookup.purl, status)))
            })
            .buffer_unordered(self.concurrency);

        let mut outcomes: Vec<Option<EnrichmentOutcome>> = vec![None; total];
        let mut done = 0;
        let mut cancelled = false;
        while let Some((index, outcome)) = pending.next().await {
            done += 1;
            match outcome {
                Some(outcome) => outcomes[index] = Some(outcome),
                None => cancelled = true,
            }
            progress.report_progress(
                phase.interpolate(done, total),
                &phase.step_message(done, total),
            );
        }

        if cancelled {
            return Err(ImportError::Cancelled { phase });
        }
        Ok(outcomes.into_iter().flatten().collect())
    }

    async fn persist_one(&self, lookup: &FeedLookup) -> EnrichmentStatus {
        let vulnerabilities = match &lookup.result {
            Ok(vulnerabilities) if vulnerabilities.is_empty() => return EnrichmentStatus::Clean,
            Ok(vulnerabilities) => vulnerabilities,
            Err(e) => return EnrichmentStatus::FeedFailed(e.to_string()),
        };

        let mut seen = HashSet::new();
        let mut linked = 0;
        let mut created = 0;
        for vulnerability in vulnerabilities {
            if !seen.insert(vulnerability.identifier.as_str()) {
                continue;
            }

            let upsert = match self.store.upsert_vulnerability(vulnerability).await {
                Ok(upsert) => upsert,
                Err(e) => return self.persist_failed(&lookup.purl, &vulnerability.identifier, e),
            };
            if let Err(e) = self
                .store
                .connect_vulnerability_to_component(&upsert.id, &lookup.purl, self.project_version_id)
                .await
            {
                return self.persist_failed(&lookup.purl, &vulnerability.identifier, e);
            }

            linked += 1;
            if upsert.created {
                created += 1;
            }
        }

        EnrichmentStatus::Linked {
            vulnerabilities: linked,
            created,
        }
    }

    fn persist_failed(&self, purl: &str, identifier: &str, error: anyhow::Error) -> EnrichmentStatus {
        tracing::warn!(purl, identifier, error = %error, "failed to store vulnerability");
        EnrichmentStatus::PersistFailed(format!("{}: {:#}", identifier, error))
    }
}
