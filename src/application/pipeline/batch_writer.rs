use crate::bom_import::domain::ImportPhase;
use crate::ports::outbound::ProgressReporter;
use crate::shared::error::ImportError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Chunked executor for store writes.
///
/// Items are split into chunks of `chunk_size` and handed to the write
/// operation one chunk at a time; the next chunk starts only after the
/// previous one finished. After every chunk the phase's progress slice is
/// advanced and reported.
///
/// A failing chunk aborts the remaining ones. Chunks already written are
/// left as they are.
pub struct BatchWriter<'a> {
    phase: ImportPhase,
    chunk_size: usize,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> BatchWriter<'a> {
    /// # Arguments
    /// * `phase` - Phase whose progress slice is interpolated
    /// * `chunk_size` - Items per chunk; 0 is treated as 1
    pub fn new(phase: ImportPhase, chunk_size: usize) -> Self {
        Self {
            phase,
            chunk_size: chunk_size.max(1),
            cancellation: None,
        }
    }

    /// Checks `token` before every chunk
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size)
    }

    /// Runs `write` over every chunk and concatenates the per-item results
    /// in input order.
    ///
    /// `write` receives the index of the chunk's first item in `items`
    /// together with the chunk itself.
    pub async fn run<'i, T, R, F, Fut>(
        &self,
        items: &'i [T],
        progress: &dyn ProgressReporter,
        mut write: F,
    ) -> Result<Vec<R>, ImportError>
    where
        F: FnMut(usize, &'i [T]) -> Fut,
        Fut: Future<Output = crate::shared::Result<Vec<R>>>,
    {
        let total = self.chunk_count(items.len());
        let mut results = Vec::with_capacity(items.len());

        for (index, chunk) in items.chunks(self.chunk_size).enumerate() {
            if self.cancellation.is_some_and(CancellationToken::is_cancelled) {
                return Err(ImportError::Cancelled { phase: self.phase });
            }

            let offset = index * self.chunk_size;
            let written = write(offset, chunk).await.map_err(|e| ImportError::StoreWrite {
                phase: self.phase,
                details: format!("chunk {} of {}: {:#}", index + 1, total, e),
            })?;
            results.extend(written);

            let done = index + 1;
            tracing::debug!(phase = %self.phase, chunk = done, total, "chunk written");
            progress.report_progress(
                self.phase.interpolate(done, total),
                &self.phase.step_message(done, total),
            );
        }

        Ok(results)
    }
}
