/// Import pipeline stages
///
/// Each stage works against the outbound ports only and reports failures
/// as `ImportError` tagged with the phase they happened in.
mod batch_writer;
mod dependency_graph_builder;
mod import_saga;
mod progress_tracker;
mod project_version_resolver;
mod vulnerability_enricher;

pub use batch_writer::BatchWriter;
pub use dependency_graph_builder::{DependencyGraphBuilder, LinkSummary};
pub use import_saga::ImportSaga;
pub use progress_tracker::ProgressTracker;
pub use project_version_resolver::{ProjectResolution, ProjectVersionResolver, VersionResolution};
pub use vulnerability_enricher::{FeedLookup, VulnerabilityEnricher};
