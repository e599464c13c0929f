/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the import pipeline uses
/// to reach the graph store, the vulnerability feed and the caller's
/// progress sink.
pub mod graph_store;
pub mod progress_reporter;
pub mod sbom_reader;
pub mod vulnerability_feed;

pub use graph_store::{
    DependencyEdge, DependencyLink, GraphStore, LinkOutcome, ProjectLookup, VulnerabilityUpsert,
};
pub use progress_reporter::ProgressReporter;
pub use sbom_reader::SbomReader;
pub use vulnerability_feed::VulnerabilityFeed;
