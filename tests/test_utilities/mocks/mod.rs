/// Mock implementations for testing
mod failing_graph_store;
mod mock_progress_reporter;
mod mock_vulnerability_feed;

pub use failing_graph_store::{FailPoint, FailingGraphStore};
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_vulnerability_feed::MockVulnerabilityFeed;
