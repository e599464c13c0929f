/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod import_options;
mod import_report;
mod import_request;

pub use import_options::ImportOptions;
pub use import_report::{EnrichmentOutcome, EnrichmentStatus, ImportReport};
pub use import_request::{ImportRequest, ImportRequestBuilder};
