/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (CLI, job
/// workers) use to interact with the application core.
pub mod sbom_import_port;

pub use sbom_import_port::SbomImportPort;
