/// Domain layer for SBOM import
///
/// Entities of the project graph and the pure services that shape a raw
/// SBOM into them. Nothing in here touches the store or the network.
pub mod domain;
pub mod services;
