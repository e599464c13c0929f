/// Ports module defining interfaces for hexagonal architecture
///
/// This module contains both inbound ports (driving ports - the import use
/// case interface) and outbound ports (driven ports - store, feed, progress).
pub mod inbound;
pub mod outbound;
