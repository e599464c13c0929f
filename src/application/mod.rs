/// Application layer - Use cases, pipeline stages and DTOs
///
/// This layer orchestrates domain services and coordinates with
/// infrastructure through ports.
pub mod dto;
pub mod pipeline;
pub mod use_cases;
