/// Use cases module containing application business logic orchestration
mod import_sbom;

pub use import_sbom::ImportSbomUseCase;
