pub mod bom_normalizer;
pub mod version_comparator;

pub use bom_normalizer::{BomNormalizer, NormalizedBom, NOT_KNOWN_PLACEHOLDER};
pub use version_comparator::VersionComparator;
