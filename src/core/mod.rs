//! Normalizer & classifier, and the consolidation pipeline built on the extractor

pub mod classifier;
pub mod coerce;
pub mod columns;
pub mod consolidator;
pub mod diagnostics;
pub mod normalizer;

pub use classifier::Classifier;
pub use columns::HeaderNormalizer;
pub use consolidator::{Consolidator, Outcome};
pub use diagnostics::{Diagnostics, SheetReport, SheetStatus};
pub use normalizer::{NormalizedSheet, SheetNormalizer};
