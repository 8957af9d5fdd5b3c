//! Excel boundary
//!
//! - Import: workbook bytes → raw per-sheet tables (calamine)
//! - Export: consolidated dataset → .xlsx (rust_xlsxwriter)

mod exporter;
mod extractor;

pub use exporter::DatasetExporter;
pub use extractor::SheetExtractor;
