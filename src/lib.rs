//! Portfolio Consolidator - one holdings dataset from a monthly portfolio disclosure
//!
//! A fund house publishes one worksheet per scheme, each with a few title rows,
//! a header row, holdings interleaved with subtotal rows, and an optional index
//! sheet. This library turns such a workbook into a single normalized dataset.
//!
//! # Pipeline
//!
//! - [`excel::SheetExtractor`] reads each sheet from the configured header row
//! - [`core::SheetNormalizer`] normalizes headers, filters rows without a code or
//!   a positive quantity, stamps provenance and classifies each holding
//! - [`core::Consolidator`] runs both and returns an [`Outcome`]
//!
//! # Example
//!
//! ```no_run
//! use portfolio_consolidator::{Consolidator, EngineConfig, Outcome};
//!
//! let bytes = std::fs::read("Monthly Portfolio-31 12 25.xlsx")?;
//! let consolidator = Consolidator::new(EngineConfig::default())?;
//!
//! match consolidator.consolidate_bytes(&bytes)? {
//!     Outcome::Consolidated { dataset, .. } => println!("{} holdings", dataset.len()),
//!     Outcome::Empty { diagnostics } => {
//!         println!("nothing to show ({} sheets skipped)", diagnostics.sheets_skipped)
//!     }
//! }
//! # Ok::<(), portfolio_consolidator::ConsolidationError>(())
//! ```

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::EngineConfig;
pub use crate::core::{Consolidator, Diagnostics, Outcome};
pub use error::{ConsolidationError, ConsolidationResult};
pub use types::{CellValue, ConsolidatedRecord, Dataset, InstrumentType, RawSheetTable};
