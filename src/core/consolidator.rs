//! Consolidation pipeline: workbook → per-sheet tables → one dataset

use crate::config::EngineConfig;
use crate::core::columns::HeaderNormalizer;
use crate::core::diagnostics::Diagnostics;
use crate::core::normalizer::SheetNormalizer;
use crate::error::ConsolidationResult;
use crate::excel::SheetExtractor;
use crate::types::{
    Dataset, FieldSlot, RawSheetTable, AMC_NAME, INSTRUMENT_TYPE, REPORTING_DATE, SCHEME_NAME,
};
use serde::Serialize;
use tracing::{info, warn};

/// Result of one consolidation call
///
/// `Empty` means no sheet contributed a single qualifying row, which callers
/// must be able to tell apart from a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Consolidated {
        dataset: Dataset,
        diagnostics: Diagnostics,
    },
    Empty {
        diagnostics: Diagnostics,
    },
}

impl Outcome {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            Outcome::Consolidated { dataset, .. } => Some(dataset),
            Outcome::Empty { .. } => None,
        }
    }

    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            Outcome::Consolidated { dataset, .. } => Some(dataset),
            Outcome::Empty { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Outcome::Consolidated { diagnostics, .. } | Outcome::Empty { diagnostics } => {
                diagnostics
            }
        }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Outcome::Empty { .. })
    }
}

/// The consolidation engine; a pure function of its configuration and input
pub struct Consolidator {
    config: EngineConfig,
}

impl Consolidator {
    /// Validates `config` and brings its column keys into header-key form
    pub fn new(config: EngineConfig) -> ConsolidationResult<Self> {
        let config = config.normalize_keys(&HeaderNormalizer::new()?);
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consolidate a workbook payload. Only an unreadable workbook is an error.
    pub fn consolidate_bytes(&self, bytes: &[u8]) -> ConsolidationResult<Outcome> {
        let mut extractor = SheetExtractor::from_bytes(bytes, &self.config)?;
        let mut outcome = self.consolidate_sheets(extractor.by_ref())?;
        let skipped = extractor.index_sheets_skipped();
        match &mut outcome {
            Outcome::Consolidated { diagnostics, .. } | Outcome::Empty { diagnostics } => {
                diagnostics.index_sheets_skipped = skipped;
            }
        }
        Ok(outcome)
    }

    /// Consolidate already-extracted sheets, in the order given
    pub fn consolidate_sheets<I>(&self, sheets: I) -> ConsolidationResult<Outcome>
    where
        I: IntoIterator<Item = ConsolidationResult<RawSheetTable>>,
    {
        let normalizer = SheetNormalizer::new(&self.config)?;
        let mut diagnostics = Diagnostics::default();
        let mut columns: Vec<String> = Vec::new();
        let mut records = Vec::new();

        for sheet in sheets {
            let table = sheet?;
            let normalized = normalizer.normalize(&table);
            diagnostics.coercion_failures += normalized.coercion_failures;
            diagnostics.record_sheet(normalized.report);

            if normalized.records.is_empty() {
                continue;
            }
            for column in normalized.columns {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
            records.extend(normalized.records);
        }

        if records.is_empty() {
            warn!(
                sheets = diagnostics.sheets.len(),
                skipped = diagnostics.sheets_skipped,
                rows_filtered = diagnostics.rows_filtered,
                "no sheet contributed holdings"
            );
            return Ok(Outcome::Empty { diagnostics });
        }

        columns.extend(
            [SCHEME_NAME, AMC_NAME, REPORTING_DATE, INSTRUMENT_TYPE]
                .iter()
                .map(|c| c.to_string()),
        );

        info!(
            sheets = diagnostics.contributing_sheets(),
            records = records.len(),
            rows_filtered = diagnostics.rows_filtered,
            "consolidated portfolio"
        );

        let dataset = Dataset::new(columns, records, self.slots());
        Ok(Outcome::Consolidated {
            dataset,
            diagnostics,
        })
    }

    fn slots(&self) -> Vec<(String, FieldSlot)> {
        let keys = &self.config.columns;
        vec![
            (keys.instrument_code.clone(), FieldSlot::InstrumentCode),
            (keys.quantity.clone(), FieldSlot::Quantity),
            (keys.market_fair_value.clone(), FieldSlot::MarketFairValue),
            (keys.pct_to_net_assets.clone(), FieldSlot::PctToNetAssets),
        ]
    }
}
