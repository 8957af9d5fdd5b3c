//! Per-sheet normalization: header keys, quantity filter, provenance, classification

use crate::config::EngineConfig;
use crate::core::classifier::Classifier;
use crate::core::coerce::{to_code, to_number, Coerced};
use crate::core::columns::HeaderNormalizer;
use crate::core::diagnostics::{SheetReport, SheetStatus};
use crate::error::ConsolidationResult;
use crate::types::{
    CellValue, ConsolidatedRecord, RawSheetTable, AMC_NAME, INSTRUMENT_TYPE, REPORTING_DATE,
    SCHEME_NAME,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Output of normalizing one sheet
#[derive(Debug, Clone)]
pub struct NormalizedSheet {
    /// Normalized source columns in sheet order
    pub columns: Vec<String>,
    pub records: Vec<ConsolidatedRecord>,
    pub report: SheetReport,
    pub coercion_failures: usize,
}

/// Column positions of the typed fields within one sheet
struct Layout {
    keys: Vec<String>,
    code: Option<usize>,
    quantity: usize,
    market_value: Option<usize>,
    pct: Option<usize>,
}

impl Layout {
    fn is_typed(&self, idx: usize) -> bool {
        Some(idx) == self.code
            || idx == self.quantity
            || Some(idx) == self.market_value
            || Some(idx) == self.pct
    }
}

fn is_stamped(key: &str) -> bool {
    matches!(key, SCHEME_NAME | AMC_NAME | REPORTING_DATE | INSTRUMENT_TYPE)
}

pub struct SheetNormalizer<'a> {
    config: &'a EngineConfig,
    headers: HeaderNormalizer,
    classifier: Classifier,
}

impl<'a> SheetNormalizer<'a> {
    pub fn new(config: &'a EngineConfig) -> ConsolidationResult<Self> {
        Ok(Self {
            config,
            headers: HeaderNormalizer::new()?,
            classifier: Classifier::new(&config.classification),
        })
    }

    /// Normalize one sheet. Never fails: bad cells become null, bad rows are dropped.
    pub fn normalize(&self, table: &RawSheetTable) -> NormalizedSheet {
        let keys = self.headers.normalize_all(&table.headers);
        let columns = &self.config.columns;
        let find = |key: &str| keys.iter().position(|k| k == key);

        let Some(quantity) = find(&columns.quantity) else {
            debug!(sheet = %table.name, "no quantity column, skipping sheet");
            return NormalizedSheet {
                columns: Vec::new(),
                records: Vec::new(),
                report: SheetReport {
                    name: table.name.clone(),
                    raw_rows: table.row_count(),
                    kept_rows: 0,
                    status: SheetStatus::MissingQuantity,
                },
                coercion_failures: 0,
            };
        };

        let layout = Layout {
            code: find(&columns.instrument_code),
            quantity,
            market_value: find(&columns.market_fair_value),
            pct: find(&columns.pct_to_net_assets),
            keys: keys.clone(),
        };

        let mut failures = 0;
        let mut records = Vec::new();
        for row in 0..table.row_count() {
            let coerced = to_number(table.cell(row, layout.quantity));
            if coerced.is_failure() {
                failures += 1;
            }
            let code = layout.code.and_then(|idx| to_code(table.cell(row, idx)));

            let (Some(code), Some(qty)) = (code, coerced.value()) else {
                continue;
            };
            if qty <= 0.0 {
                continue;
            }

            records.push(self.build_record(table, row, &layout, code, qty, &mut failures));
        }

        let kept = records.len();
        debug!(
            sheet = %table.name,
            raw_rows = table.row_count(),
            kept_rows = kept,
            "normalized sheet"
        );

        NormalizedSheet {
            columns: keys.into_iter().filter(|k| !is_stamped(k)).collect(),
            records,
            report: SheetReport {
                name: table.name.clone(),
                raw_rows: table.row_count(),
                kept_rows: kept,
                status: if kept == 0 {
                    SheetStatus::NoQualifyingRows
                } else {
                    SheetStatus::Consolidated
                },
            },
            coercion_failures: failures,
        }
    }

    fn build_record(
        &self,
        table: &RawSheetTable,
        row: usize,
        layout: &Layout,
        instrument_code: String,
        quantity: f64,
        failures: &mut usize,
    ) -> ConsolidatedRecord {
        let mut numeric = |idx: Option<usize>| -> Option<f64> {
            let coerced = idx.map_or(Coerced::Missing, |i| to_number(table.cell(row, i)));
            if coerced.is_failure() {
                *failures += 1;
            }
            coerced.value()
        };
        let market_fair_value = numeric(layout.market_value);
        let pct_to_net_assets = numeric(layout.pct);

        let mut extra = BTreeMap::new();
        for (idx, key) in layout.keys.iter().enumerate() {
            if layout.is_typed(idx) || is_stamped(key) {
                continue;
            }
            let cell = table.cell(row, idx);
            if !matches!(cell, CellValue::Empty) {
                extra.insert(key.clone(), cell.clone());
            }
        }

        let instrument_type = self.classifier.classify(|field| {
            layout
                .keys
                .iter()
                .position(|k| k == field)
                .map(|idx| table.cell(row, idx))
        });

        ConsolidatedRecord {
            instrument_code,
            quantity,
            market_fair_value,
            pct_to_net_assets,
            scheme_name: table.name.clone(),
            amc_name: self.config.amc_name.clone(),
            reporting_date: self.config.reporting_date,
            instrument_type,
            extra,
        }
    }
}
