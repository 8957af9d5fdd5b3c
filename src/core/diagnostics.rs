//! Counters for the soft conditions met while consolidating

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    /// Contributed at least one record
    Consolidated,
    /// No quantity column; the sheet cannot describe holdings
    MissingQuantity,
    /// Had a quantity column but every row was filtered out
    NoQualifyingRows,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetReport {
    pub name: String,
    pub raw_rows: usize,
    pub kept_rows: usize,
    pub status: SheetStatus,
}

impl SheetReport {
    pub fn dropped_rows(&self) -> usize {
        self.raw_rows - self.kept_rows
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub sheets: Vec<SheetReport>,
    pub index_sheets_skipped: usize,
    /// Sheets skipped for lacking a quantity column
    pub sheets_skipped: usize,
    /// Rows dropped by the instrument-code / quantity predicate
    pub rows_filtered: usize,
    /// Non-empty numeric cells that failed to parse and became null
    pub coercion_failures: usize,
}

impl Diagnostics {
    pub fn record_sheet(&mut self, report: SheetReport) {
        if report.status == SheetStatus::MissingQuantity {
            self.sheets_skipped += 1;
        } else {
            self.rows_filtered += report.dropped_rows();
        }
        self.sheets.push(report);
    }

    pub fn contributing_sheets(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| s.status == SheetStatus::Consolidated)
            .count()
    }

    pub fn kept_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.kept_rows).sum()
    }
}
