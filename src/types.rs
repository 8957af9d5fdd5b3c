use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

//==============================================================================
// Cells
//==============================================================================

/// A single worksheet cell after extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// True for empty cells and text made only of whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form used for keyword matching and CSV output; empty cells render as ""
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Canonical text form of a number: integral values drop the fraction (100.0 → "100")
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

//==============================================================================
// Extraction output
//==============================================================================

/// Table read from one worksheet, labelled with the sheet's own header row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheetTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, column); short rows read as empty
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }
}

//==============================================================================
// Consolidated output
//==============================================================================

/// Instrument category assigned by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstrumentType {
    Debt,
    Other,
    /// Category introduced by configured rules
    Custom(String),
}

impl InstrumentType {
    pub fn as_str(&self) -> &str {
        match self {
            InstrumentType::Debt => "Debt",
            InstrumentType::Other => "Other",
            InstrumentType::Custom(name) => name,
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for InstrumentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Debt" => InstrumentType::Debt,
            "Other" => InstrumentType::Other,
            _ => InstrumentType::Custom(value),
        }
    }
}

impl From<InstrumentType> for String {
    fn from(value: InstrumentType) -> Self {
        value.as_str().to_string()
    }
}

/// Column names stamped on every record after the source columns
pub const SCHEME_NAME: &str = "scheme_name";
pub const AMC_NAME: &str = "amc_name";
pub const REPORTING_DATE: &str = "reporting_date";
pub const INSTRUMENT_TYPE: &str = "instrument_type";

/// One holding in the consolidated dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedRecord {
    pub instrument_code: String,
    pub quantity: f64,
    pub market_fair_value: Option<f64>,
    pub pct_to_net_assets: Option<f64>,
    pub scheme_name: String,
    pub amc_name: String,
    pub reporting_date: NaiveDate,
    pub instrument_type: InstrumentType,
    /// Remaining source columns by normalized name; absent means not reported
    pub extra: BTreeMap<String, CellValue>,
}

/// Which typed field a normalized column name maps onto
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldSlot {
    InstrumentCode,
    Quantity,
    MarketFairValue,
    PctToNetAssets,
}

/// Consolidated holdings handed to the caller
///
/// Immutable once built: only shared accessors are exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<ConsolidatedRecord>,
    #[serde(skip)]
    slots: Vec<(String, FieldSlot)>,
}

impl Dataset {
    pub(crate) fn new(
        columns: Vec<String>,
        records: Vec<ConsolidatedRecord>,
        slots: Vec<(String, FieldSlot)>,
    ) -> Self {
        Self {
            columns,
            records,
            slots,
        }
    }

    /// Ordered union of every column across all sheets
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ConsolidatedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value of `column` for the record at `row`, `CellValue::Empty` when not reported
    pub fn value(&self, row: usize, column: &str) -> CellValue {
        let Some(record) = self.records.get(row) else {
            return CellValue::Empty;
        };

        match column {
            SCHEME_NAME => return CellValue::Text(record.scheme_name.clone()),
            AMC_NAME => return CellValue::Text(record.amc_name.clone()),
            REPORTING_DATE => {
                return CellValue::Text(record.reporting_date.format("%Y-%m-%d").to_string())
            }
            INSTRUMENT_TYPE => return CellValue::Text(record.instrument_type.to_string()),
            _ => {}
        }

        let slot = self
            .slots
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, slot)| slot);

        match slot {
            Some(FieldSlot::InstrumentCode) => CellValue::Text(record.instrument_code.clone()),
            Some(FieldSlot::Quantity) => CellValue::Number(record.quantity),
            Some(FieldSlot::MarketFairValue) => record
                .market_fair_value
                .map_or(CellValue::Empty, CellValue::Number),
            Some(FieldSlot::PctToNetAssets) => record
                .pct_to_net_assets
                .map_or(CellValue::Empty, CellValue::Number),
            None => record.extra.get(column).cloned().unwrap_or_default(),
        }
    }

    /// Record counts per scheme, in first-seen order
    pub fn by_scheme(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|(name, _)| *name == record.scheme_name) {
                Some((_, count)) => *count += 1,
                None => counts.push((record.scheme_name.clone(), 1)),
            }
        }
        counts
    }

    /// Number of records per instrument type
    pub fn type_breakdown(&self) -> BTreeMap<InstrumentType, usize> {
        let mut breakdown = BTreeMap::new();
        for record in &self.records {
            *breakdown.entry(record.instrument_type.clone()).or_insert(0) += 1;
        }
        breakdown
    }

    /// Largest holdings by market value; records without a value are left out
    pub fn top_by_market_value(&self, n: usize) -> Vec<&ConsolidatedRecord> {
        let mut valued: Vec<&ConsolidatedRecord> = self
            .records
            .iter()
            .filter(|r| r.market_fair_value.is_some())
            .collect();
        valued.sort_by(|a, b| {
            let (a, b) = (a.market_fair_value.unwrap_or(0.0), b.market_fair_value.unwrap_or(0.0));
            b.total_cmp(&a)
        });
        valued.truncate(n);
        valued
    }

    /// Sum of market value per scheme (missing values count as nothing)
    pub fn market_value_by_scheme(&self) -> HashMap<String, f64> {
        let mut totals = HashMap::new();
        for record in &self.records {
            if let Some(value) = record.market_fair_value {
                *totals.entry(record.scheme_name.clone()).or_insert(0.0) += value;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_integral() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(50.5), "50.5");
    }

    #[test]
    fn test_cell_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text("INE001").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_instrument_type_string_round() {
        assert_eq!(InstrumentType::from("Debt".to_string()), InstrumentType::Debt);
        assert_eq!(
            InstrumentType::from("Equity".to_string()),
            InstrumentType::Custom("Equity".to_string())
        );
        assert_eq!(String::from(InstrumentType::Other), "Other");
    }

    #[test]
    fn test_instrument_type_serializes_as_string() {
        let json = serde_json::to_string(&InstrumentType::Debt).unwrap();
        assert_eq!(json, "\"Debt\"");
        let parsed: InstrumentType = serde_json::from_str("\"Money Market\"").unwrap();
        assert_eq!(parsed, InstrumentType::Custom("Money Market".to_string()));
    }

    #[test]
    fn test_raw_table_short_row_reads_empty() {
        let mut table = RawSheetTable::new("S", vec!["a".into(), "b".into()]);
        table.push_row(vec![CellValue::text("x")]);
        assert_eq!(table.cell(0, 1), &CellValue::Empty);
        assert_eq!(table.cell(5, 0), &CellValue::Empty);
    }
}
