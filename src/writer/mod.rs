//! Dataset output: CSV, JSON and (via the Excel exporter) xlsx

use crate::error::{ConsolidationError, ConsolidationResult};
use crate::excel::DatasetExporter;
use crate::types::{CellValue, Dataset};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Output format chosen from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Xlsx,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> ConsolidationResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(OutputFormat::Csv),
            Some("json") => Ok(OutputFormat::Json),
            Some("xlsx") => Ok(OutputFormat::Xlsx),
            _ => Err(ConsolidationError::Export(format!(
                "Unsupported output format for '{}' (expected .csv, .json or .xlsx)",
                path.display()
            ))),
        }
    }
}

/// Write CSV with a header row and no index column; nulls are empty fields
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> ConsolidationResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(dataset.columns())
        .map_err(|e| ConsolidationError::Export(format!("Failed to write CSV header: {}", e)))?;

    for row in 0..dataset.len() {
        let fields: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| dataset.value(row, column).render())
            .collect();
        csv_writer
            .write_record(&fields)
            .map_err(|e| ConsolidationError::Export(format!("Failed to write CSV row: {}", e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ConsolidationError::Export(format!("Failed to flush CSV: {}", e)))
}

pub fn to_csv_string(dataset: &Dataset) -> ConsolidationResult<String> {
    let mut buffer = Vec::new();
    write_csv(dataset, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ConsolidationError::Export(format!("CSV is not valid UTF-8: {}", e)))
}

/// One JSON object per record, keyed by column; nulls are kept as `null`
pub fn to_json_value(dataset: &Dataset) -> Value {
    let rows = (0..dataset.len())
        .map(|row| {
            let object: Map<String, Value> = dataset
                .columns()
                .iter()
                .map(|column| (column.clone(), cell_to_json(&dataset.value(row, column))))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

pub fn to_json(dataset: &Dataset) -> ConsolidationResult<String> {
    serde_json::to_string_pretty(&to_json_value(dataset))
        .map_err(|e| ConsolidationError::Export(format!("Failed to serialize JSON: {}", e)))
}

fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
        CellValue::Text(s) => Value::String(s.clone()),
    }
}

/// Write the dataset to `path`, picking the format from its extension
pub fn write_dataset(dataset: &Dataset, path: &Path) -> ConsolidationResult<OutputFormat> {
    let format = OutputFormat::from_path(path)?;
    match format {
        OutputFormat::Csv => write_csv(dataset, File::create(path)?)?,
        OutputFormat::Json => fs::write(path, to_json(dataset)?)?,
        OutputFormat::Xlsx => DatasetExporter::new(dataset).export(path)?,
    }
    Ok(format)
}
