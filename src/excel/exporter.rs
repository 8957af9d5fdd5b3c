//! Excel exporter - consolidated dataset → .xlsx

use crate::error::{ConsolidationError, ConsolidationResult};
use crate::types::{CellValue, Dataset};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

const SHEET_NAME: &str = "Consolidated";

/// Writes a [`Dataset`] to a single "Consolidated" worksheet
pub struct DatasetExporter<'a> {
    dataset: &'a Dataset,
}

impl<'a> DatasetExporter<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Export to an .xlsx file on disk
    pub fn export(&self, output_path: &Path) -> ConsolidationResult<()> {
        let mut workbook = self.build()?;
        workbook
            .save(output_path)
            .map_err(|e| ConsolidationError::Export(format!("Failed to save Excel file: {}", e)))
    }

    /// Export to an in-memory .xlsx payload
    pub fn to_bytes(&self) -> ConsolidationResult<Vec<u8>> {
        let mut workbook = self.build()?;
        workbook
            .save_to_buffer()
            .map_err(|e| ConsolidationError::Export(format!("Failed to build Excel file: {}", e)))
    }

    fn build(&self) -> ConsolidationResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .map_err(|e| ConsolidationError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let header_format = Format::new().set_bold();
        for (col_idx, name) in self.dataset.columns().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col_index(col_idx)?, name, &header_format)
                .map_err(|e| ConsolidationError::Export(format!("Failed to write header: {}", e)))?;
        }

        for row_idx in 0..self.dataset.len() {
            // Row 0 holds the headers
            let excel_row = u32::try_from(row_idx + 1)
                .map_err(|_| ConsolidationError::Export("Too many rows for Excel".to_string()))?;
            for (col_idx, name) in self.dataset.columns().iter().enumerate() {
                let value = self.dataset.value(row_idx, name);
                write_cell(worksheet, excel_row, col_index(col_idx)?, &value)?;
            }
        }

        Ok(workbook)
    }
}

fn col_index(idx: usize) -> ConsolidationResult<u16> {
    u16::try_from(idx)
        .map_err(|_| ConsolidationError::Export("Too many columns for Excel".to_string()))
}

/// Null cells are left unwritten
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> ConsolidationResult<()> {
    let result = match value {
        CellValue::Empty => return Ok(()),
        CellValue::Number(n) => worksheet.write_number(row, col, *n),
        CellValue::Text(s) => worksheet.write_string(row, col, s),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
    };
    result
        .map(|_| ())
        .map_err(|e| ConsolidationError::Export(format!("Failed to write cell: {}", e)))
}
