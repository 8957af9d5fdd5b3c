//! Sheet extractor - workbook bytes → one raw table per scheme sheet

use crate::config::EngineConfig;
use crate::error::{ConsolidationError, ConsolidationResult};
use crate::types::{CellValue, RawSheetTable};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::collections::VecDeque;
use std::io::Cursor;
use tracing::debug;

/// Lazily yields a [`RawSheetTable`] for each data sheet of a workbook
///
/// The index/contents sheet is skipped. Sheets are produced in workbook order.
pub struct SheetExtractor<'a> {
    workbook: Sheets<Cursor<&'a [u8]>>,
    pending: VecDeque<String>,
    header_offset: u32,
    index_sheet: String,
    code_column: String,
    index_sheets_skipped: usize,
}

impl<'a> SheetExtractor<'a> {
    /// Open a workbook payload (xlsx, xlsm, xlsb, xls or ods)
    pub fn from_bytes(bytes: &'a [u8], config: &EngineConfig) -> ConsolidationResult<Self> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ConsolidationError::Format(format!("Failed to open workbook: {}", e)))?;
        let pending = workbook.sheet_names().into_iter().collect();

        Ok(Self {
            workbook,
            pending,
            header_offset: u32::try_from(config.header_offset).unwrap_or(u32::MAX),
            index_sheet: config.index_sheet.to_lowercase(),
            code_column: config.columns.instrument_code.clone(),
            index_sheets_skipped: 0,
        })
    }

    /// Every sheet name in the workbook, index sheet included
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// How many index sheets have been passed over so far
    pub fn index_sheets_skipped(&self) -> usize {
        self.index_sheets_skipped
    }

    fn is_index_sheet(&self, name: &str) -> bool {
        name.to_lowercase() == self.index_sheet
    }

    fn extract(&mut self, name: &str) -> ConsolidationResult<RawSheetTable> {
        let range = self.workbook.worksheet_range(name).map_err(|e| {
            ConsolidationError::Format(format!("Failed to read sheet '{}': {}", name, e))
        })?;
        let table = table_from_range(name, &range, self.header_offset, &self.code_column);
        debug!(
            sheet = name,
            columns = table.headers.len(),
            rows = table.row_count(),
            "extracted sheet"
        );
        Ok(table)
    }
}

impl Iterator for SheetExtractor<'_> {
    type Item = ConsolidationResult<RawSheetTable>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let name = self.pending.pop_front()?;
            if self.is_index_sheet(&name) {
                debug!(sheet = %name, "skipping index sheet");
                self.index_sheets_skipped += 1;
                continue;
            }
            return Some(self.extract(&name));
        }
    }
}

/// Build a table from a worksheet range, reading headers at absolute row `header_row`
fn table_from_range(
    name: &str,
    range: &Range<Data>,
    header_row: u32,
    code_column: &str,
) -> RawSheetTable {
    let Some((last_row, last_col)) = range.end() else {
        return RawSheetTable::new(name, Vec::new());
    };
    if range.is_empty() || header_row > last_row {
        return RawSheetTable::new(name, Vec::new());
    }

    // Absolute coordinates: the used range may start below row 0 or right of column A
    let cell_at = |row: u32, col: u32| -> CellValue {
        range
            .get_value((row, col))
            .map(convert_cell)
            .unwrap_or_default()
    };

    let raw_headers: Vec<CellValue> = (0..=last_col).map(|col| cell_at(header_row, col)).collect();
    let headers = label_headers(&raw_headers, code_column);

    let mut table = RawSheetTable::new(name, headers);
    for row in header_row.saturating_add(1)..=last_row {
        let cells: Vec<CellValue> = (0..=last_col).map(|col| cell_at(row, col)).collect();
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    table
}

/// Header labels; the first unlabeled column holds the instrument code
fn label_headers(raw: &[CellValue], code_column: &str) -> Vec<String> {
    let mut code_assigned = false;
    raw.iter()
        .enumerate()
        .map(|(idx, cell)| {
            if !cell.is_blank() {
                return cell.render();
            }
            if code_assigned {
                format!("unnamed_{}", idx)
            } else {
                code_assigned = true;
                code_column.to_string()
            }
        })
        .collect()
}

/// Convert calamine cell data
fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut Workbook)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(&mut workbook);
        workbook.save_to_buffer().unwrap()
    }

    fn scheme_sheet(workbook: &mut Workbook, name: &str) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        sheet.write_string(0, 0, "Axis Mutual Fund").unwrap();
        sheet.write_string(1, 0, "Portfolio as on 31-Dec-2025").unwrap();
        sheet.write_string(3, 1, "Name of the Instrument").unwrap();
        sheet.write_string(3, 2, "Quantity").unwrap();
        sheet.write_string(4, 0, "INE001").unwrap();
        sheet.write_string(4, 1, "ABC Bond 8%").unwrap();
        sheet.write_number(4, 2, 100.0).unwrap();
        sheet.write_string(6, 0, "INE002").unwrap();
        sheet.write_number(6, 2, 5.0).unwrap();
    }

    #[test]
    fn test_label_headers_first_blank_is_code() {
        let raw = vec![
            CellValue::Empty,
            CellValue::text("Name"),
            CellValue::Empty,
            CellValue::Number(2025.0),
        ];
        assert_eq!(
            label_headers(&raw, "instrument_code"),
            vec!["instrument_code", "Name", "unnamed_2", "2025"]
        );
    }

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(convert_cell(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(
            convert_cell(&Data::String("x".to_string())),
            CellValue::text("x")
        );
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_extracts_after_header_offset() {
        let bytes = workbook_bytes(|wb| scheme_sheet(wb, "Scheme A"));
        let config = EngineConfig::default();
        let tables: Vec<RawSheetTable> = SheetExtractor::from_bytes(&bytes, &config)
            .unwrap()
            .collect::<ConsolidationResult<_>>()
            .unwrap();

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name, "Scheme A");
        assert_eq!(
            table.headers,
            vec!["instrument_code", "Name of the Instrument", "Quantity"]
        );
        // blank row 5 dropped
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), &CellValue::text("INE001"));
        assert_eq!(table.cell(1, 2), &CellValue::Number(5.0));
    }

    #[test]
    fn test_index_sheet_skipped_any_case() {
        let bytes = workbook_bytes(|wb| {
            wb.add_worksheet().set_name("INDEX").unwrap();
            scheme_sheet(wb, "Scheme A");
            wb.add_worksheet().set_name("index").unwrap();
        });
        let config = EngineConfig::default();
        let mut extractor = SheetExtractor::from_bytes(&bytes, &config).unwrap();
        let names: Vec<String> = extractor
            .by_ref()
            .map(|t| t.unwrap().name)
            .collect();

        assert_eq!(names, vec!["Scheme A"]);
        assert_eq!(extractor.index_sheets_skipped(), 2);
    }

    #[test]
    fn test_sheet_shorter_than_offset_is_empty() {
        let bytes = workbook_bytes(|wb| {
            let sheet = wb.add_worksheet();
            sheet.set_name("Tiny").unwrap();
            sheet.write_string(0, 0, "title only").unwrap();
        });
        let config = EngineConfig::default();
        let tables: Vec<RawSheetTable> = SheetExtractor::from_bytes(&bytes, &config)
            .unwrap()
            .map(|t| t.unwrap())
            .collect();

        assert_eq!(tables.len(), 1);
        assert!(tables[0].is_empty());
    }

    #[test]
    fn test_corrupt_payload_is_format_error() {
        let config = EngineConfig::default();
        let result = SheetExtractor::from_bytes(b"definitely not a workbook", &config);
        assert!(matches!(result, Err(ConsolidationError::Format(_))));
    }
}
