//! Shared fixtures: disclosure-shaped workbooks built in memory

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, Worksheet};

/// A cell to place in a fixture row
#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Blank,
    Text(&'a str),
    Num(f64),
}

pub const STANDARD_HEADERS: [&str; 6] = [
    "",
    "Name of the Instrument",
    "Rating",
    "Quantity",
    "Market Fair Value (Rs. in Lakhs)",
    "% to Net Assets",
];

/// Builder for a multi-sheet disclosure workbook
pub struct DisclosureBuilder {
    workbook: Workbook,
    header_row: u32,
}

impl DisclosureBuilder {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header_row: 3,
        }
    }

    pub fn header_row(mut self, row: u32) -> Self {
        self.header_row = row;
        self
    }

    /// Index sheet shaped like a scheme sheet, so only its name keeps it out
    pub fn index_sheet(mut self, name: &str) -> Self {
        let header_row = self.header_row;
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        sheet.write_string(0, 0, "Index of schemes").unwrap();
        for (col, header) in STANDARD_HEADERS.iter().enumerate() {
            if !header.is_empty() {
                sheet.write_string(header_row, col as u16, *header).unwrap();
            }
        }
        write_row(
            sheet,
            header_row + 1,
            &holding("IDX001", "Scheme A", "", 1.0, 1.0, 1.0),
        );
        self
    }

    /// Scheme sheet: title rows, header row at `header_row`, then `rows`
    pub fn scheme(mut self, name: &str, headers: &[&str], rows: &[Vec<Cell<'_>>]) -> Self {
        let header_row = self.header_row;
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        sheet.write_string(0, 0, "Axis Mutual Fund").unwrap();
        if header_row > 1 {
            sheet
                .write_string(1, 0, &format!("Portfolio of {} as on 31-Dec-2025", name))
                .unwrap();
        }

        for (col, header) in headers.iter().enumerate() {
            if !header.is_empty() {
                sheet.write_string(header_row, col as u16, *header).unwrap();
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            write_row(sheet, header_row + 1 + idx as u32, row);
        }
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.workbook.save_to_buffer().unwrap()
    }
}

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[Cell<'_>]) {
    for (col, cell) in cells.iter().enumerate() {
        match cell {
            Cell::Blank => {}
            Cell::Text(s) => {
                sheet.write_string(row, col as u16, *s).unwrap();
            }
            Cell::Num(n) => {
                sheet.write_number(row, col as u16, *n).unwrap();
            }
        }
    }
}

/// A standard holding row in `STANDARD_HEADERS` order
pub fn holding<'a>(
    code: &'a str,
    name: &'a str,
    rating: &'a str,
    quantity: f64,
    value: f64,
    pct: f64,
) -> Vec<Cell<'a>> {
    let text = |s: &'a str| if s.is_empty() { Cell::Blank } else { Cell::Text(s) };
    vec![
        text(code),
        text(name),
        text(rating),
        Cell::Num(quantity),
        Cell::Num(value),
        Cell::Num(pct),
    ]
}

/// Subtotal line as disclosures print it between sections
pub fn subtotal<'a>(label: &'a str, value: f64) -> Vec<Cell<'a>> {
    vec![
        Cell::Blank,
        Cell::Text(label),
        Cell::Blank,
        Cell::Blank,
        Cell::Num(value),
        Cell::Blank,
    ]
}

/// The two-row scheme from the disclosure format description
pub fn scheme_a_workbook() -> Vec<u8> {
    DisclosureBuilder::new()
        .index_sheet("Index")
        .scheme(
            "Scheme A",
            &STANDARD_HEADERS,
            &[
                holding("INE001", "ABC Bond 8%", "CRISIL AAA", 100.0, 50.5, 1.2),
                holding("", "", "", 0.0, 0.0, 0.0),
            ],
        )
        .build()
}
