//! Lenient numeric coercion for disclosure cells

use crate::types::{format_number, CellValue};

/// Result of coercing one cell to a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Value(f64),
    /// Nothing was there to coerce
    Missing,
    /// A non-empty cell that is not a number (footnote marker, "NIL", ...)
    Unparsable,
}

impl Coerced {
    pub fn value(self) -> Option<f64> {
        match self {
            Coerced::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Coerced::Unparsable)
    }
}

/// Coerce a cell to a finite number; never fails
pub fn to_number(cell: &CellValue) -> Coerced {
    match cell {
        CellValue::Number(n) if n.is_finite() => Coerced::Value(*n),
        CellValue::Number(_) => Coerced::Unparsable,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Coerced::Missing;
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Coerced::Value(v),
                _ => Coerced::Unparsable,
            }
        }
        CellValue::Bool(_) => Coerced::Unparsable,
        CellValue::Empty => Coerced::Missing,
    }
}

/// Identifier text of a cell, `None` when blank
pub fn to_code(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        CellValue::Number(n) if n.is_finite() => Some(format_number(*n)),
        _ => None,
    }
}
