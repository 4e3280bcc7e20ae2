//! Numeric coercion for sensor cells.
//!
//! Never fails loudly: anything that is not a finite number becomes `None`.

use crate::domain::CellValue;

/// Coerce a cell into a finite `f64`.
///
/// Accepts native numbers and numeric text (surrounding whitespace allowed).
/// Text using a single decimal comma (`"21,5"`) is accepted as well, since
/// sheets edited under a comma-decimal locale export it that way.
pub fn try_parse_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(s) => parse_numeric_text(s),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let v = match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) => decimal_comma(s)?.parse::<f64>().ok()?,
    };

    // `f64::from_str` happily accepts "inf" and "NaN".
    v.is_finite().then_some(v)
}

fn decimal_comma(s: &str) -> Option<String> {
    if s.contains('.') || s.matches(',').count() != 1 {
        return None;
    }
    Some(s.replacen(',', ".", 1))
}
