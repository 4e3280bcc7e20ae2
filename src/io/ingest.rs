//! Row source: spreadsheet exports on disk -> `RawRow`s.
//!
//! The dashboard pulls rows from a spreadsheet backend; here the backend's
//! output is read from a file instead. Two shapes are accepted:
//!
//! - **CSV** with a header row (any sheet "download as CSV")
//! - **JSON**, either an array of row objects
//!   (`[{"ДатаЧас": "...", "s1": 21.5}, ...]`) or a values matrix whose first
//!   row is the header (`{"values": [["ДатаЧас", "s1"], ["...", "21.5"]]}`)
//!
//! Cells are kept verbatim; coercion happens in `series`. Broken CSV records
//! are skipped and reported rather than failing the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{CellValue, RawRow};
use crate::error::AppError;

/// A record-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number (CSV) or 1-based row number (JSON values matrix).
    pub line: usize,
    pub message: String,
}

/// Ingest output: rows + what was skipped.
#[derive(Debug, Clone, Default)]
pub struct IngestedRows {
    pub rows: Vec<RawRow>,
    pub row_errors: Vec<RowError>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRows {
    Objects(Vec<RawRow>),
    Values { values: Vec<Vec<CellValue>> },
}

/// Load rows from a `.csv` or `.json` file (by extension; CSV otherwise).
pub fn load_rows(path: &Path) -> Result<IngestedRows, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open rows file '{}': {e}", path.display())))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let ingested = if is_json { read_rows_json(file)? } else { read_rows_csv(file)? };
    debug!(
        path = %path.display(),
        rows = ingested.rows.len(),
        errors = ingested.row_errors.len(),
        "loaded rows"
    );
    Ok(ingested)
}

/// Read CSV with a header row.
///
/// Short records simply lack the trailing columns; extra fields are ignored.
pub fn read_rows_csv<R: Read>(reader: R) -> Result<IngestedRows, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut out = IngestedRows::default();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(record) => {
                if record.len() > headers.len() {
                    warn!(line, cells = record.len(), headers = headers.len(), "extra CSV cells ignored");
                    out.row_errors.push(extra_cells_error(line, record.len(), headers.len()));
                }
                out.rows.push(row_from_record(&headers, &record));
            }
            Err(e) => {
                warn!(line, error = %e, "skipping malformed CSV record");
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
            }
        }
    }
    Ok(out)
}

/// Read JSON rows (array of objects, or a `values` matrix with a header row).
pub fn read_rows_json<R: Read>(reader: R) -> Result<IngestedRows, AppError> {
    let parsed: JsonRows =
        serde_json::from_reader(reader).map_err(|e| AppError::usage(format!("Invalid rows JSON: {e}")))?;

    match parsed {
        JsonRows::Objects(rows) => Ok(IngestedRows {
            rows,
            row_errors: Vec::new(),
        }),
        JsonRows::Values { values } => Ok(rows_from_matrix(values)),
    }
}

fn rows_from_matrix(values: Vec<Vec<CellValue>>) -> IngestedRows {
    let mut iter = values.into_iter();
    let Some(header) = iter.next() else {
        return IngestedRows::default();
    };
    let headers: Vec<String> = header.iter().map(|c| normalize_header_name(&c.to_string())).collect();

    let mut out = IngestedRows::default();
    for (idx, cells) in iter.enumerate() {
        if cells.len() > headers.len() {
            out.row_errors.push(extra_cells_error(idx + 2, cells.len(), headers.len()));
        }
        out.rows.push(headers.iter().cloned().zip(cells).collect());
    }
    out
}

fn extra_cells_error(line: usize, cells: usize, headers: usize) -> RowError {
    RowError {
        line,
        message: format!("Row has {cells} cells but only {headers} headers; extra cells ignored."),
    }
}

fn row_from_record(headers: &[String], record: &StringRecord) -> RawRow {
    headers
        .iter()
        .zip(record.iter())
        .map(|(name, cell)| (name.clone(), CellValue::text(cell)))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet CSV downloads often carry a UTF-8 BOM on the first header.
    // Column names are otherwise kept as-is (they are matched exactly).
    name.trim().trim_start_matches('\u{feff}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_keep_cells_as_text() {
        let data = "\u{feff}ДатаЧас,Шпалера,Bed B\n05.03.2024 10:00,21.5,\n05.03.2024 11:00, 20 \n";
        let ingested = read_rows_csv(data.as_bytes()).unwrap();
        assert_eq!(ingested.rows.len(), 2);
        assert!(ingested.row_errors.is_empty());

        let first = &ingested.rows[0];
        assert_eq!(first.get("ДатаЧас"), Some(&CellValue::text("05.03.2024 10:00")));
        assert_eq!(first.get("Шпалера"), Some(&CellValue::text("21.5")));
        assert_eq!(first.get("Bed B"), Some(&CellValue::text("")));

        // Short record: trailing column absent, not blank.
        let second = &ingested.rows[1];
        assert_eq!(second.get("Шпалера"), Some(&CellValue::text("20")));
        assert_eq!(second.get("Bed B"), None);
    }

    #[test]
    fn extra_cells_are_reported_in_csv_and_json() {
        let csv = read_rows_csv("when,s1\n05.03.2024 10:00,21.5,99\n05.03.2024 11:00,20\n".as_bytes()).unwrap();
        let data = r#"{"values":[["when","s1"],["05.03.2024 10:00","21.5","99"],["05.03.2024 11:00","20"]]}"#;
        let json = read_rows_json(data.as_bytes()).unwrap();

        for ingested in [&csv, &json] {
            assert_eq!(ingested.rows.len(), 2);
            assert_eq!(ingested.rows[0].len(), 2);
            assert_eq!(ingested.row_errors.len(), 1);
            assert_eq!(ingested.row_errors[0].line, 2);
        }
        assert_eq!(csv.row_errors, json.row_errors);
    }

    #[test]
    fn json_objects() {
        let data = r#"[{"when":"Date(2024,0,5,10,0,0)","s1":21.5},{"when":"bad","s1":"x"}]"#;
        let ingested = read_rows_json(data.as_bytes()).unwrap();
        assert_eq!(ingested.rows.len(), 2);
        assert_eq!(ingested.rows[0].get("s1"), Some(&CellValue::Number(21.5)));
    }

    #[test]
    fn json_values_matrix() {
        let data = r#"{"values":[["when","s1"],["05.03.2024 10:00","21.5"],["05.03.2024 11:00"],["x","1","extra"]]}"#;
        let ingested = read_rows_json(data.as_bytes()).unwrap();
        assert_eq!(ingested.rows.len(), 3);
        assert_eq!(ingested.rows[0].get("s1"), Some(&CellValue::text("21.5")));
        assert_eq!(ingested.rows[1].get("s1"), None);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 4);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = read_rows_json("{\"rows\": 3}".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }
}
