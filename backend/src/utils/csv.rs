use std::{io, path::Path};

use csv::{Reader, ReaderBuilder, StringRecord};

fn needs_formula_guard(value: &str) -> bool {
    matches!(value.chars().next(), Some('=' | '+' | '-' | '@'))
}

fn escape_cell(value: &str) -> String {
    let mut sanitized = value.replace('"', "\"\"");
    if needs_formula_guard(&sanitized) {
        sanitized.insert(0, '\'');
    }
    format!("\"{}\"", sanitized)
}

pub fn append_csv_row(buffer: &mut String, fields: &[String]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            buffer.push(',');
        }
        buffer.push_str(&escape_cell(field));
    }
    buffer.push('\n');
}

#[derive(Debug, thiserror::Error)]
pub enum CsvTableError {
    #[error("CSV file has no header row")]
    MissingHeader,
    #[error("line {line}: expected {expected} fields, found {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A data row with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: u64,
    pub fields: Vec<String>,
}

/// Header plus rows exactly as they appear in the file. Every row has one
/// field per header; short rows are padded with empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

fn csv_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

/// Reads CSV bytes with a header row. Fields are kept verbatim (no trimming).
pub fn read_csv_table(bytes: &[u8]) -> Result<RawTable, CsvTableError> {
    collect_table(csv_reader().from_reader(bytes))
}

/// Same as [`read_csv_table`], streaming from a file on disk.
pub fn read_csv_file(path: &Path) -> Result<RawTable, CsvTableError> {
    collect_table(csv_reader().from_path(path)?)
}

fn collect_table<R: io::Read>(mut reader: Reader<R>) -> Result<RawTable, CsvTableError> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            if idx == 0 {
                header.trim_start_matches('\u{feff}').to_string()
            } else {
                header.to_string()
            }
        })
        .collect();
    if headers.is_empty() {
        return Err(CsvTableError::MissingHeader);
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        if record.len() > headers.len() {
            return Err(CsvTableError::TooManyFields {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        fields.resize(headers.len(), String::new());
        rows.push(RawRow { line, fields });
    }

    Ok(RawTable { headers, rows })
}
