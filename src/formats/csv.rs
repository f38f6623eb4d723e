use std::borrow::Cow;

use ::csv::{ReaderBuilder, WriterBuilder};
use encoding_rs::WINDOWS_1252;

use super::{dedupe_column_names, FileFormat};
use crate::common::error::{CleanerError, Result};
use crate::domain::{Cell, Record, Table};

/// Parse a csv payload. The first row is the header; duplicate header names
/// are suffixed. Field values pass through the canonical missing-marker
/// normalization.
pub fn parse(bytes: &[u8]) -> Result<Table> {
    let text = decode(bytes);
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| parse_error(format!("failed to read header row: {e}")))?
        .clone();
    let columns = dedupe_column_names(headers.iter().map(String::from));

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_error(format!("row {}: {e}", index + 2)))?;
        let cells = (0..columns.len())
            .map(|i| Cell::from_raw_text(record.get(i).unwrap_or("")))
            .collect();
        rows.push(Record::new(cells));
    }

    Ok(Table::new(columns, rows))
}

pub fn export(table: &Table) -> Result<Vec<u8>> {
    if table.columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(|e| CleanerError::Export(format!("csv header: {e}")))?;

    for row in &table.rows {
        let fields: Vec<String> = table
            .columns
            .iter()
            .zip(&row.cells)
            .map(|(column, cell)| cell.render(column.inferred_type))
            .collect();
        writer
            .write_record(&fields)
            .map_err(|e| CleanerError::Export(format!("csv row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| CleanerError::Export(format!("csv flush: {e}")))
}

/// Strict UTF-8 first; legacy single-byte payloads fall back to Windows-1252,
/// which maps every byte, so decoding itself cannot fail.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}

fn parse_error(message: String) -> CleanerError {
    CleanerError::parse(FileFormat::Csv, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens_normalize_at_parse_time() {
        let table = parse(b"a,b\n1,NaN\nnull,  \n").unwrap();
        assert_eq!(table.rows[0].cells[1], Cell::Missing);
        assert_eq!(table.rows[1].cells[0], Cell::Missing);
        assert_eq!(table.rows[1].cells[1], Cell::Missing);
        assert_eq!(table.rows[0].cells[0], Cell::Text("1".to_string()));
    }

    #[test]
    fn windows_1252_payloads_decode() {
        let table = parse(b"name\ncaf\xe9\n").unwrap();
        assert_eq!(table.rows[0].cells[0], Cell::Text("café".to_string()));
    }

    #[test]
    fn short_rows_pad_with_missing() {
        let table = parse(b"a,b,c\n1,2\n").unwrap();
        assert_eq!(table.rows[0].cells[2], Cell::Missing);
    }
}
