use serde_json::Value;

use super::FileFormat;
use crate::common::error::{CleanerError, Result};
use crate::domain::{Cell, Column, Record, Table};

/// Parse a json payload shaped as a top-level array of record objects. The
/// column set is the key union across all records in first-seen order; a key
/// absent from a record reads as missing.
pub fn parse(bytes: &[u8]) -> Result<Table> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| parse_error(format!("invalid json: {e}")))?;
    let records = value
        .as_array()
        .ok_or_else(|| parse_error("expected a top-level array of records".to_string()))?;

    let mut columns: Vec<Column> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| parse_error(format!("record {index} is not an object")))?;
        for key in object.keys() {
            if !columns.iter().any(|c| &c.name == key) {
                columns.push(Column::text(key.clone()));
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        if let Some(object) = record.as_object() {
            let cells = columns
                .iter()
                .map(|column| convert_value(object.get(&column.name)))
                .collect();
            rows.push(Record::new(cells));
        }
    }

    Ok(Table::new(columns, rows))
}

pub fn export(table: &Table) -> Result<Vec<u8>> {
    let records: Vec<Value> = (0..table.row_count())
        .map(|i| Value::Object(table.row_object(i)))
        .collect();
    serde_json::to_vec_pretty(&records).map_err(CleanerError::from)
}

fn convert_value(value: Option<&Value>) -> Cell {
    match value {
        None | Some(Value::Null) => Cell::Missing,
        Some(Value::Bool(b)) => Cell::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                Cell::Int(v)
            } else {
                n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing)
            }
        }
        Some(Value::String(s)) => Cell::from_raw_text(s),
        // Nested structures are carried as their compact json text.
        Some(other) => Cell::Text(other.to_string()),
    }
}

fn parse_error(message: String) -> CleanerError {
    CleanerError::parse(FileFormat::Json, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_union_preserves_first_seen_order() {
        let table = parse(br#"[{"b": 1, "a": 2}, {"c": 3, "a": 4}]"#).unwrap();
        assert_eq!(table.column_names(), vec!["b", "a", "c"]);
        assert_eq!(table.rows[0].cells[2], Cell::Missing);
        assert_eq!(table.rows[1].cells[0], Cell::Missing);
    }

    #[test]
    fn typed_values_survive() {
        let table = parse(br#"[{"i": 3, "f": 2.5, "b": true, "s": "x", "n": null}]"#).unwrap();
        assert_eq!(table.rows[0].cells[0], Cell::Int(3));
        assert_eq!(table.rows[0].cells[1], Cell::Float(2.5));
        assert_eq!(table.rows[0].cells[2], Cell::Bool(true));
        assert_eq!(table.rows[0].cells[3], Cell::Text("x".to_string()));
        assert_eq!(table.rows[0].cells[4], Cell::Missing);
    }

    #[test]
    fn non_array_payload_is_a_parse_error() {
        assert!(parse(br#"{"a": 1}"#).is_err());
        assert!(parse(b"[1, 2]").is_err());
    }
}
