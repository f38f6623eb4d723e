use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::constants::MISSING_TOKENS;

/// Semantic type of a column, assigned by inference or explicit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "int")]
    Integer,
    Float,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "string")]
    Text,
    #[serde(alias = "datetime")]
    Date,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub inferred_type: ColumnType,
}

impl Column {
    /// A fresh column starts as text until inference says otherwise.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type: ColumnType::Text,
        }
    }
}

/// A single value in a record. `Missing` is the only representation of
/// absence inside the engine, whatever the source format spelled it as.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// Canonicalize one raw text value. Empty, whitespace-only, and the
    /// recognized null spellings all become `Missing`; anything else is kept
    /// verbatim, untrimmed.
    pub fn from_raw_text(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
            Cell::Missing
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric reading of the cell, if it has one. Text cells are parsed
    /// because inference never rewrites stored values, so a numeric column
    /// that came from csv still holds text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Cell::Bool(_) | Cell::Missing => None,
        }
    }

    /// Flat string rendering used by the csv/spreadsheet exporters. The
    /// column type keeps integer-typed columns from growing decimal points.
    pub fn render(&self, column_type: ColumnType) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => render_float(*v, column_type),
        }
    }

    /// Type-tagged key for exact row equality. The tag keeps `Int(1)` and
    /// `Text("1")` distinct; floats compare by bit pattern.
    pub fn equality_key(&self) -> String {
        match self {
            Cell::Missing => "m:".to_string(),
            Cell::Text(s) => format!("t:{s}"),
            Cell::Int(v) => format!("i:{v}"),
            Cell::Float(v) => format!("f:{:016x}", v.to_bits()),
            Cell::Bool(b) => format!("b:{b}"),
        }
    }

    /// JSON view of the cell for previews and the json exporter.
    pub fn to_json(&self, column_type: ColumnType) -> Value {
        match self {
            Cell::Missing => Value::Null,
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Int(v) => Value::from(*v),
            Cell::Float(v) => {
                if column_type == ColumnType::Integer && is_integral(*v) {
                    Value::from(*v as i64)
                } else {
                    serde_json::Number::from_f64(*v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
        }
    }
}

fn render_float(v: f64, column_type: ColumnType) -> String {
    if column_type == ColumnType::Integer && is_integral(v) {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

fn is_integral(v: f64) -> bool {
    v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64
}

/// One row. Cells are positionally aligned with the owning table's columns,
/// which makes "every record has exactly the table's column set" true by
/// construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub cells: Vec<Cell>,
}

impl Record {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn has_missing(&self) -> bool {
        self.cells.iter().any(Cell::is_missing)
    }

    pub fn equality_key(&self) -> String {
        let parts: Vec<String> = self.cells.iter().map(Cell::equality_key).collect();
        parts.join("\u{1f}")
    }
}

/// The canonical in-memory dataset: ordered columns plus ordered rows.
/// Tables are values; every pipeline stage consumes one and produces a new
/// one, so the stored original stays retrievable after cleaning.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<Column>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// JSON object for one row, keyed by column name in column order.
    pub fn row_object(&self, index: usize) -> Map<String, Value> {
        let mut object = Map::new();
        if let Some(row) = self.rows.get(index) {
            for (column, cell) in self.columns.iter().zip(&row.cells) {
                object.insert(column.name.clone(), cell.to_json(column.inferred_type));
            }
        }
        object
    }

    /// First `limit` rows as JSON objects, for preview payloads.
    pub fn preview(&self, limit: usize) -> Vec<Value> {
        (0..self.rows.len().min(limit))
            .map(|i| Value::Object(self.row_object(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_normalizes_null_spellings() {
        assert_eq!(Cell::from_raw_text(""), Cell::Missing);
        assert_eq!(Cell::from_raw_text("   "), Cell::Missing);
        assert_eq!(Cell::from_raw_text("NaN"), Cell::Missing);
        assert_eq!(Cell::from_raw_text("null"), Cell::Missing);
        assert_eq!(Cell::from_raw_text(" x "), Cell::Text(" x ".to_string()));
    }

    #[test]
    fn equality_keys_distinguish_types() {
        assert_ne!(Cell::Int(1).equality_key(), Cell::Text("1".to_string()).equality_key());
        assert_ne!(Cell::Missing.equality_key(), Cell::Text(String::new()).equality_key());
        assert_eq!(Cell::Float(1.5).equality_key(), Cell::Float(1.5).equality_key());
    }

    #[test]
    fn integer_typed_floats_render_without_fraction() {
        assert_eq!(Cell::Float(3.0).render(ColumnType::Integer), "3");
        assert_eq!(Cell::Float(3.5).render(ColumnType::Float), "3.5");
        assert_eq!(Cell::Int(3).render(ColumnType::Integer), "3");
    }
}
