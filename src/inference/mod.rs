use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::common::constants::{DATETIME_FORMATS, DATE_FORMATS};
use crate::domain::{Cell, ColumnType, Table};

/// Fraction of non-missing values that must parse for a column to take a
/// candidate type.
const CLASSIFY_NUMERATOR: usize = 9;
const CLASSIFY_DENOMINATOR: usize = 10;

/// Candidate types in most-specific-first order; the first one that clears
/// the threshold wins. Text is the fallback.
const CANDIDATES: [ColumnType; 4] = [
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::Boolean,
    ColumnType::Date,
];

/// Annotate every column with its inferred type. Cell values are never
/// rewritten here; inference only feeds statistics and export formatting.
pub fn infer(mut table: Table) -> Table {
    for index in 0..table.columns.len() {
        let inferred = classify_column(&table, index);
        debug!("column '{}' classified as {}", table.columns[index].name, inferred);
        table.columns[index].inferred_type = inferred;
    }
    table
}

fn classify_column(table: &Table, index: usize) -> ColumnType {
    let non_missing: Vec<&Cell> = table
        .rows
        .iter()
        .filter_map(|row| row.cells.get(index))
        .filter(|cell| !cell.is_missing())
        .collect();

    if non_missing.is_empty() {
        return ColumnType::Text;
    }

    for candidate in CANDIDATES {
        let parsed = non_missing
            .iter()
            .filter(|cell| parses_as(cell, candidate))
            .count();
        if parsed * CLASSIFY_DENOMINATOR >= non_missing.len() * CLASSIFY_NUMERATOR {
            return candidate;
        }
    }

    ColumnType::Text
}

/// Whether one cell reads as the candidate type. Typed cells (from json or
/// spreadsheet payloads) count directly; text cells go through the parsers.
fn parses_as(cell: &Cell, candidate: ColumnType) -> bool {
    match candidate {
        ColumnType::Integer => match cell {
            Cell::Int(_) => true,
            Cell::Float(v) => v.fract() == 0.0 && v.is_finite(),
            Cell::Text(s) => parse_integer(s).is_some(),
            _ => false,
        },
        ColumnType::Float => match cell {
            Cell::Int(_) | Cell::Float(_) => true,
            Cell::Text(s) => parse_float(s).is_some(),
            _ => false,
        },
        ColumnType::Boolean => match cell {
            Cell::Bool(_) => true,
            Cell::Text(s) => parse_boolean(s).is_some(),
            _ => false,
        },
        ColumnType::Date => match cell {
            Cell::Text(s) => parse_date(s).is_some(),
            _ => false,
        },
        ColumnType::Text => true,
    }
}

pub fn parse_integer(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_boolean(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}
