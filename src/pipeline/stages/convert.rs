use crate::common::error::Result;
use crate::domain::{Cell, ColumnType, Table};
use crate::inference::{parse_boolean, parse_date, parse_float, parse_integer};
use crate::pipeline::options::CleaningOptions;
use crate::pipeline::{CleanReport, ConversionWarning};

use super::CleanStage;

/// Recasts the cells of each named column to the requested type. A cell that
/// cannot be recast keeps its original representation and is recorded as a
/// soft warning; the row is never dropped and the stage never aborts.
pub struct ConvertTypes;

impl CleanStage for ConvertTypes {
    fn name(&self) -> &'static str {
        "type_conversions"
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        !options.data_type_conversions.is_empty()
    }

    fn apply(&self, table: Table, options: &CleaningOptions, report: &mut CleanReport) -> Result<Table> {
        let mut columns = table.columns.clone();
        let mut rows = table.rows.clone();

        // Walk columns in table order so warning output is deterministic
        // regardless of map iteration order.
        for (index, column) in columns.iter_mut().enumerate() {
            let Some(&target) = options.data_type_conversions.get(&column.name) else {
                continue;
            };

            for (row_index, row) in rows.iter_mut().enumerate() {
                let Some(cell) = row.cells.get_mut(index) else {
                    continue;
                };
                if cell.is_missing() {
                    continue;
                }
                match convert_cell(cell, target) {
                    Some(converted) => *cell = converted,
                    None => report.warnings.push(ConversionWarning {
                        column: column.name.clone(),
                        row: row_index,
                        value: cell.render(column.inferred_type),
                        target,
                    }),
                }
            }

            column.inferred_type = target;
        }

        Ok(Table::new(columns, rows))
    }
}

fn convert_cell(cell: &Cell, target: ColumnType) -> Option<Cell> {
    match target {
        ColumnType::Integer => match cell {
            Cell::Int(_) => Some(cell.clone()),
            Cell::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(Cell::Int(*v as i64)),
            Cell::Float(_) => None,
            Cell::Bool(b) => Some(Cell::Int(i64::from(*b))),
            Cell::Text(s) => parse_integer(s)
                .map(Cell::Int)
                .or_else(|| {
                    parse_float(s)
                        .filter(|v| v.fract() == 0.0)
                        .map(|v| Cell::Int(v as i64))
                }),
            Cell::Missing => None,
        },
        ColumnType::Float => match cell {
            Cell::Float(_) => Some(cell.clone()),
            Cell::Int(v) => Some(Cell::Float(*v as f64)),
            Cell::Bool(b) => Some(Cell::Float(if *b { 1.0 } else { 0.0 })),
            Cell::Text(s) => parse_float(s).map(Cell::Float),
            Cell::Missing => None,
        },
        ColumnType::Boolean => match cell {
            Cell::Bool(_) => Some(cell.clone()),
            Cell::Int(0) => Some(Cell::Bool(false)),
            Cell::Int(1) => Some(Cell::Bool(true)),
            Cell::Text(s) => parse_boolean(s).map(Cell::Bool),
            _ => None,
        },
        ColumnType::Date => match cell {
            Cell::Text(s) => parse_date(s).map(|d| Cell::Text(d.format("%Y-%m-%d").to_string())),
            _ => None,
        },
        // Everything has a text rendering, so this conversion cannot fail.
        ColumnType::Text => Some(match cell {
            Cell::Text(_) => cell.clone(),
            Cell::Int(v) => Cell::Text(v.to_string()),
            Cell::Float(v) => Cell::Text(format!("{v}")),
            Cell::Bool(b) => Cell::Text(b.to_string()),
            Cell::Missing => Cell::Missing,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(convert_cell(&text("42"), ColumnType::Integer), Some(Cell::Int(42)));
        assert_eq!(convert_cell(&text("3.0"), ColumnType::Integer), Some(Cell::Int(3)));
        assert_eq!(convert_cell(&text("3.5"), ColumnType::Integer), None);
        assert_eq!(convert_cell(&Cell::Bool(true), ColumnType::Integer), Some(Cell::Int(1)));
        assert_eq!(convert_cell(&text("abc"), ColumnType::Integer), None);
    }

    #[test]
    fn date_conversion_canonicalizes_to_iso() {
        assert_eq!(
            convert_cell(&text("31/01/2024"), ColumnType::Date),
            Some(text("2024-01-31"))
        );
        assert_eq!(convert_cell(&text("not a date"), ColumnType::Date), None);
    }

    #[test]
    fn text_conversion_never_fails() {
        assert_eq!(convert_cell(&Cell::Int(7), ColumnType::Text), Some(text("7")));
        assert_eq!(convert_cell(&Cell::Float(2.5), ColumnType::Text), Some(text("2.5")));
        assert_eq!(convert_cell(&Cell::Bool(false), ColumnType::Text), Some(text("false")));
    }
}
