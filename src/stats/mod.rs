use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::Table;

/// Five-number-ish summary for a numeric column. `std` is the population
/// standard deviation (divide by N).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Descriptive statistics for one table. The same function produces these for
/// the original and the cleaned table, so the two are directly comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub rows: usize,
    pub columns: usize,
    pub missing_values: BTreeMap<String, usize>,
    pub data_types: BTreeMap<String, String>,
    pub unique_values: BTreeMap<String, usize>,
    pub numeric_stats: BTreeMap<String, NumericSummary>,
}

pub fn compute(table: &Table) -> Statistics {
    let mut missing_values = BTreeMap::new();
    let mut data_types = BTreeMap::new();
    let mut unique_values = BTreeMap::new();
    let mut numeric_stats = BTreeMap::new();

    for (index, column) in table.columns.iter().enumerate() {
        let cells = table.rows.iter().filter_map(|row| row.cells.get(index));

        let mut missing = 0;
        let mut distinct: HashSet<String> = HashSet::new();
        let mut numbers: Vec<f64> = Vec::new();

        for cell in cells {
            if cell.is_missing() {
                missing += 1;
                continue;
            }
            distinct.insert(cell.equality_key());
            if column.inferred_type.is_numeric() {
                if let Some(value) = cell.as_number() {
                    numbers.push(value);
                }
            }
        }

        missing_values.insert(column.name.clone(), missing);
        data_types.insert(column.name.clone(), column.inferred_type.to_string());
        unique_values.insert(column.name.clone(), distinct.len());

        // A numeric column with no readable values is left out entirely
        // rather than reported with sentinel numbers.
        if let Some(summary) = summarize(&numbers) {
            numeric_stats.insert(column.name.clone(), summary);
        }
    }

    Statistics {
        rows: table.row_count(),
        columns: table.column_count(),
        missing_values,
        data_types,
        unique_values,
        numeric_stats,
    }
}

fn summarize(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(NumericSummary {
        min,
        max,
        mean,
        std: variance.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cell, Column, ColumnType, Record};

    fn numeric_column(cells: Vec<Cell>) -> Table {
        let mut column = Column::text("v");
        column.inferred_type = ColumnType::Integer;
        let rows = cells.into_iter().map(|c| Record::new(vec![c])).collect();
        Table::new(vec![column], rows)
    }

    #[test]
    fn population_std_over_non_missing_values() {
        let table = numeric_column(vec![
            Cell::Text("1".to_string()),
            Cell::Text("2".to_string()),
            Cell::Text("3".to_string()),
            Cell::Missing,
        ]);
        let stats = compute(&table);
        let summary = &stats.numeric_stats["v"];
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.mean, 2.0);
        assert!((summary.std - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.missing_values["v"], 1);
        assert_eq!(stats.rows, 4);
    }

    #[test]
    fn all_missing_numeric_column_is_omitted() {
        let table = numeric_column(vec![Cell::Missing, Cell::Missing]);
        let stats = compute(&table);
        assert!(stats.numeric_stats.is_empty());
        assert_eq!(stats.missing_values["v"], 2);
        assert_eq!(stats.unique_values["v"], 0);
    }

    #[test]
    fn unreadable_cells_in_numeric_columns_are_skipped() {
        let table = numeric_column(vec![
            Cell::Int(4),
            Cell::Text("NA".to_string()),
        ]);
        let stats = compute(&table);
        let summary = &stats.numeric_stats["v"];
        assert_eq!(summary.mean, 4.0);
        assert_eq!(stats.unique_values["v"], 2);
    }
}
