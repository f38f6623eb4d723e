use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Cell, Column, Record, Table};
use crate::inference;

/// Outer union of tables by exact column name. The merged column set is the
/// union in first-seen order across the input list; rows are concatenated in
/// input order, with cells missing where a source table lacked the column.
/// Inferred types are recomputed on the merged result, since columns with the
/// same name may disagree across inputs.
pub fn merge(tables: Vec<Table>) -> Table {
    let mut columns: Vec<Column> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in &tables {
        for column in &table.columns {
            if !positions.contains_key(&column.name) {
                positions.insert(column.name.clone(), columns.len());
                columns.push(Column::text(column.name.clone()));
            }
        }
    }

    let total_rows: usize = tables.iter().map(Table::row_count).sum();
    let mut rows = Vec::with_capacity(total_rows);
    for table in &tables {
        let mapping: Vec<usize> = table
            .columns
            .iter()
            .map(|c| positions[&c.name])
            .collect();
        for row in &table.rows {
            let mut cells = vec![Cell::Missing; columns.len()];
            for (source, cell) in row.cells.iter().enumerate() {
                cells[mapping[source]] = cell.clone();
            }
            rows.push(Record::new(cells));
        }
    }

    debug!(
        "merged {} tables into {} columns x {} rows",
        tables.len(),
        columns.len(),
        rows.len()
    );

    inference::infer(Table::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let columns = names.iter().map(|n| Column::text(*n)).collect();
        Table::new(columns, rows.into_iter().map(Record::new).collect())
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn union_keeps_first_seen_column_order() {
        let first = table(&["a", "b"], vec![vec![text("1"), text("2")]]);
        let second = table(&["b", "c"], vec![vec![text("3"), text("4")]]);
        let merged = merge(vec![first, second]);

        assert_eq!(merged.column_names(), vec!["a", "b", "c"]);
        assert_eq!(merged.rows[0].cells, vec![text("1"), text("2"), Cell::Missing]);
        assert_eq!(merged.rows[1].cells, vec![Cell::Missing, text("3"), text("4")]);
    }

    #[test]
    fn rows_concatenate_in_input_order() {
        let first = table(&["a"], vec![vec![text("1")], vec![text("2")]]);
        let second = table(&["a"], vec![vec![text("3")]]);
        let merged = merge(vec![first, second]);
        let values: Vec<&Cell> = merged.rows.iter().map(|r| &r.cells[0]).collect();
        assert_eq!(values, vec![&text("1"), &text("2"), &text("3")]);
    }
}
