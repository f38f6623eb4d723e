use std::collections::HashSet;

use crate::common::error::Result;
use crate::domain::Table;
use crate::pipeline::options::CleaningOptions;
use crate::pipeline::CleanReport;

use super::CleanStage;

/// Removes rows that duplicate an earlier-surviving row in every cell,
/// keeping the first occurrence and the relative order of survivors.
pub struct RemoveDuplicates;

impl CleanStage for RemoveDuplicates {
    fn name(&self) -> &'static str {
        "remove_duplicates"
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.remove_duplicates
    }

    fn apply(&self, table: Table, _options: &CleaningOptions, _report: &mut CleanReport) -> Result<Table> {
        let mut seen: HashSet<String> = HashSet::with_capacity(table.rows.len());
        let rows = table
            .rows
            .into_iter()
            .filter(|row| seen.insert(row.equality_key()))
            .collect();
        Ok(Table::new(table.columns, rows))
    }
}
