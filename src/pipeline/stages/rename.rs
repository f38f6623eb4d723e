use crate::common::error::Result;
use crate::domain::{Column, Table};
use crate::pipeline::options::CleaningOptions;
use crate::pipeline::CleanReport;

use super::CleanStage;

/// Applies the configured column renames. This stage runs last so every
/// earlier stage addresses columns by their original names.
pub struct RenameColumns;

impl CleanStage for RenameColumns {
    fn name(&self) -> &'static str {
        "column_renames"
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        !options.column_renames.is_empty()
    }

    fn apply(&self, table: Table, options: &CleaningOptions, _report: &mut CleanReport) -> Result<Table> {
        let columns = table
            .columns
            .into_iter()
            .map(|column| match options.column_renames.get(&column.name) {
                Some(new_name) => Column {
                    name: new_name.clone(),
                    inferred_type: column.inferred_type,
                },
                None => column,
            })
            .collect();
        Ok(Table::new(columns, table.rows))
    }
}
