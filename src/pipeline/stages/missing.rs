use crate::common::error::Result;
use crate::domain::{Cell, Record, Table};
use crate::pipeline::options::{CleaningOptions, MissingPolicy};
use crate::pipeline::CleanReport;

use super::CleanStage;

/// Drops rows containing missing cells, or fills every missing cell with the
/// configured literal, depending on the policy. Runs after replacement and
/// conversion so it sees their output.
pub struct HandleMissing;

impl CleanStage for HandleMissing {
    fn name(&self) -> &'static str {
        "handle_missing"
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.handle_missing != MissingPolicy::None
    }

    fn apply(&self, table: Table, options: &CleaningOptions, _report: &mut CleanReport) -> Result<Table> {
        let rows = match options.handle_missing {
            MissingPolicy::None => table.rows,
            MissingPolicy::Drop => table
                .rows
                .into_iter()
                .filter(|row| !row.has_missing())
                .collect(),
            MissingPolicy::Fill => {
                // Validation guarantees a non-empty fill value by now.
                let fill = options.fill_value.clone().unwrap_or_default();
                table
                    .rows
                    .into_iter()
                    .map(|row| {
                        let cells = row
                            .cells
                            .into_iter()
                            .map(|cell| {
                                if cell.is_missing() {
                                    Cell::Text(fill.clone())
                                } else {
                                    cell
                                }
                            })
                            .collect();
                        Record::new(cells)
                    })
                    .collect()
            }
        };
        Ok(Table::new(table.columns, rows))
    }
}
