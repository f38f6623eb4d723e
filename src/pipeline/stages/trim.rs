use crate::common::error::Result;
use crate::domain::{Cell, Record, Table};
use crate::pipeline::options::CleaningOptions;
use crate::pipeline::CleanReport;

use super::CleanStage;

/// Strips leading and trailing whitespace from every text cell. A cell that
/// trims down to nothing becomes missing, keeping the canonical-absence
/// invariant intact for later stages.
pub struct TrimWhitespace;

impl CleanStage for TrimWhitespace {
    fn name(&self) -> &'static str {
        "trim_whitespace"
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.trim_whitespace
    }

    fn apply(&self, table: Table, _options: &CleaningOptions, _report: &mut CleanReport) -> Result<Table> {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let cells = row
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Text(s) => {
                            let trimmed = s.trim();
                            if trimmed.is_empty() {
                                Cell::Missing
                            } else {
                                Cell::Text(trimmed.to_string())
                            }
                        }
                        other => other.clone(),
                    })
                    .collect();
                Record::new(cells)
            })
            .collect();
        Ok(Table::new(table.columns, rows))
    }
}
