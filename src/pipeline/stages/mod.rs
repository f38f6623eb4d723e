use crate::common::error::Result;
use crate::domain::Table;

use super::options::CleaningOptions;
use super::CleanReport;

/// Common trait for the cleaning stages. Stages are pure: they consume a
/// table and produce a new one, recording soft failures on the report.
pub trait CleanStage {
    /// Stable name used in logs and stage results.
    fn name(&self) -> &'static str;

    /// Whether the configuration turns this stage on.
    fn enabled(&self, options: &CleaningOptions) -> bool;

    fn apply(
        &self,
        table: Table,
        options: &CleaningOptions,
        report: &mut CleanReport,
    ) -> Result<Table>;
}

pub mod convert;
pub mod dedupe;
pub mod find_replace;
pub mod missing;
pub mod rename;
pub mod trim;

pub use convert::ConvertTypes;
pub use dedupe::RemoveDuplicates;
pub use find_replace::FindReplace;
pub use missing::HandleMissing;
pub use rename::RenameColumns;
pub use trim::TrimWhitespace;
