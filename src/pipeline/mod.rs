pub mod merge;
pub mod options;
pub mod stages;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::error::Result;
use crate::domain::{ColumnType, Table};

use options::CleaningOptions;
use stages::{
    CleanStage, ConvertTypes, FindReplace, HandleMissing, RemoveDuplicates, RenameColumns,
    TrimWhitespace,
};

/// One cell that could not be recast during the type-conversion stage. Soft:
/// collected and returned alongside the cleaned table, never fatal.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionWarning {
    pub column: String,
    pub row: usize,
    pub value: String,
    pub target: ColumnType,
}

impl ConversionWarning {
    pub fn message(&self) -> String {
        format!(
            "row {}: could not convert '{}' in column '{}' to {}",
            self.row, self.value, self.column, self.target
        )
    }
}

/// Row accounting for one executed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub stage: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
}

/// Soft failures and stage accounting accumulated across one clean run.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub warnings: Vec<ConversionWarning>,
    pub stage_results: Vec<StageResult>,
}

/// The result of one pipeline invocation.
#[derive(Debug)]
pub struct CleanOutcome {
    pub table: Table,
    pub warnings: Vec<ConversionWarning>,
    pub stage_results: Vec<StageResult>,
}

/// Run the cleaning pipeline over one table. `merge_tables` holds the
/// resolved tables referenced by `options.merge_files`, in reference order.
///
/// Stage order is fixed: merge, trim, find/replace, type conversions,
/// missing-value handling, duplicate removal, renames. Later stages must not
/// invalidate earlier ones' addressing by name, which is why renames run
/// last; replacement and fill run before deduplication so rows they equalize
/// collapse. Disabled stages are skipped without side effects.
pub fn clean(
    table: Table,
    merge_tables: Vec<Table>,
    options: &CleaningOptions,
) -> Result<CleanOutcome> {
    options.validate_base()?;

    let mut report = CleanReport::default();

    let mut current = if merge_tables.is_empty() {
        table
    } else {
        info!("🔗 merging {} additional table(s)", merge_tables.len());
        let rows_in = table.row_count();
        let mut inputs = Vec::with_capacity(1 + merge_tables.len());
        inputs.push(table);
        inputs.extend(merge_tables);
        let merged = merge::merge(inputs);
        report.stage_results.push(StageResult {
            stage: "merge",
            rows_in,
            rows_out: merged.row_count(),
        });
        merged
    };

    options.validate_against(&current)?;

    let stages: [&dyn CleanStage; 6] = [
        &TrimWhitespace,
        &FindReplace,
        &ConvertTypes,
        &HandleMissing,
        &RemoveDuplicates,
        &RenameColumns,
    ];

    for stage in stages {
        if !stage.enabled(options) {
            debug!("⏭️ stage '{}' disabled, skipping", stage.name());
            continue;
        }
        let rows_in = current.row_count();
        current = stage.apply(current, options, &mut report)?;
        let rows_out = current.row_count();
        info!("✅ stage '{}' complete: {} -> {} rows", stage.name(), rows_in, rows_out);
        report.stage_results.push(StageResult {
            stage: stage.name(),
            rows_in,
            rows_out,
        });
    }

    if !report.warnings.is_empty() {
        info!("⚠️ clean finished with {} conversion warning(s)", report.warnings.len());
    }

    Ok(CleanOutcome {
        table: current,
        warnings: report.warnings,
        stage_results: report.stage_results,
    })
}
