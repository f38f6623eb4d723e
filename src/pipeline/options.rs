use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::{CleanerError, Result};
use crate::domain::{ColumnType, Table};

/// What to do with rows that contain missing cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    #[default]
    None,
    Drop,
    Fill,
}

/// How a find/replace rule matches a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[default]
    Exact,
    Substring,
}

/// One find/replace rule. `column: None` applies the rule to every column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindReplaceRule {
    #[serde(default)]
    pub column: Option<String>,
    pub find: String,
    pub replace: String,
    #[serde(default, rename = "match")]
    pub match_kind: MatchKind,
}

/// The validated cleaning configuration. One instance is built per request
/// and rejected up front rather than ad hoc inside each stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub remove_duplicates: bool,
    pub handle_missing: MissingPolicy,
    pub fill_value: Option<String>,
    pub column_renames: HashMap<String, String>,
    pub find_replace: Vec<FindReplaceRule>,
    pub trim_whitespace: bool,
    pub data_type_conversions: HashMap<String, ColumnType>,
    pub merge_files: Vec<Uuid>,
}

impl CleaningOptions {
    /// Checks that do not depend on the table being cleaned.
    pub fn validate_base(&self) -> Result<()> {
        if self.handle_missing == MissingPolicy::Fill
            && self.fill_value.as_deref().map_or(true, |v| v.trim().is_empty())
        {
            return Err(CleanerError::Validation(
                "handle_missing=fill requires a non-empty fill_value".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks against the (post-merge) table the stages will run on. Renames
    /// of columns the table does not have are ignored; renames that would
    /// leave two columns with the same name are rejected.
    pub fn validate_against(&self, table: &Table) -> Result<()> {
        self.validate_base()?;

        let mut final_names: HashSet<&str> = HashSet::new();
        for column in &table.columns {
            let final_name = self
                .column_renames
                .get(&column.name)
                .map(String::as_str)
                .unwrap_or(column.name.as_str());
            if !final_names.insert(final_name) {
                return Err(CleanerError::Validation(format!(
                    "rename target '{final_name}' collides with an existing column"
                )));
            }
        }
        Ok(())
    }
}
