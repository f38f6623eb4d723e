use crate::common::error::Result;
use crate::domain::{Cell, Record, Table};
use crate::pipeline::options::{CleaningOptions, FindReplaceRule, MatchKind};
use crate::pipeline::CleanReport;

use super::CleanStage;

/// Applies each find/replace rule to the text cells it targets, in rule
/// order. Rules naming a column the table does not have are skipped. A
/// replacement that leaves the cell empty becomes the missing marker.
pub struct FindReplace;

impl CleanStage for FindReplace {
    fn name(&self) -> &'static str {
        "find_replace"
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        !options.find_replace.is_empty()
    }

    fn apply(&self, table: Table, options: &CleaningOptions, _report: &mut CleanReport) -> Result<Table> {
        let mut rows: Vec<Record> = table.rows.clone();

        for rule in &options.find_replace {
            let targets: Vec<usize> = match &rule.column {
                Some(name) => match table.column_index(name) {
                    Some(index) => vec![index],
                    None => continue,
                },
                None => (0..table.columns.len()).collect(),
            };

            for row in &mut rows {
                for &index in &targets {
                    if let Some(cell) = row.cells.get_mut(index) {
                        if let Cell::Text(value) = cell {
                            if let Some(replaced) = apply_rule(rule, value) {
                                *cell = replaced;
                            }
                        }
                    }
                }
            }
        }

        Ok(Table::new(table.columns, rows))
    }
}

fn apply_rule(rule: &FindReplaceRule, value: &str) -> Option<Cell> {
    let replaced = match rule.match_kind {
        MatchKind::Exact => {
            if value != rule.find {
                return None;
            }
            rule.replace.clone()
        }
        MatchKind::Substring => {
            if !value.contains(rule.find.as_str()) {
                return None;
            }
            value.replace(rule.find.as_str(), &rule.replace)
        }
    };

    if replaced.trim().is_empty() {
        Some(Cell::Missing)
    } else {
        Some(Cell::Text(replaced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_replaces_whole_cell_only() {
        let rule = FindReplaceRule {
            column: None,
            find: "yes".to_string(),
            replace: "no".to_string(),
            match_kind: MatchKind::Exact,
        };
        assert_eq!(apply_rule(&rule, "yes"), Some(Cell::Text("no".to_string())));
        assert_eq!(apply_rule(&rule, "yes sir"), None);
    }

    #[test]
    fn substring_match_replaces_all_occurrences() {
        let rule = FindReplaceRule {
            column: None,
            find: "a".to_string(),
            replace: "o".to_string(),
            match_kind: MatchKind::Substring,
        };
        assert_eq!(apply_rule(&rule, "banana"), Some(Cell::Text("bonono".to_string())));
    }

    #[test]
    fn empty_replacement_becomes_missing() {
        let rule = FindReplaceRule {
            column: None,
            find: "gone".to_string(),
            replace: String::new(),
            match_kind: MatchKind::Exact,
        };
        assert_eq!(apply_rule(&rule, "gone"), Some(Cell::Missing));
    }
}
