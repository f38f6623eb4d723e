mod csv;
mod json;
mod spreadsheet;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::{CleanerError, Result};
use crate::domain::{Column, Table};

/// File formats the engine can parse and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    #[serde(rename = "xlsx", alias = "spreadsheet", alias = "xls")]
    Spreadsheet,
    Json,
}

impl FileFormat {
    /// Resolve the declared format from a filename extension.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        extension.parse()
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Spreadsheet => "xlsx",
            FileFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FileFormat::Json => "application/json",
        }
    }
}

impl FromStr for FileFormat {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" | "spreadsheet" => Ok(FileFormat::Spreadsheet),
            "json" => Ok(FileFormat::Json),
            other => Err(CleanerError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Decode a raw byte payload of the declared format into a table. Cell values
/// are canonicalized (null spellings become the missing marker) but types are
/// not inferred here.
pub fn parse(bytes: &[u8], format: FileFormat) -> Result<Table> {
    match format {
        FileFormat::Csv => csv::parse(bytes),
        FileFormat::Spreadsheet => spreadsheet::parse(bytes),
        FileFormat::Json => json::parse(bytes),
    }
}

/// Serialize a table into the requested format. Missing cells become the
/// format's idiomatic empty representation.
pub fn export(table: &Table, format: FileFormat) -> Result<Vec<u8>> {
    match format {
        FileFormat::Csv => csv::export(table),
        FileFormat::Spreadsheet => spreadsheet::export(table),
        FileFormat::Json => json::export(table),
    }
}

/// Turn a raw header row into columns with unique names. Blank headers get a
/// positional name; repeats get a numeric suffix.
pub(crate) fn dedupe_column_names<I>(names: I) -> Vec<Column>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::new();
    for (index, raw) in names.into_iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", index + 1)
        } else {
            trimmed.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while !seen.insert(name.clone()) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        columns.push(Column::text(name));
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_filename() {
        assert_eq!(FileFormat::from_filename("a.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_filename("b.XLSX").unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_filename("c.json").unwrap(), FileFormat::Json);
        assert!(FileFormat::from_filename("d.parquet").is_err());
        assert!(FileFormat::from_filename("noext").is_err());
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let columns = dedupe_column_names(
            ["id", "name", "name", "", "name"].map(String::from),
        );
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "name_2", "column_4", "name_3"]);
    }
}
