use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use super::{dedupe_column_names, FileFormat};
use crate::common::error::{CleanerError, Result};
use crate::domain::{Cell, Record, Table};

/// Parse an xlsx workbook from memory. The first worksheet is the table; its
/// first row is the header.
pub fn parse(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| parse_error(format!("failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error("workbook has no worksheets".to_string()))?
        .map_err(|e| parse_error(format!("failed to read worksheet: {e}")))?;

    let mut row_iter = range.rows();
    let header = match row_iter.next() {
        Some(header) => header,
        None => return Ok(Table::empty()),
    };
    let columns = dedupe_column_names(header.iter().map(header_name));

    let mut rows = Vec::new();
    for row in row_iter {
        let cells = (0..columns.len())
            .map(|i| row.get(i).map(convert_cell).unwrap_or(Cell::Missing))
            .collect();
        rows.push(Record::new(cells));
    }

    Ok(Table::new(columns, rows))
}

pub fn export(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, column.name.as_str())
            .map_err(|e| export_error(e.to_string()))?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let excel_row = (index + 1) as u32;
        for (col, cell) in row.cells.iter().enumerate() {
            let excel_col = col as u16;
            match cell {
                // An empty cell is the spreadsheet spelling of missing.
                Cell::Missing => {}
                Cell::Text(s) => {
                    worksheet
                        .write_string(excel_row, excel_col, s.as_str())
                        .map_err(|e| export_error(e.to_string()))?;
                }
                Cell::Int(v) => {
                    worksheet
                        .write_number(excel_row, excel_col, *v as f64)
                        .map_err(|e| export_error(e.to_string()))?;
                }
                Cell::Float(v) => {
                    worksheet
                        .write_number(excel_row, excel_col, *v)
                        .map_err(|e| export_error(e.to_string()))?;
                }
                Cell::Bool(b) => {
                    worksheet
                        .write_boolean(excel_row, excel_col, *b)
                        .map_err(|e| export_error(e.to_string()))?;
                }
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| export_error(e.to_string()))
}

fn header_name(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => format!("{other}"),
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::String(s) => Cell::from_raw_text(s),
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates, durations and error cells keep their display form.
        other => Cell::from_raw_text(&format!("{other}")),
    }
}

fn parse_error(message: String) -> CleanerError {
    CleanerError::parse(FileFormat::Spreadsheet, message)
}

fn export_error(message: String) -> CleanerError {
    CleanerError::Export(format!("xlsx: {message}"))
}
