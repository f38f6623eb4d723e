use datawash::domain::{Cell, Column, ColumnType, Record, Table};
use datawash::formats::{self, FileFormat};
use datawash::inference;

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// Compare two tables by column names and the rendered form of every cell.
/// Rendering is the right equivalence for formats that do not carry cell
/// types (csv stores strings, xlsx stores every number as a float).
fn assert_renders_equal(left: &Table, right: &Table) {
    assert_eq!(left.column_names(), right.column_names());
    assert_eq!(left.row_count(), right.row_count());
    for (left_row, right_row) in left.rows.iter().zip(&right.rows) {
        for (index, (left_cell, right_cell)) in
            left_row.cells.iter().zip(&right_row.cells).enumerate()
        {
            assert_eq!(
                left_cell.render(left.columns[index].inferred_type),
                right_cell.render(right.columns[index].inferred_type),
            );
        }
    }
}

#[test]
fn csv_round_trip_preserves_content_and_non_ascii_text() {
    let bytes = "name,count,note\ncafé,3,\nnaïve,,  padded  \n".as_bytes();
    let table = inference::infer(formats::parse(bytes, FileFormat::Csv).unwrap());

    assert_eq!(table.rows[0].cells[0], text("café"));
    assert_eq!(table.rows[0].cells[2], Cell::Missing);
    assert_eq!(table.rows[1].cells[1], Cell::Missing);
    assert_eq!(table.rows[1].cells[2], text("  padded  "));

    let exported = formats::export(&table, FileFormat::Csv).unwrap();
    let reparsed = inference::infer(formats::parse(&exported, FileFormat::Csv).unwrap());
    assert_renders_equal(&table, &reparsed);
}

#[test]
fn json_round_trip_preserves_cell_types() {
    let bytes = r#"[
        {"name": "café", "count": 3, "ratio": 2.5, "ok": true, "gap": null},
        {"name": "second", "count": 4, "ratio": 0.5, "ok": false}
    ]"#.as_bytes();
    let table = formats::parse(bytes, FileFormat::Json).unwrap();

    let exported = formats::export(&table, FileFormat::Json).unwrap();
    let reparsed = formats::parse(&exported, FileFormat::Json).unwrap();

    assert_eq!(table.column_names(), reparsed.column_names());
    assert_eq!(table.rows, reparsed.rows);
    assert_eq!(reparsed.rows[0].cells[4], Cell::Missing);
    assert_eq!(reparsed.rows[1].cells[4], Cell::Missing);
}

#[test]
fn spreadsheet_round_trip_preserves_rendered_values() {
    let columns = vec![
        Column::text("name"),
        Column::text("count"),
        Column::text("ratio"),
        Column::text("ok"),
    ];
    let rows = vec![
        Record::new(vec![text("café"), Cell::Int(42), Cell::Float(2.5), Cell::Bool(true)]),
        Record::new(vec![text("second"), Cell::Missing, Cell::Float(0.5), Cell::Bool(false)]),
    ];
    let table = inference::infer(Table::new(columns, rows));

    let exported = formats::export(&table, FileFormat::Spreadsheet).unwrap();
    let reparsed = inference::infer(formats::parse(&exported, FileFormat::Spreadsheet).unwrap());

    assert_renders_equal(&table, &reparsed);
    // Numbers written for an integer-typed column must come back without a
    // fractional rendering.
    let count_index = reparsed.column_index("count").unwrap();
    assert_eq!(reparsed.columns[count_index].inferred_type, ColumnType::Integer);
    assert_eq!(
        reparsed.rows[0].cells[count_index].render(ColumnType::Integer),
        "42"
    );
}

#[test]
fn duplicate_csv_headers_are_disambiguated() {
    let table = formats::parse(b"x,x,x\n1,2,3\n", FileFormat::Csv).unwrap();
    assert_eq!(table.column_names(), vec!["x", "x_2", "x_3"]);
}

#[test]
fn unknown_format_is_rejected() {
    assert!("parquet".parse::<FileFormat>().is_err());
    assert!(FileFormat::from_filename("data.txt").is_err());
}

#[test]
fn malformed_payloads_are_parse_errors() {
    assert!(formats::parse(b"not json at all", FileFormat::Json).is_err());
    assert!(formats::parse(br#"{"a": 1}"#, FileFormat::Json).is_err());
    assert!(formats::parse(b"\x00\x01\x02", FileFormat::Spreadsheet).is_err());
}
