/// Rows returned in upload/clean preview payloads.
pub const PREVIEW_ROWS: usize = 5;

/// Default page size for the paginated row endpoint.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Source spellings of "no value". All of them collapse to the canonical
/// missing marker at parse time; a whitespace-only field counts as empty.
pub const MISSING_TOKENS: &[&str] = &["NaN", "nan", "NAN", "null", "NULL", "Null", "N/A", "n/a"];

/// Date formats recognized by type inference and date conversion, tried in order.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Datetime formats accepted where a bare date also would be.
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
