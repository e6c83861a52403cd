pub mod report_cache;
pub mod spreadsheet;
