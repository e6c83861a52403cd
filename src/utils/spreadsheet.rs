use crate::{engine::normalizer::RawRow, error::PresenceError};
use calamine::{Data, Reader, Xlsx};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn from_filename(filename: &str) -> Result<Self, PresenceError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx") => Ok(SheetFormat::Xlsx),
            Some("csv") => Ok(SheetFormat::Csv),
            _ => Err(PresenceError::Validation(format!(
                "{filename:?}: only .xlsx and .csv files are allowed"
            ))),
        }
    }
}

/// Reads the first sheet into header-keyed rows. Blank rows are skipped.
pub fn read_rows(format: SheetFormat, bytes: &[u8]) -> Result<Vec<RawRow>, PresenceError> {
    match format {
        SheetFormat::Xlsx => read_xlsx(bytes),
        SheetFormat::Csv => read_csv(bytes),
    }
}

fn parse_error(e: impl std::fmt::Display) -> PresenceError {
    PresenceError::Parse(e.to_string())
}

/// Pairs cells with headers; `None` when every cell is blank.
fn build_row(headers: &[String], cells: impl IntoIterator<Item = String>) -> Option<RawRow> {
    let mut row = RawRow::new();
    let mut blank = true;

    for (header, cell) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        if !cell.is_empty() {
            blank = false;
        }
        // a repeated header keeps its first column
        row.entry(header.clone()).or_insert(cell);
    }

    (!blank).then_some(row)
}

fn read_csv(bytes: &[u8]) -> Result<Vec<RawRow>, PresenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        if let Some(row) = build_row(&headers, record.iter().map(str::to_string)) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_xlsx(bytes: &[u8]) -> Result<Vec<RawRow>, PresenceError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(parse_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PresenceError::Parse("workbook has no worksheet".into()))?
        .map_err(parse_error)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => return Ok(Vec::new()),
    };

    Ok(sheet_rows
        .filter_map(|cells| build_row(&headers, cells.iter().map(cell_text)))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // ids typed into Excel arrive as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => datetime_text(value),
            None => dt.as_f64().to_string(),
        },
    }
}

fn datetime_text(value: NaiveDateTime) -> String {
    if value.year() < 1900 {
        // time-only cell
        value.format("%H:%M:%S").to_string()
    } else if value.num_seconds_from_midnight() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, XlsxError};

    /// Swipes on the first sheet, with a blank row in the middle and a second
    /// sheet that must be ignored.
    fn swipes_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let sheet = workbook.add_worksheet();
        sheet.set_name("Swipes")?;
        sheet.write_string(0, 0, "employeeId")?;
        sheet.write_string(0, 1, "date")?;
        sheet.write_string(0, 2, "time")?;
        sheet.write_number(1, 0, 1001.0)?;
        sheet.write_datetime_with_format(1, 1, &ExcelDateTime::from_ymd(2024, 3, 1)?, &date_format)?;
        sheet.write_string(1, 2, "08:55")?;
        sheet.write_string(3, 0, " E7 ")?;
        sheet.write_string(3, 1, "2024-03-04")?;

        let other = workbook.add_worksheet();
        other.set_name("Notes")?;
        other.write_string(0, 0, "employeeId")?;
        other.write_string(1, 0, "9999")?;

        workbook.save_to_buffer()
    }

    #[test]
    fn test_xlsx_first_sheet_rows_are_keyed_by_header() {
        let bytes = swipes_workbook().unwrap();
        let rows = read_rows(SheetFormat::Xlsx, &bytes).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["employeeId"], "1001");
        assert_eq!(rows[0]["date"], "2024-03-01");
        assert_eq!(rows[0]["time"], "08:55");
        assert_eq!(rows[1]["employeeId"], "E7");
        assert_eq!(rows[1]["date"], "2024-03-04");
        assert_eq!(rows[1]["time"], "");
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(SheetFormat::from_filename("staff.xlsx").unwrap(), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::from_filename("Swipes.CSV").unwrap(), SheetFormat::Csv);
        assert!(matches!(
            SheetFormat::from_filename("staff.xls"),
            Err(PresenceError::Validation(_))
        ));
        assert!(SheetFormat::from_filename("noextension").is_err());
    }

    #[test]
    fn test_csv_rows_are_keyed_by_header() {
        let csv = "\u{feff}id,name,directorate\n1001, Ann ,Eng\n\n,,\n1002,Bob\n";
        let rows = read_rows(SheetFormat::Csv, csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "1001");
        assert_eq!(rows[0]["name"], "Ann");
        assert_eq!(rows[1]["name"], "Bob");
        assert!(!rows[1].contains_key("directorate"));
    }

    #[test]
    fn test_invalid_utf8_csv_is_a_parse_error() {
        let bytes = b"id,name\n1,\xff\xfe\n";
        assert!(matches!(
            read_rows(SheetFormat::Csv, bytes),
            Err(PresenceError::Parse(_))
        ));
    }

    #[test]
    fn test_garbage_xlsx_is_a_parse_error() {
        assert!(matches!(
            read_rows(SheetFormat::Xlsx, b"definitely not a zip archive"),
            Err(PresenceError::Parse(_))
        ));
    }

    #[test]
    fn test_cells_render_as_plain_text() {
        assert_eq!(cell_text(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String(" x ".into())), "x");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_datetimes_render_as_dates_when_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(datetime_text(day.and_hms_opt(0, 0, 0).unwrap()), "2024-03-01");
        assert_eq!(
            datetime_text(day.and_hms_opt(8, 30, 0).unwrap()),
            "2024-03-01 08:30:00"
        );
        let time_only = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
        assert_eq!(datetime_text(time_only.and_hms_opt(9, 5, 0).unwrap()), "09:05:00");
    }

    #[test]
    fn test_repeated_header_keeps_first_column() {
        let headers = vec!["id".to_string(), "id".to_string(), String::new()];
        let row = build_row(&headers, ["1".to_string(), "2".to_string(), "x".to_string()]).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row["id"], "1");
    }
}
