use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::{debug, warn};

use super::traits::RowSource;
use crate::classifier::serial_to_datetime;
use crate::types::{CellValue, RawRow};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const EXTENSIONS: &[&str] = &[".xlsx", ".xlsm", ".xls", ".ods"];

/// Excel and OpenDocument workbooks.
///
/// Rows come from the first sheet, in workbook order, that has at least one
/// data row below its header.
pub struct XlsxSource;

impl RowSource for XlsxSource {
    fn is_supported(filename: Option<&str>, content: &[u8]) -> bool {
        if let Some(name) = filename {
            let name = name.to_lowercase();
            if EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
                return true;
            }
        }

        content.starts_with(ZIP_MAGIC) || content.starts_with(CFB_MAGIC)
    }

    fn decode(content: &[u8]) -> Result<Vec<RawRow>, String> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content.to_vec()))
            .map_err(|e| format!("Workbook open error: {}", e))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err("No sheets found in the workbook".to_string());
        }

        for name in sheet_names {
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    warn!(sheet = %name, error = %e, "skipping unreadable sheet");
                    continue;
                }
            };

            let mut lines = range.rows();
            let Some(header_line) = lines.next() else {
                debug!(sheet = %name, "sheet is empty");
                continue;
            };
            let headers: Vec<String> = header_line.iter().map(header_text).collect();

            let rows: Vec<RawRow> = lines
                .filter(|line| line.iter().any(|cell| !matches!(cell, Data::Empty)))
                .map(|line| to_row(&headers, line))
                .collect();

            if !rows.is_empty() {
                debug!(sheet = %name, rows = rows.len(), "decoded worksheet");
                return Ok(rows);
            }
        }

        Ok(Vec::new())
    }
}

fn to_row(headers: &[String], line: &[Data]) -> RawRow {
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.is_empty())
        .map(|(i, header)| {
            let cell = line.get(i).map(to_cell).unwrap_or_else(|| CellValue::from(""));
            (header.as_str(), cell)
        })
        .collect()
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::DateTime(value) => serial_to_datetime(value.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(value.as_f64())),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::Text(text.clone())
        }
        Data::Empty => CellValue::Text(String::new()),
        other => CellValue::Text(other.to_string()),
    }
}
