use csv::ReaderBuilder;
use tracing::debug;

use super::traits::RowSource;
use crate::types::{CellValue, RawRow};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvSource;

impl RowSource for CsvSource {
    fn is_supported(filename: Option<&str>, content: &[u8]) -> bool {
        let has_csv_extension = filename
            .map(|name| name.to_lowercase().ends_with(".csv"))
            .unwrap_or(false);

        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let first_line = content.split(|b| *b == b'\n').next().unwrap_or_default();
        let looks_like_csv = std::str::from_utf8(first_line)
            .map(|line| line.contains(','))
            .unwrap_or(false);

        match filename {
            Some(_) => has_csv_extension && looks_like_csv,
            None => looks_like_csv,
        }
    }

    fn decode(content: &[u8]) -> Result<Vec<RawRow>, String> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content);

        let headers = reader
            .headers()
            .map_err(|e| format!("CSV header error: {}", e))?
            .clone();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| format!("CSV record error: {}", e))?;
            // Short records are padded with blank cells
            let row: RawRow = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header, CellValue::from(record.get(i).unwrap_or(""))))
                .collect();
            rows.push(row);
        }

        debug!(rows = rows.len(), columns = headers.len(), "decoded CSV");
        Ok(rows)
    }
}
