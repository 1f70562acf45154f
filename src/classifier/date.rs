use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use num_traits::ToPrimitive;

use crate::types::CellValue;

/// Shown when a row has no usable date.
pub const NOT_AVAILABLE: &str = "N/A";

const SHORT_DATE: &str = "%b %-d, %Y";
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Formats a date cell as a short date such as `Jan 5, 2025`.
///
/// Numeric cells are read as spreadsheet serial dates. Anything else is
/// returned as its text, or [`NOT_AVAILABLE`] when missing or blank.
pub fn format_date(value: Option<&CellValue>) -> String {
    match value {
        Some(CellValue::Date(date)) => date.format(SHORT_DATE).to_string(),
        Some(CellValue::Number(serial)) => serial_to_datetime(*serial)
            .map(|date| date.format(SHORT_DATE).to_string())
            .unwrap_or_else(|| serial.to_string()),
        Some(cell) if !cell.is_blank() => cell.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Converts a serial date in the 1900 date system to a timestamp.
///
/// Serial 1 is 1900-01-01. Serial 60 is the nonexistent 1900-02-29 kept
/// for Lotus compatibility; it collapses onto 1900-02-28.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let whole_days = serial.floor();
    let days = whole_days.to_u64()?;
    let seconds = ((serial - whole_days) * SECONDS_PER_DAY).round().to_u32()?;

    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let date = epoch.checked_add_days(Days::new(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)?;

    Some(date.and_time(time))
}
