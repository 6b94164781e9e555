//! Module for handling date-time parsing.

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::error::{IcuDbError, Result};

/// Layouts accepted for date-time cells, tried in order
pub const DATE_TIME_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a date-time cell
///
/// Accepts `13/03/2075 0:00:00` (day/month/year) and `1864-11-16 00:00:00`
/// (year-month-day), both with a 24-hour clock. Runs of whitespace are treated
/// as a single separator. An empty cell is not an error and yields `None`.
///
/// # Errors
/// Returns [`IcuDbError::DateParse`] when the value matches neither layout.
pub fn parse_date_time(s: &str) -> Result<Option<NaiveDateTime>> {
    let normalized = s.split_whitespace().join(" ");
    if normalized.is_empty() {
        return Ok(None);
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .map(Some)
        .ok_or_else(|| IcuDbError::DateParse {
            value: s.to_string(),
        })
}
