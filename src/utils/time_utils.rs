use chrono::{Days, NaiveDate};

use anyhow::{Context, Result};

pub struct TimeUtils;

impl TimeUtils {
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";

    /// The calendar date `days` after `date`, or `None` past chrono's last date.
    pub fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
        date.checked_add_days(Days::new(days))
    }
}

pub fn format_date(date: NaiveDate) -> String {
    // Used for display purposes
    date.format(TimeUtils::STANDARD_TIME_FORMAT).to_string()
}

/// Accepts plain dates ("2024-01-31") and the RFC 3339 timestamps some data vendors
/// emit for daily bars ("2024-01-31T00:00:00+00:00"). The time part is discarded.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, TimeUtils::STANDARD_TIME_FORMAT)
        .with_context(|| format!("Unrecognised date: {:?}", text))
}
