use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::{Series, SeriesPoint};
use crate::utils::parse_date;

/// One CSV row. Only the date and the close are read; other columns are ignored.
#[derive(Debug, Deserialize)]
struct CloseRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Close")]
    close: f64,
}

/// Read a daily-close CSV into a validated `Series`.
///
/// Rows may arrive newest-first; they are ordered by date before validation, so only
/// duplicate dates and non-finite closes are rejected.
pub fn read_close_csv(path: &Path, symbol: &str) -> Result<Series> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;

    let mut points = Vec::new();
    for (row, record) in reader.deserialize::<CloseRecord>().enumerate() {
        // Header is line 1
        let line = row + 2;
        let record = record.with_context(|| format!("{}: bad row at line {}", path.display(), line))?;
        let date = parse_date(&record.date)
            .with_context(|| format!("{}: bad date at line {}", path.display(), line))?;
        points.push(SeriesPoint::new(date, record.close));
    }

    points.sort_by_key(|p| p.date);

    let series = Series::new(symbol.to_uppercase(), points)
        .with_context(|| format!("{} does not hold a usable series", path.display()))?;

    log::info!(
        "Read {} closes for {} from {}",
        series.len(),
        series.symbol(),
        path.display()
    );
    Ok(series)
}
