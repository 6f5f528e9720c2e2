use argminmax::ArgMinMax;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::DataError;
use crate::utils::format_date;

/// One daily observation (a closing price).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An ordered, validated daily series for one symbol.
/// Dates are strictly increasing, values finite, length >= 1. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    points: Vec<SeriesPoint>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, points: Vec<SeriesPoint>) -> Result<Self, DataError> {
        if points.is_empty() {
            return Err(DataError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        for (i, p) in points.iter().enumerate() {
            if !p.value.is_finite() {
                return Err(DataError::InvalidSeries(format!(
                    "non-finite value {} on {}",
                    p.value,
                    format_date(p.date)
                )));
            }
            if i > 0 && p.date <= points[i - 1].date {
                return Err(DataError::InvalidSeries(format!(
                    "dates must be strictly increasing: {} follows {}",
                    format_date(p.date),
                    format_date(points[i - 1].date)
                )));
            }
        }

        let values = points.iter().map(|p| p.value).collect();
        Ok(Self {
            symbol: symbol.into(),
            points,
            values,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Values in date order, borrowed as a flat slice for windowing.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn first(&self) -> SeriesPoint {
        self.points[0]
    }

    pub fn last(&self) -> SeriesPoint {
        self.points[self.points.len() - 1]
    }

    pub fn summary(&self) -> SeriesSummary {
        let (min_idx, max_idx) = self.values.as_slice().argminmax();
        // Sample standard deviation needs at least two observations.
        let std = (self.len() > 1).then(|| Statistics::std_dev(&self.values));

        SeriesSummary {
            symbol: self.symbol.clone(),
            total_records: self.len(),
            date_range: DateRange {
                start: self.first().date,
                end: self.last().date,
            },
            latest_price: self.last().value,
            price_stats: PriceStats {
                min: self.values[min_idx],
                max: self.values[max_idx],
                mean: Statistics::mean(&self.values),
                std,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: Option<f64>,
}

/// Read-only overview of the loaded series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub symbol: String,
    pub total_records: usize,
    pub date_range: DateRange,
    pub latest_price: f64,
    pub price_stats: PriceStats,
}
