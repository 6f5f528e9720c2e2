//! Walk-forward multi-step forecasting.
//!
//! No ground truth exists past the last observation, so each step feeds the model's
//! own scaled prediction back into the input window. Error therefore compounds with
//! the horizon.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(debug_assertions)]
use crate::config::DF;
use crate::domain::Series;
use crate::error::{ComputeError, DataError, Result};
use crate::models::{ScalerState, SequencePredictor};
use crate::utils::TimeUtils;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub symbol: String,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Lazy, finite sequence of exactly `horizon` forecast points.
///
/// Pure given the model: re-invoking with the same inputs replays the same values.
/// The first failing step is yielded as an `Err`, after which the sequence ends.
pub struct Forecast<'m, M: ?Sized> {
    model: &'m M,
    scaler: ScalerState,
    window: VecDeque<f64>,
    last_date: NaiveDate,
    step: usize,
    horizon: usize,
    done: bool,
}

impl<'m, M> Forecast<'m, M>
where
    M: SequencePredictor + ?Sized,
{
    /// `tail` is the last `lookback` scaled observations, oldest first.
    pub fn new(
        model: &'m M,
        scaler: ScalerState,
        tail: Vec<f64>,
        horizon: usize,
        last_date: NaiveDate,
    ) -> Self {
        Self {
            model,
            scaler,
            window: VecDeque::from(tail),
            last_date,
            step: 0,
            horizon,
            done: horizon == 0,
        }
    }

    /// Start from the true last `lookback` observations of `series`.
    pub fn from_series(
        model: &'m M,
        scaler: ScalerState,
        lookback: usize,
        series: &Series,
        horizon: usize,
    ) -> Result<Self> {
        let values = series.values();
        if values.len() < lookback {
            return Err(DataError::InsufficientData {
                required: lookback,
                actual: values.len(),
            }
            .into());
        }

        let tail = scaler.transform_all(&values[values.len() - lookback..]);
        Ok(Self::new(model, scaler, tail, horizon, series.last().date))
    }

    fn advance(&mut self) -> Result<ForecastPoint> {
        let k = self.step + 1;
        let date = TimeUtils::add_days(self.last_date, k as u64).ok_or(DataError::DateOverflow {
            last: self.last_date,
            step: k,
        })?;

        let predicted_scaled = self.model.predict_one(self.window.make_contiguous())?;
        if !predicted_scaled.is_finite() {
            return Err(ComputeError::NonFinitePrediction { step: k }.into());
        }

        // Slide: the prediction, not ground truth, becomes the newest input.
        self.window.pop_front();
        self.window.push_back(predicted_scaled);

        let point = ForecastPoint {
            date,
            value: self.scaler.inverse(predicted_scaled),
        };

        #[cfg(debug_assertions)]
        if DF.log_forecast_steps {
            log::debug!(
                "FORECAST: step {}/{} {} -> {:.4} (scaled {:.6})",
                k,
                self.horizon,
                point.date,
                point.value,
                predicted_scaled
            );
        }

        self.step = k;
        Ok(point)
    }
}

impl<M> Iterator for Forecast<'_, M>
where
    M: SequencePredictor + ?Sized,
{
    type Item = Result<ForecastPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = self.advance();
        if item.is_err() || self.step >= self.horizon {
            self.done = true;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.horizon - self.step))
        }
    }
}

impl<M> FusedIterator for Forecast<'_, M> where M: SequencePredictor + ?Sized {}
