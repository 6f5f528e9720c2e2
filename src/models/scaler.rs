use argminmax::ArgMinMax;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Reversible min-max normalisation onto `[0, 1]`.
///
/// Fit once from the fitting (train) segment only, so nothing from the held-out
/// segment leaks into the transform. Values outside the fitted range map outside
/// `[0, 1]`; that is expected for the test segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    min: f64,
    max: f64,
}

impl ScalerState {
    pub fn fit(segment: &[f64]) -> Result<Self, DataError> {
        if segment.is_empty() {
            return Err(DataError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let (min_idx, max_idx) = segment.argminmax();
        let (min, max) = (segment[min_idx], segment[max_idx]);

        if min >= max {
            return Err(DataError::Degenerate { value: min });
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    #[inline]
    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * (self.max - self.min) + self.min
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }
}
