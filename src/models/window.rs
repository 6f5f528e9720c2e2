use crate::error::DataError;

use super::ScalerState;

/// One supervised pair: `lookback` consecutive scaled values and the scaled value
/// that follows them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    pub input: &'a [f64],
    pub label: f64,
}

/// Overlapping windows over one split segment.
///
/// Holds the scaled segment once; window `i` is `scaled[i..i + lookback]` with label
/// `scaled[i + lookback]`, so consecutive windows share `lookback - 1` values.
/// Order follows the time axis and is never shuffled here.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    lookback: usize,
    scaled: Vec<f64>,
}

impl Dataset {
    /// Fails unless `segment.len() > lookback`.
    pub fn build(segment: &[f64], scaler: &ScalerState, lookback: usize) -> Result<Self, DataError> {
        if lookback == 0 {
            return Err(DataError::InvalidSeries(
                "lookback window must hold at least one value".into(),
            ));
        }
        if segment.len() <= lookback {
            return Err(DataError::InsufficientData {
                required: lookback + 1,
                actual: segment.len(),
            });
        }

        Ok(Self {
            lookback,
            scaled: scaler.transform_all(segment),
        })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// `len(segment) - lookback`; never zero for a built dataset.
    pub fn len(&self) -> usize {
        self.scaled.len() - self.lookback
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<Window<'_>> {
        (i < self.len()).then(|| Window {
            input: &self.scaled[i..i + self.lookback],
            label: self.scaled[i + self.lookback],
        })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Window<'_>> + '_ {
        self.scaled.windows(self.lookback + 1).map(|w| Window {
            input: &w[..self.lookback],
            label: w[self.lookback],
        })
    }

    /// Scaled labels in window order.
    pub fn labels(&self) -> &[f64] {
        &self.scaled[self.lookback..]
    }
}
