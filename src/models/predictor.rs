//! The trainable/predictable capability the core drives.
//!
//! Model architecture is not the core's concern: anything that can be fit on a
//! [`Dataset`] and map one input window to one value satisfies [`SequencePredictor`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ComputeError, DataError, Result};

use super::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitParams {
    pub epochs: usize,
    pub batch_size: usize,
}

impl FitParams {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(DataError::InvalidConfig(format!(
                "epochs ({}) and batch size ({}) must be positive",
                self.epochs, self.batch_size
            )));
        }
        Ok(())
    }
}

/// Emitted by a predictor after each completed epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based
    pub epoch: usize,
    pub epochs: usize,
    pub loss: f64,
    /// Mean loss on the held-out windows, when the fit was given any.
    pub val_loss: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// Mean training loss (scaled units) per epoch, oldest first
    pub loss_history: Vec<f64>,
    /// Held-out loss per epoch. Empty when fit without validation windows.
    pub val_loss_history: Vec<f64>,
}

pub trait SequencePredictor: Send + Sync {
    /// Train on `dataset`, calling `on_epoch` once per finished epoch. When
    /// `validation` is given, its loss is measured after every epoch but never
    /// trained on.
    fn fit(
        &mut self,
        dataset: &Dataset,
        validation: Option<&Dataset>,
        params: FitParams,
        on_epoch: &mut dyn FnMut(&EpochReport),
    ) -> Result<FitMetrics>;

    /// Predict the scaled value that follows `input` (a window of scaled values).
    fn predict_one(&self, input: &[f64]) -> Result<f64>;
}

/// Predict every window of `dataset` in order. Windows are independent, so this
/// fans out across the rayon pool.
pub fn predict_dataset<M>(model: &M, dataset: &Dataset) -> Result<Vec<f64>>
where
    M: SequencePredictor + ?Sized,
{
    let inputs: Vec<&[f64]> = dataset.iter().map(|w| w.input).collect();

    inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| {
            let y = model.predict_one(input)?;
            if y.is_finite() {
                Ok(y)
            } else {
                Err(ComputeError::NonFiniteWindow { index }.into())
            }
        })
        .collect()
}
