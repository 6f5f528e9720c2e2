use serde::{Deserialize, Serialize};

use crate::error::{ComputeError, Result};

use super::{Dataset, EpochReport, FitMetrics, FitParams, SequencePredictor};

/// Baseline predictor: a linear autoregressive map over the input window,
/// `y = w · x + b`, trained by mini-batch gradient descent on mean squared error.
///
/// Starts as the persistence forecast (all weight on the newest value) so an
/// untrained or barely trained model still tracks the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWindowModel {
    weights: Vec<f64>,
    bias: f64,
    learning_rate: f64,
}

impl LinearWindowModel {
    pub fn new(lookback: usize, learning_rate: f64) -> Self {
        let mut weights = vec![0.0; lookback];
        if let Some(last) = weights.last_mut() {
            *last = 1.0;
        }
        Self {
            weights,
            bias: 0.0,
            learning_rate,
        }
    }

    pub fn lookback(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    #[inline]
    fn dot(&self, input: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(input)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }

    /// Mean squared error over every window, without touching the weights.
    fn mse(&self, dataset: &Dataset) -> f64 {
        let sq_err_sum: f64 = dataset
            .iter()
            .map(|w| {
                let err = self.dot(w.input) - w.label;
                err * err
            })
            .sum();
        sq_err_sum / dataset.len() as f64
    }

    fn check_shape(&self, actual: usize) -> Result<()> {
        if actual != self.weights.len() {
            return Err(ComputeError::InputShape {
                expected: self.weights.len(),
                actual,
            }
            .into());
        }
        Ok(())
    }
}

impl SequencePredictor for LinearWindowModel {
    fn fit(
        &mut self,
        dataset: &Dataset,
        validation: Option<&Dataset>,
        params: FitParams,
        on_epoch: &mut dyn FnMut(&EpochReport),
    ) -> Result<FitMetrics> {
        self.check_shape(dataset.lookback())?;
        if let Some(v) = validation {
            self.check_shape(v.lookback())?;
        }

        let n = dataset.len();
        let batch_size = params.batch_size.max(1);
        // Inputs live in [0, 1] on the fitted range, so the squared norm of a window is
        // at most `lookback`; dividing the step by it keeps descent stable for any L.
        let step = self.learning_rate / self.weights.len() as f64;

        let mut loss_history = Vec::with_capacity(params.epochs);
        let mut val_loss_history = Vec::with_capacity(validation.map_or(0, |_| params.epochs));
        let mut grad_w = vec![0.0; self.weights.len()];

        for epoch in 1..=params.epochs {
            let mut sq_err_sum = 0.0;

            let mut start = 0;
            while start < n {
                let end = (start + batch_size).min(n);
                let m = (end - start) as f64;

                grad_w.iter_mut().for_each(|g| *g = 0.0);
                let mut grad_b = 0.0;

                for i in start..end {
                    let Some(w) = dataset.get(i) else { break };
                    let err = self.dot(w.input) - w.label;
                    sq_err_sum += err * err;
                    for (g, x) in grad_w.iter_mut().zip(w.input) {
                        *g += 2.0 * err * x / m;
                    }
                    grad_b += 2.0 * err / m;
                }

                for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                    *w -= step * g;
                }
                self.bias -= step * grad_b;

                start = end;
            }

            let loss = sq_err_sum / n as f64;
            if !loss.is_finite() {
                return Err(ComputeError::Diverged { epoch, loss }.into());
            }

            let val_loss = validation.map(|v| self.mse(v));
            loss_history.push(loss);
            val_loss_history.extend(val_loss);
            on_epoch(&EpochReport {
                epoch,
                epochs: params.epochs,
                loss,
                val_loss,
            });
        }

        Ok(FitMetrics {
            loss_history,
            val_loss_history,
        })
    }

    fn predict_one(&self, input: &[f64]) -> Result<f64> {
        self.check_shape(input.len())?;
        Ok(self.dot(input))
    }
}
