//! The live configuration a forecaster instance runs with.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{PERSISTENCE, TRAINING};
use crate::error::DataError;
use crate::models::FitParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub symbol: String,
    pub lookback: usize,
    pub train_ratio: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            symbol: TRAINING.symbol.to_string(),
            lookback: TRAINING.time_step,
            train_ratio: TRAINING.training_size_ratio,
            epochs: TRAINING.epochs,
            batch_size: TRAINING.batch_size,
            learning_rate: TRAINING.learning_rate,
            data_dir: PathBuf::from(PERSISTENCE.data_dir),
            model_dir: PathBuf::from(PERSISTENCE.model_dir),
        }
    }
}

impl ForecastConfig {
    /// Reject settings the windowing and training code cannot work with.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.symbol.trim().is_empty() {
            return Err(DataError::InvalidConfig("symbol must not be empty".into()));
        }
        if self.lookback == 0 {
            return Err(DataError::InvalidConfig(
                "lookback window must hold at least one value".into(),
            ));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(DataError::InvalidSplitRatio(self.train_ratio));
        }
        self.fit_params().validate()?;
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(DataError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Default fit parameters for a run that does not override them.
    pub fn fit_params(&self) -> FitParams {
        FitParams {
            epochs: self.epochs,
            batch_size: self.batch_size,
        }
    }

    pub fn series_db_path(&self) -> PathBuf {
        self.data_dir.join(PERSISTENCE.series_db)
    }
}
