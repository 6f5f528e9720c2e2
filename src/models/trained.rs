use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScalerState;

/// Evaluation of one completed fit cycle. RMSE is in original price units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub train_rmse: f64,
    pub test_rmse: f64,
    pub loss_history: Vec<f64>,
    /// Loss on the test windows after each epoch, measured but never trained on
    pub val_loss_history: Vec<f64>,
    pub epochs: usize,
    pub batch_size: usize,
}

/// Everything needed to predict with a fitted model: the model itself plus the
/// scaler and windowing it was trained under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel<M> {
    pub model: M,
    pub scaler: ScalerState,
    pub lookback: usize,
    pub train_ratio: f64,
    pub result: TrainingResult,
    pub trained_at: DateTime<Utc>,
}
