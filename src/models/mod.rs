mod linear;
mod predictor;
mod reconcile;
mod scaler;
mod split;
mod trained;
mod window;

pub use {
    linear::LinearWindowModel,
    predictor::{EpochReport, FitMetrics, FitParams, SequencePredictor, predict_dataset},
    reconcile::{ReconciledSeries, reconcile},
    scaler::ScalerState,
    split::{Split, split},
    trained::{TrainedModel, TrainingResult},
    window::{Dataset, Window},
};
