//! Typed failures returned by the forecasting core.
//!
//! Three kinds, each its own enum, so a request layer can map them to user-visible
//! statuses deterministically via [`ForecastError::kind`].

use chrono::NaiveDate;
use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

/// The series is missing, too short, malformed or degenerate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("No series loaded")]
    NotLoaded,

    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Degenerate series: every value in the fitting segment equals {value}")]
    Degenerate { value: f64 },

    #[error("Invalid split ratio {0}: must lie strictly between 0 and 1")]
    InvalidSplitRatio(f64),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Forecast step {step} past {last} falls outside the supported calendar")]
    DateOverflow { last: NaiveDate, step: usize },

    #[error("Prediction index {index} falls outside a series of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The request conflicts with the current job or model state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Training already in progress")]
    TrainingInProgress,

    #[error("Model not trained. Please train the model first.")]
    ModelNotTrained,
}

/// Numeric failure inside fit or predict.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("Training diverged at epoch {epoch} (loss = {loss})")]
    Diverged { epoch: usize, loss: f64 },

    /// `step` is 1-based, counted from the last observation.
    #[error("Model produced a non-finite value at step {step}")]
    NonFinitePrediction { step: usize },

    /// `index` is the 0-based window position within the dataset.
    #[error("Model produced a non-finite value for window {index}")]
    NonFiniteWindow { index: usize },

    #[error("Model expects an input window of {expected} values, got {actual}")]
    InputShape { expected: usize, actual: usize },

    #[error("Training worker panicked: {0}")]
    WorkerPanicked(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Compute(#[from] ComputeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[strum(to_string = "data")]
    Data,
    #[strum(to_string = "state")]
    State,
    #[strum(to_string = "compute")]
    Compute,
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(_) => ErrorKind::Data,
            Self::State(_) => ErrorKind::State,
            Self::Compute(_) => ErrorKind::Compute,
        }
    }
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
