//! Configuration module for the price forecaster.

// Can all be private now because we have a public re-export.
mod debug;
mod persistence;
mod runtime;
mod training;

// Re-export commonly used items
pub use debug::{DF, LOG_PERFORMANCE, LogFlags};
pub use persistence::{PERSISTENCE, PersistenceConfig, model_filename};
pub use runtime::ForecastConfig;
pub use training::{TRAINING, TrainingDefaults};
