#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types outside of crate (for the binary and integration tests)
pub use config::{ForecastConfig, PERSISTENCE, TRAINING};
pub use domain::{Series, SeriesPoint, SeriesSummary};
pub use engine::{
    ForecastPoint, ForecastResult, HistoricalView, PriceForecaster, TrainingState, TrainingStatus,
};
pub use error::{ComputeError, DataError, ErrorKind, ForecastError, StateError};
pub use models::{LinearWindowModel, SequencePredictor};

// CLI argument parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Daily close forecasting", long_about = None)]
pub struct Cli {
    /// Ticker whose series is imported, trained on and forecast
    #[arg(long, env = "FORECAST_SYMBOL", default_value = TRAINING.symbol)]
    pub symbol: String,

    /// Lookback window length
    #[arg(long, env = "TIME_STEP", default_value_t = TRAINING.time_step)]
    pub time_step: usize,

    /// Fraction of the series (oldest first) used for fitting
    #[arg(long, env = "TRAINING_SIZE_RATIO", default_value_t = TRAINING.training_size_ratio)]
    pub training_size_ratio: f64,

    /// Default epochs per training run
    #[arg(long, env = "EPOCHS", default_value_t = TRAINING.epochs)]
    pub default_epochs: usize,

    /// Default mini-batch size per training run
    #[arg(long, env = "BATCH_SIZE", default_value_t = TRAINING.batch_size)]
    pub default_batch_size: usize,

    #[arg(long, default_value_t = TRAINING.learning_rate)]
    pub learning_rate: f64,

    #[arg(long, default_value = PERSISTENCE.data_dir)]
    pub data_dir: PathBuf,

    #[arg(long, default_value = PERSISTENCE.model_dir)]
    pub model_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Import a daily close CSV (date,close columns) into the series store
    Import { csv: PathBuf },
    /// Print an overview of the stored series
    Summary,
    /// Train a model and wait for the job to finish
    Train {
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Print data, model and training status
    Status,
    Health,
    /// Walk the model forward past the last stored close
    Forecast {
        #[arg(long, default_value_t = TRAINING.forecast_days)]
        days: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Replay the model over the stored series for comparison with actual closes
    Historical {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete the saved model
    DeleteModel,
}

impl Cli {
    pub fn to_config(&self) -> ForecastConfig {
        ForecastConfig {
            symbol: self.symbol.to_uppercase(),
            lookback: self.time_step,
            train_ratio: self.training_size_ratio,
            epochs: self.default_epochs,
            batch_size: self.default_batch_size,
            learning_rate: self.learning_rate,
            data_dir: self.data_dir.clone(),
            model_dir: self.model_dir.clone(),
        }
    }
}

/// Entry point for the binary: runs one CLI command to completion.
pub fn run(args: Cli) -> anyhow::Result<()> {
    app::run(args)
}
