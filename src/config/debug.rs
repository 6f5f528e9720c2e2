//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Log every epoch's loss from the training worker
    pub log_training_epochs: bool,

    /// Log each walk-forward step (window tail + prediction)
    pub log_forecast_steps: bool,

    /// Log model artifact loads/saves/deletes
    pub log_model_store: bool,

    /// Log sqlite series store activity
    pub log_series_store: bool,
}

pub const DF: LogFlags = LogFlags {
    log_training_epochs: true,
    log_model_store: true,

    log_forecast_steps: false,
    log_series_store: false,
};

/// Activate trace_time macro (for scope-level timing)
pub const LOG_PERFORMANCE: bool = cfg!(debug_assertions);
