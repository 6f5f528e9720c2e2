//! Model and training defaults (Immutable Blueprints)

pub struct TrainingDefaults {
    /// Ticker whose daily closes are modelled when none is given
    pub symbol: &'static str,
    /// Lookback window length (L): past observations fed to the model per prediction
    pub time_step: usize,
    /// Fraction of the series (oldest first) used for fitting
    pub training_size_ratio: f64,
    pub epochs: usize,
    pub batch_size: usize,
    /// Step size for the baseline gradient-descent model
    pub learning_rate: f64,
    /// Days forecast when the caller does not say
    pub forecast_days: usize,
}

pub const TRAINING: TrainingDefaults = TrainingDefaults {
    symbol: "NFLX",
    time_step: 100,
    training_size_ratio: 0.65,
    epochs: 100,
    batch_size: 64,
    learning_rate: 0.05,
    forecast_days: 30,
};
