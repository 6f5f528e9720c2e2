mod core;
mod forecast;
mod messages;
mod state;
mod trainer;
mod worker;

pub use core::{ConfigInfo, Health, HistoricalView, PriceForecaster, SystemStatus};
pub use forecast::{Forecast, ForecastPoint, ForecastResult};
pub use state::{TrainingState, TrainingStatus};
pub use trainer::TrainingManager;
pub use worker::{ModelFactory, ModelSlot};
