use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ForecastConfig;
use crate::data::ModelStore;
use crate::domain::{Series, SeriesSummary};
use crate::error::{DataError, Result, StateError};
use crate::models::{
    Dataset, FitParams, SequencePredictor, TrainedModel, predict_dataset, reconcile, split,
};
use crate::utils::{read, write};

use super::forecast::{Forecast, ForecastResult};
use super::state::TrainingState;
use super::trainer::TrainingManager;
use super::worker::ModelFactory;

/// Actual values and both reconciled prediction arrays, aligned index for index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalView {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub train_predictions: Vec<Option<f64>>,
    pub test_predictions: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub lookback: usize,
    pub epochs: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub data_loaded: bool,
    pub model_loaded: bool,
    pub symbol: String,
    pub latest_value: Option<f64>,
    pub training: TrainingState,
    pub config: ConfigInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub model_loaded: bool,
    pub data_loaded: bool,
    pub timestamp: DateTime<Utc>,
}

/// The operations a request layer (here: the CLI) drives.
///
/// Owns the loaded series and the training manager. Nothing here is global: callers
/// share one instance by reference or `Arc`.
pub struct PriceForecaster<M> {
    config: ForecastConfig,
    series: RwLock<Option<Arc<Series>>>,
    trainer: TrainingManager<M>,
}

impl<M> PriceForecaster<M>
where
    M: SequencePredictor + 'static,
{
    pub fn new(
        config: ForecastConfig,
        factory: ModelFactory<M>,
        store: Arc<dyn ModelStore<M>>,
    ) -> Self {
        Self {
            config,
            series: RwLock::new(None),
            trainer: TrainingManager::new(factory, store),
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Adopt a previously saved model, if any.
    pub fn restore_model(&self) -> anyhow::Result<bool> {
        let restored = self.trainer.restore()?;
        if restored {
            log::info!("Restored saved model for {}", self.config.symbol);
        }
        Ok(restored)
    }

    /// Replace the loaded series. A running job keeps the snapshot it started with.
    pub fn load_series(&self, series: Series) {
        log::info!(
            "Loaded {} points for {} ({} .. {})",
            series.len(),
            series.symbol(),
            series.first().date,
            series.last().date
        );
        *write(&self.series) = Some(Arc::new(series));
    }

    pub fn series(&self) -> Option<Arc<Series>> {
        read(&self.series).clone()
    }

    fn loaded_series(&self) -> Result<Arc<Series>> {
        self.series().ok_or_else(|| DataError::NotLoaded.into())
    }

    fn trained_model(&self) -> Result<Arc<TrainedModel<M>>> {
        self.trainer
            .current_model()
            .ok_or_else(|| StateError::ModelNotTrained.into())
    }

    pub fn series_summary(&self) -> Result<SeriesSummary> {
        Ok(self.loaded_series()?.summary())
    }

    /// Start one fit cycle in the background. `None` falls back to the configured value.
    pub fn start_training(
        &self,
        epochs: Option<usize>,
        batch_size: Option<usize>,
    ) -> Result<Uuid> {
        let series = self.loaded_series()?;
        let defaults = self.config.fit_params();
        let params = FitParams {
            epochs: epochs.unwrap_or(defaults.epochs),
            batch_size: batch_size.unwrap_or(defaults.batch_size),
        };
        // Checked before the job slot is claimed, so a bad override leaves state untouched.
        params.validate()?;

        self.trainer
            .start(series, self.config.lookback, self.config.train_ratio, params)
    }

    pub fn training_status(&self) -> TrainingState {
        self.trainer.status()
    }

    /// Block until the most recent job's worker exits.
    pub fn wait_for_training(&self) -> TrainingState {
        self.trainer.wait()
    }

    /// Walk `horizon` days past the last observation.
    pub fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        // Captured once: a concurrent swap does not change the model mid-walk.
        let trained = self.trained_model()?;
        let series = self.loaded_series()?;

        let points = Forecast::from_series(
            &trained.model,
            trained.scaler,
            trained.lookback,
            &series,
            horizon,
        )?
        .collect::<Result<Vec<_>>>()?;

        Ok(ForecastResult {
            symbol: series.symbol().to_string(),
            points,
        })
    }

    /// Re-run the model over every train and test window and align the predictions
    /// with the actual series.
    pub fn historical(&self) -> Result<HistoricalView> {
        let trained = self.trained_model()?;
        let series = self.loaded_series()?;

        let reconciled = crate::trace_time!("Historical reconstruction", 50_000, {
            let values = series.values();
            let segments = split(values, trained.train_ratio)?;
            let train_ds = Dataset::build(segments.train, &trained.scaler, trained.lookback)?;
            let test_ds = Dataset::build(segments.test, &trained.scaler, trained.lookback)?;

            let to_prices = |scaled: Vec<f64>| -> Vec<f64> {
                scaled.into_iter().map(|p| trained.scaler.inverse(p)).collect()
            };
            let train_preds = to_prices(predict_dataset(&trained.model, &train_ds)?);
            let test_preds = to_prices(predict_dataset(&trained.model, &test_ds)?);

            reconcile(
                &train_preds,
                &test_preds,
                values.len(),
                segments.train_len(),
                trained.lookback,
            )?
        });

        Ok(HistoricalView {
            symbol: series.symbol().to_string(),
            dates: series.dates().collect(),
            actual: series.values().to_vec(),
            train_predictions: reconciled.train,
            test_predictions: reconciled.test,
        })
    }

    pub fn delete_model(&self) -> anyhow::Result<()> {
        self.trainer.delete_model()?;
        log::info!("Deleted model for {}", self.config.symbol);
        Ok(())
    }

    pub fn has_model(&self) -> bool {
        self.trainer.has_model()
    }

    pub fn status(&self) -> SystemStatus {
        let series = self.series();
        SystemStatus {
            data_loaded: series.is_some(),
            model_loaded: self.has_model(),
            symbol: self.config.symbol.clone(),
            latest_value: series.map(|s| s.last().value),
            training: self.training_status(),
            config: ConfigInfo {
                lookback: self.config.lookback,
                epochs: self.config.epochs,
                batch_size: self.config.batch_size,
            },
        }
    }

    pub fn health(&self) -> Health {
        Health {
            model_loaded: self.has_model(),
            data_loaded: read(&self.series).is_some(),
            timestamp: Utc::now(),
        }
    }
}
