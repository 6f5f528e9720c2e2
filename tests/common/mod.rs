//! Shared fixtures: a scripted predictor whose fit can be held, failed or panicked on
//! demand, and helpers for building series and forecasters around it.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use chrono::NaiveDate;

use price_forecaster::data::NullModelStore;
use price_forecaster::models::{Dataset, EpochReport, FitMetrics, FitParams};
use price_forecaster::{
    ComputeError, ForecastConfig, ForecastError, PriceForecaster, Series, SeriesPoint,
    SequencePredictor,
};

/// What the next fit built by a [`Script`] does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Succeed,
    /// Report epochs before this one, then fail with a compute error.
    FailAt(usize),
    Panic,
}

/// A closed gate blocks every fit until opened.
#[derive(Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    fn wait(&self) {
        let (lock, cvar) = &*self.0;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

/// Persistence predictor plus a constant offset (in scaled units), so models from
/// different runs are distinguishable by their output.
pub struct Scripted {
    lookback: usize,
    offset: f64,
    behavior: Behavior,
    gate: Option<Gate>,
    epoch_delay: std::time::Duration,
}

impl SequencePredictor for Scripted {
    fn fit(
        &mut self,
        dataset: &Dataset,
        validation: Option<&Dataset>,
        params: FitParams,
        on_epoch: &mut dyn FnMut(&EpochReport),
    ) -> Result<FitMetrics, ForecastError> {
        assert_eq!(dataset.lookback(), self.lookback);
        assert!(params.epochs > 0 && params.batch_size > 0);
        if let Some(gate) = &self.gate {
            gate.wait();
        }

        let mut loss_history = Vec::new();
        let mut val_loss_history = Vec::new();
        for epoch in 1..=params.epochs {
            match self.behavior {
                Behavior::FailAt(at) if at == epoch => {
                    return Err(ComputeError::Diverged {
                        epoch,
                        loss: f64::INFINITY,
                    }
                    .into());
                }
                Behavior::Panic if epoch == 2 => panic!("scripted fit panic"),
                _ => {}
            }
            if !self.epoch_delay.is_zero() {
                std::thread::sleep(self.epoch_delay);
            }
            let loss = 1.0 / epoch as f64;
            let val_loss = validation.map(|v| v.len() as f64 * loss);
            loss_history.push(loss);
            val_loss_history.extend(val_loss);
            on_epoch(&EpochReport {
                epoch,
                epochs: params.epochs,
                loss,
                val_loss,
            });
        }
        Ok(FitMetrics {
            loss_history,
            val_loss_history,
        })
    }

    fn predict_one(&self, input: &[f64]) -> Result<f64, ForecastError> {
        Ok(input[input.len() - 1] + self.offset)
    }
}

/// Builds [`Scripted`] models. Each model's offset is `0.01 * run index`.
#[derive(Clone)]
pub struct Script {
    behavior: Arc<Mutex<Behavior>>,
    gate: Arc<Mutex<Option<Gate>>>,
    epoch_delay: Arc<Mutex<std::time::Duration>>,
    runs: Arc<AtomicUsize>,
}

impl Script {
    pub fn new() -> Self {
        Self {
            behavior: Arc::new(Mutex::new(Behavior::Succeed)),
            gate: Arc::new(Mutex::new(None)),
            epoch_delay: Arc::new(Mutex::new(std::time::Duration::ZERO)),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_behavior(&self, b: Behavior) {
        *self.behavior.lock().unwrap() = b;
    }

    pub fn set_gate(&self, gate: Option<Gate>) {
        *self.gate.lock().unwrap() = gate;
    }

    pub fn set_epoch_delay(&self, d: std::time::Duration) {
        *self.epoch_delay.lock().unwrap() = d;
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn build(&self, lookback: usize) -> Scripted {
        let run = self.runs.fetch_add(1, Ordering::SeqCst);
        Scripted {
            lookback,
            offset: run as f64 * 0.01,
            behavior: *self.behavior.lock().unwrap(),
            gate: self.gate.lock().unwrap().clone(),
            epoch_delay: *self.epoch_delay.lock().unwrap(),
        }
    }
}

pub fn day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset as u64)
}

/// `n` daily closes with an upward drift and a wobble, starting 2024-01-01.
pub fn wavy_series(n: usize) -> Series {
    let points = (0..n)
        .map(|i| SeriesPoint::new(day(i), 100.0 + i as f64 + 3.0 * (i as f64 * 0.7).sin()))
        .collect();
    Series::new("NFLX", points).unwrap()
}

pub fn config(lookback: usize, train_ratio: f64, dir: &Path) -> ForecastConfig {
    ForecastConfig {
        symbol: "NFLX".to_string(),
        lookback,
        train_ratio,
        epochs: 4,
        batch_size: 8,
        learning_rate: 0.05,
        data_dir: dir.join("data"),
        model_dir: dir.join("models"),
    }
}

/// A forecaster over the scripted predictor with no persistence.
pub fn scripted_forecaster(config: ForecastConfig, script: &Script) -> PriceForecaster<Scripted> {
    let script = script.clone();
    PriceForecaster::new(
        config,
        Arc::new(move |lookback| script.build(lookback)),
        Arc::new(NullModelStore),
    )
}
