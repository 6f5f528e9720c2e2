//! Load-on-start, save-on-success and delete, with the baseline model and the real
//! file and sqlite collaborators.

mod common;

use std::io::Write;
use std::sync::Arc;

use common::{config, wavy_series};
use price_forecaster::data::{
    BincodeModelStore, SeriesStorage, SqliteStorage, read_close_csv,
};
use price_forecaster::{
    ForecastConfig, ForecastError, LinearWindowModel, PriceForecaster, StateError,
    TrainingStatus,
};

fn linear_forecaster(cfg: &ForecastConfig) -> PriceForecaster<LinearWindowModel> {
    let lr = cfg.learning_rate;
    PriceForecaster::new(
        cfg.clone(),
        Arc::new(move |lookback| LinearWindowModel::new(lookback, lr)),
        Arc::new(BincodeModelStore::new(&cfg.model_dir, &cfg.symbol)),
    )
}

#[test]
fn e2e_trained_model_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(10, 0.65, dir.path());
    cfg.epochs = 20;

    let first = linear_forecaster(&cfg);
    assert!(!first.restore_model().unwrap());
    first.load_series(wavy_series(120));
    first.start_training(None, None).unwrap();
    assert_eq!(first.wait_for_training().status, TrainingStatus::Completed);
    let expected = first.forecast(10).unwrap();

    let store = BincodeModelStore::new(&cfg.model_dir, &cfg.symbol);
    assert!(store.path().exists());

    // Fresh instance: the saved artifact becomes the current model.
    let second = linear_forecaster(&cfg);
    assert!(second.restore_model().unwrap());
    assert!(second.has_model());
    second.load_series(wavy_series(120));
    assert_eq!(second.forecast(10).unwrap(), expected);
    assert_eq!(second.training_status().status, TrainingStatus::Idle);
}

#[test]
fn e2e_delete_model_clears_slot_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(10, 0.65, dir.path());

    let f = linear_forecaster(&cfg);
    f.load_series(wavy_series(80));
    f.start_training(None, None).unwrap();
    f.wait_for_training();
    assert!(f.has_model());

    f.delete_model().unwrap();
    assert!(!f.has_model());
    assert!(!BincodeModelStore::new(&cfg.model_dir, &cfg.symbol).path().exists());
    assert!(matches!(
        f.forecast(5),
        Err(ForecastError::State(StateError::ModelNotTrained))
    ));

    // Deleting with nothing saved is not an error.
    f.delete_model().unwrap();
}

#[test]
fn e2e_baseline_model_tracks_a_trend() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(10, 0.65, dir.path());
    cfg.epochs = 50;
    cfg.batch_size = 16;

    let f = linear_forecaster(&cfg);
    f.load_series(wavy_series(200));
    f.start_training(None, None).unwrap();
    let state = f.wait_for_training();
    assert_eq!(state.status, TrainingStatus::Completed);

    // Daily moves are a few units; a usable fit stays well inside that.
    let result = state.result.unwrap();
    assert!(result.train_rmse < 10.0, "train RMSE {}", result.train_rmse);
    assert!(result.test_rmse < 20.0, "test RMSE {}", result.test_rmse);

    let forecast = f.forecast(30).unwrap();
    assert_eq!(forecast.len(), 30);
    assert!(forecast.points.iter().all(|p| p.value.is_finite()));
}

#[tokio::test]
async fn e2e_csv_import_into_store_then_load() {
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("nflx.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "date,close,volume").unwrap();
    for (i, p) in wavy_series(30).points().iter().enumerate() {
        writeln!(file, "{} 00:00:00+00:00,{},{}", p.date, p.value, 1000 + i).unwrap();
    }
    drop(file);

    let series = read_close_csv(&csv_path, "nflx").unwrap();
    assert_eq!(series.len(), 30);

    let db = dir.path().join("series.sqlite");
    let storage = SqliteStorage::new(db.to_str().unwrap()).await.unwrap();
    storage.initialize().await.unwrap();
    storage
        .upsert_points(series.symbol(), series.points())
        .await
        .unwrap();

    let loaded = storage.load_series("NFLX").await.unwrap().unwrap();
    assert_eq!(loaded, series);
    assert_eq!(
        storage.last_date("NFLX").await.unwrap(),
        Some(series.last().date)
    );
}
