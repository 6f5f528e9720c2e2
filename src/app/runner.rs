use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::runtime::Runtime;

use crate::config::ForecastConfig;
use crate::data::{BincodeModelStore, SeriesStorage, SqliteStorage, read_close_csv};
use crate::engine::{PriceForecaster, TrainingStatus};
use crate::models::LinearWindowModel;
use crate::{Cli, Command};

use super::report;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: Cli) -> Result<()> {
    let config = args.to_config();
    config.validate()?;

    let rt = Runtime::new().context("Failed to start tokio runtime")?;
    let storage = rt.block_on(open_storage(&config))?;

    if let Command::Import { csv } = &args.command {
        return import(&rt, &storage, &config, csv);
    }

    let forecaster = build_forecaster(&config);
    match rt.block_on(storage.load_series(&config.symbol))? {
        Some(series) => forecaster.load_series(series),
        None => log::warn!(
            "No stored series for {}. Run `import <csv>` first.",
            config.symbol
        ),
    }

    match args.command {
        Command::Import { .. } => Ok(()),
        Command::Summary => report::print_json(&forecaster.series_summary()?),
        Command::Train { epochs, batch_size } => train(&forecaster, epochs, batch_size),
        Command::Status => report::print_json(&forecaster.status()),
        Command::Health => report::print_json(&forecaster.health()),
        Command::Forecast { days, json } => {
            let result = forecaster.forecast(days)?;
            if json {
                report::print_json(&result)
            } else {
                report::print_forecast(&result);
                Ok(())
            }
        }
        Command::Historical { json } => {
            let view = forecaster.historical()?;
            if json {
                report::print_json(&view)
            } else {
                report::print_historical(&view);
                Ok(())
            }
        }
        Command::DeleteModel => {
            forecaster.delete_model()?;
            println!("Model deleted for {}", config.symbol);
            Ok(())
        }
    }
}

async fn open_storage(config: &ForecastConfig) -> Result<SqliteStorage> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", config.data_dir.display()))?;

    let db_path = config.series_db_path();
    let db_path_str = db_path.to_str().unwrap_or("series.sqlite");
    let storage = SqliteStorage::new(db_path_str).await?;
    storage.initialize().await?;
    Ok(storage)
}

fn build_forecaster(config: &ForecastConfig) -> PriceForecaster<LinearWindowModel> {
    let learning_rate = config.learning_rate;
    let forecaster = PriceForecaster::new(
        config.clone(),
        Arc::new(move |lookback| LinearWindowModel::new(lookback, learning_rate)),
        Arc::new(BincodeModelStore::new(&config.model_dir, &config.symbol)),
    );

    // A stale or unreadable artifact should not stop the CLI; training replaces it.
    if let Err(e) = forecaster.restore_model() {
        log::warn!("Ignoring saved model: {:#}", e);
    }
    forecaster
}

fn import(rt: &Runtime, storage: &SqliteStorage, config: &ForecastConfig, csv: &Path) -> Result<()> {
    let series = read_close_csv(csv, &config.symbol)?;

    let previous_last = rt.block_on(storage.last_date(series.symbol()))?;
    let written = rt.block_on(storage.upsert_points(series.symbol(), series.points()))?;

    match previous_last {
        Some(last) => println!(
            "Imported {} closes for {} (store previously ended {})",
            written,
            series.symbol(),
            last
        ),
        None => println!("Imported {} closes for {}", written, series.symbol()),
    }
    Ok(())
}

/// Start a job and poll its state until it is terminal, printing progress changes.
fn train(
    forecaster: &PriceForecaster<LinearWindowModel>,
    epochs: Option<usize>,
    batch_size: Option<usize>,
) -> Result<()> {
    let job_id = forecaster.start_training(epochs, batch_size)?;
    println!("Training job {} started", job_id);

    let mut last_progress = None;
    loop {
        let state = forecaster.training_status();
        if last_progress != Some(state.progress) {
            println!("[{:>3}%] {}", state.progress, state.message);
            last_progress = Some(state.progress);
        }
        if !state.is_running() {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    let state = forecaster.wait_for_training();
    match state.status {
        TrainingStatus::Completed => {
            if let Some(result) = &state.result {
                report::print_training_result(result);
            }
            Ok(())
        }
        _ => bail!(
            "{}",
            state.error.unwrap_or_else(|| state.message.clone())
        ),
    }
}
