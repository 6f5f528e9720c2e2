use anyhow::Result;
use itertools::izip;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::engine::{ForecastResult, HistoricalView};
use crate::models::TrainingResult;
use crate::utils::format_date;

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Day")]
    day: usize,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Predicted Close")]
    close: String,
}

#[derive(Tabled)]
struct HistoricalRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Train Pred")]
    train: String,
    #[tabled(rename = "Test Pred")]
    test: String,
}

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

pub(super) fn print_forecast(result: &ForecastResult) {
    println!("{} forecast, {} days", result.symbol, result.len());
    let rows = result.points.iter().enumerate().map(|(i, p)| ForecastRow {
        day: i + 1,
        date: format_date(p.date),
        close: format!("{:.2}", p.value),
    });
    println!("{}", Table::new(rows));
}

pub(super) fn print_historical(view: &HistoricalView) {
    println!("{} historical replay, {} days", view.symbol, view.actual.len());
    let rows = izip!(
        &view.dates,
        &view.actual,
        &view.train_predictions,
        &view.test_predictions
    )
    .map(|(date, actual, train, test)| HistoricalRow {
        date: format_date(*date),
        actual: format!("{:.2}", actual),
        train: cell(*train),
        test: cell(*test),
    });
    println!("{}", Table::new(rows));
}

pub(super) fn print_training_result(result: &TrainingResult) {
    println!(
        "Training complete: {} epochs x batch {} | train RMSE {:.4} | test RMSE {:.4}",
        result.epochs, result.batch_size, result.train_rmse, result.test_rmse
    );
    if let (Some(first), Some(last)) = (result.loss_history.first(), result.loss_history.last()) {
        println!("Loss {:.6} -> {:.6}", first, last);
    }
    if let (Some(first), Some(last)) = (
        result.val_loss_history.first(),
        result.val_loss_history.last(),
    ) {
        println!("Validation loss {:.6} -> {:.6}", first, last);
    }
}
