use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use chrono::Utc;

use super::messages::JobRequest;
use super::state::TrainingState;

#[cfg(debug_assertions)]
use crate::config::DF;
use crate::data::ModelStore;
use crate::error::{ComputeError, Result};
use crate::models::{
    Dataset, EpochReport, ScalerState, SequencePredictor, TrainedModel, TrainingResult,
    predict_dataset, split,
};
use crate::utils::{lock, rmse, write};

/// Builds an untrained model for a given lookback length.
pub type ModelFactory<M> = Arc<dyn Fn(usize) -> M + Send + Sync>;

/// The "current model" slot. Replaced wholesale, never mutated in place, so a reader
/// holding the inner `Arc` keeps a consistent model for as long as it needs.
pub type ModelSlot<M> = Arc<RwLock<Option<Arc<TrainedModel<M>>>>>;

/// Handles the worker thread shares with the manager.
pub(crate) struct JobContext<M> {
    pub state: Arc<Mutex<TrainingState>>,
    pub model: ModelSlot<M>,
    pub factory: ModelFactory<M>,
    pub store: Arc<dyn ModelStore<M>>,
}

/// Spawns one background thread for one job. The caller has already moved the state
/// to Running.
pub(crate) fn spawn_training_thread<M>(
    req: JobRequest,
    ctx: JobContext<M>,
) -> std::io::Result<JoinHandle<()>>
where
    M: SequencePredictor + 'static,
{
    thread::Builder::new()
        .name(format!("training-{}", req.job_id.simple()))
        .spawn(move || run_job(req, ctx))
}

fn run_job<M>(req: JobRequest, ctx: JobContext<M>)
where
    M: SequencePredictor + 'static,
{
    log::info!(
        "TRAINING [{}]: {} | {} points | lookback {} | ratio {} | {} epochs x batch {}",
        req.job_id,
        req.series.symbol(),
        req.series.len(),
        req.lookback,
        req.train_ratio,
        req.params.epochs,
        req.params.batch_size,
    );

    let state = ctx.state.clone();
    let mut on_epoch = |r: &EpochReport| {
        #[cfg(debug_assertions)]
        if DF.log_training_epochs {
            log::debug!(
                "TRAINING: epoch {}/{} loss {:.6} val_loss {}",
                r.epoch,
                r.epochs,
                r.loss,
                r.val_loss.map_or_else(|| "-".to_string(), |v| format!("{:.6}", v)),
            );
        }
        lock(&state).report_progress(r.epoch, r.epochs, r.loss);
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_fit_cycle(&req, ctx.factory.as_ref(), &mut on_epoch)
    }))
    .unwrap_or_else(|payload| Err(ComputeError::WorkerPanicked(panic_message(&*payload)).into()));

    match outcome {
        Ok(trained) => {
            // Persistence failure does not invalidate a model we already hold in memory.
            if let Err(e) = ctx.store.save(&trained) {
                log::error!("TRAINING [{}]: failed to save model: {:#}", req.job_id, e);
            }

            log::info!(
                "TRAINING [{}]: complete | train RMSE {:.4} | test RMSE {:.4}",
                req.job_id,
                trained.result.train_rmse,
                trained.result.test_rmse,
            );

            let result = trained.result.clone();
            let trained = Arc::new(trained);

            // Swap and state change happen under the state lock, so anyone who sees
            // Completed also sees the new model.
            let mut st = lock(&ctx.state);
            *write(&ctx.model) = Some(trained);
            st.succeed(result);
        }
        Err(e) => {
            log::error!("TRAINING [{}]: failed: {}", req.job_id, e);
            lock(&ctx.state).fail(&e.to_string());
        }
    }
}

/// One full fit cycle: split, scale on the train segment, window both segments, fit
/// with the test windows as per-epoch validation, then evaluate on both.
pub(crate) fn run_fit_cycle<M>(
    req: &JobRequest,
    factory: &(dyn Fn(usize) -> M + Send + Sync),
    on_epoch: &mut dyn FnMut(&EpochReport),
) -> Result<TrainedModel<M>>
where
    M: SequencePredictor,
{
    let segments = split(req.series.values(), req.train_ratio)?;
    let scaler = ScalerState::fit(segments.train)?;
    let train_ds = Dataset::build(segments.train, &scaler, req.lookback)?;
    let test_ds = Dataset::build(segments.test, &scaler, req.lookback)?;

    let mut model = factory(req.lookback);
    let metrics = crate::trace_time!("Fit cycle", 10_000_000, {
        model.fit(&train_ds, Some(&test_ds), req.params, on_epoch)
    })?;

    let train_rmse = evaluate(&model, &train_ds, &scaler)?;
    let test_rmse = evaluate(&model, &test_ds, &scaler)?;

    Ok(TrainedModel {
        model,
        scaler,
        lookback: req.lookback,
        train_ratio: req.train_ratio,
        result: TrainingResult {
            train_rmse,
            test_rmse,
            loss_history: metrics.loss_history,
            val_loss_history: metrics.val_loss_history,
            epochs: req.params.epochs,
            batch_size: req.params.batch_size,
        },
        trained_at: Utc::now(),
    })
}

/// RMSE in original units over every window of `dataset`.
fn evaluate<M>(model: &M, dataset: &Dataset, scaler: &ScalerState) -> Result<f64>
where
    M: SequencePredictor,
{
    let predicted: Vec<f64> = predict_dataset(model, dataset)?
        .into_iter()
        .map(|p| scaler.inverse(p))
        .collect();
    let actual: Vec<f64> = dataset.labels().iter().map(|&y| scaler.inverse(y)).collect();

    Ok(rmse(&predicted, &actual))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
