use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;

use uuid::Uuid;

use super::messages::JobRequest;
use super::state::TrainingState;
use super::worker::{self, JobContext, ModelFactory, ModelSlot};

use crate::data::ModelStore;
use crate::domain::Series;
use crate::error::{ComputeError, Result};
use crate::models::{FitParams, SequencePredictor, TrainedModel};
use crate::utils::{lock, read, write};

/// Owns the one training job slot and the one current-model slot.
///
/// At most one job runs at a time: `start` checks and claims the slot under the
/// state lock, and the job itself runs on its own thread so status polling never
/// waits on a fit.
pub struct TrainingManager<M> {
    state: Arc<Mutex<TrainingState>>,
    model: ModelSlot<M>,
    factory: ModelFactory<M>,
    store: Arc<dyn ModelStore<M>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<M> TrainingManager<M>
where
    M: SequencePredictor + 'static,
{
    pub fn new(factory: ModelFactory<M>, store: Arc<dyn ModelStore<M>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrainingState::default())),
            model: Arc::new(RwLock::new(None)),
            factory,
            store,
            worker: Mutex::new(None),
        }
    }

    /// Load-on-start: adopt a previously saved model if the store has one.
    /// Returns whether a model was restored.
    pub fn restore(&self) -> anyhow::Result<bool> {
        match self.store.load()? {
            Some(trained) => {
                *write(&self.model) = Some(Arc::new(trained));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Claim the job slot and run one fit cycle on a background thread.
    pub fn start(
        &self,
        series: Arc<Series>,
        lookback: usize,
        train_ratio: f64,
        params: FitParams,
    ) -> Result<Uuid> {
        let job_id = Uuid::new_v4();

        let mut worker_slot = lock(&self.worker);
        lock(&self.state).begin(job_id)?;

        // The previous job reached a terminal state before releasing the slot, so this
        // join only waits for its thread to unwind.
        if let Some(previous) = worker_slot.take() {
            let _ = previous.join();
        }

        let req = JobRequest {
            job_id,
            series,
            lookback,
            train_ratio,
            params,
        };
        let ctx = JobContext {
            state: self.state.clone(),
            model: self.model.clone(),
            factory: self.factory.clone(),
            store: self.store.clone(),
        };

        match worker::spawn_training_thread(req, ctx) {
            Ok(handle) => {
                *worker_slot = Some(handle);
                Ok(job_id)
            }
            Err(e) => {
                let err = ComputeError::WorkerPanicked(format!("could not spawn worker: {}", e));
                lock(&self.state).fail(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Consistent copy of the job state.
    pub fn status(&self) -> TrainingState {
        lock(&self.state).clone()
    }

    /// The model to use for one whole call. Later swaps do not affect the returned handle.
    pub fn current_model(&self) -> Option<Arc<TrainedModel<M>>> {
        read(&self.model).clone()
    }

    pub fn has_model(&self) -> bool {
        read(&self.model).is_some()
    }

    /// Remove the persisted artifact and clear the current-model slot.
    pub fn delete_model(&self) -> anyhow::Result<()> {
        self.store.delete()?;
        *write(&self.model) = None;
        Ok(())
    }

    /// Block until the most recently started job's thread exits. Returns the final state.
    pub fn wait(&self) -> TrainingState {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        self.status()
    }
}

impl<M> Drop for TrainingManager<M> {
    fn drop(&mut self) {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}
