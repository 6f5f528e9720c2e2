use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::error::StateError;
use crate::models::TrainingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Snapshot of the single training job slot.
///
/// Only the active job mutates it, always under the manager's lock; readers clone it
/// under the same lock so they never observe a half-applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrainingState {
    pub status: TrainingStatus,
    /// 0..=100
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
    pub result: Option<TrainingResult>,
    pub job_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TrainingState {
    pub fn is_running(&self) -> bool {
        self.status == TrainingStatus::Running
    }

    /// `Idle | Completed | Failed -> Running`. Refused while a job is running.
    pub(crate) fn begin(&mut self, job_id: Uuid) -> Result<(), StateError> {
        if self.is_running() {
            return Err(StateError::TrainingInProgress);
        }

        *self = Self {
            status: TrainingStatus::Running,
            progress: 0,
            message: "Training started...".to_string(),
            error: None,
            result: None,
            job_id: Some(job_id),
            started_at: Some(Utc::now()),
            finished_at: None,
        };
        Ok(())
    }

    /// Per-epoch update. Progress is `round(epoch / epochs * 100)` and never moves
    /// backwards within a run.
    pub(crate) fn report_progress(&mut self, epoch: usize, epochs: usize, loss: f64) {
        if !self.is_running() {
            return;
        }
        let pct = if epochs == 0 {
            0
        } else {
            ((epoch as f64 / epochs as f64) * 100.0).round().clamp(0.0, 100.0) as u8
        };
        self.progress = self.progress.max(pct);
        self.message = format!("Epoch {}/{} - loss: {:.6}", epoch, epochs, loss);
    }

    pub(crate) fn succeed(&mut self, result: TrainingResult) {
        self.status = TrainingStatus::Completed;
        self.progress = 100;
        self.message = "Training completed successfully".to_string();
        self.error = None;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: &str) {
        self.status = TrainingStatus::Failed;
        self.progress = 0;
        self.error = Some(error.to_string());
        self.message = format!("Training failed: {}", error);
        self.finished_at = Some(Utc::now());
    }
}
