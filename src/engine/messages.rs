use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Series;
use crate::models::FitParams;

/// Everything the worker needs to run one fit cycle. The series is an `Arc` snapshot
/// taken when the job was started; later reloads do not affect a running job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_id: Uuid,
    pub series: Arc<Series>,
    pub lookback: usize,
    pub train_ratio: f64,
    pub params: FitParams,
}
