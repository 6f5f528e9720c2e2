use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[cfg(debug_assertions)]
use crate::config::DF;
use crate::config::{PERSISTENCE, model_filename};
use crate::models::TrainedModel;

/// Persistence hooks for the fitted model: load-on-start, save-on-success, delete.
pub trait ModelStore<M>: Send + Sync {
    fn load(&self) -> Result<Option<TrainedModel<M>>>;
    fn save(&self, trained: &TrainedModel<M>) -> Result<()>;
    /// Returns whether an artifact existed.
    fn delete(&self) -> Result<bool>;
}

/// Model artifact wrapper with metadata. `T` is the trained model, owned on load
/// and borrowed on save.
#[derive(Serialize, Deserialize)]
struct ModelFile<T> {
    version: u32,
    symbol: String,
    saved_at: DateTime<Utc>,
    trained: T,
}

/// One bincode file per symbol under the model directory.
pub struct BincodeModelStore {
    symbol: String,
    path: PathBuf,
}

impl BincodeModelStore {
    pub fn new(model_dir: &Path, symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            path: model_dir.join(model_filename(symbol)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

// Helper function to create a new file and any missing parent directories.
fn create_file_with_parents(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))
}

/// Serialize `value` to a fresh file at `path`, flushing before the handle closes.
fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(create_file_with_parents(path)?);
    bincode::serialize_into(&mut writer, value)
        .with_context(|| format!("Failed to serialize model to: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush model: {}", path.display()))
}

impl<M> ModelStore<M> for BincodeModelStore
where
    M: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Result<Option<TrainedModel<M>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open model: {}", self.path.display()))?;
        let stored: ModelFile<TrainedModel<M>> = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to deserialize model from: {}", self.path.display()))?;

        if stored.version != PERSISTENCE.model_version {
            bail!(
                "Model version mismatch: file v{} vs required v{}",
                stored.version,
                PERSISTENCE.model_version
            );
        }
        if stored.symbol != self.symbol {
            bail!(
                "Model symbol mismatch: file holds {}, expected {}",
                stored.symbol,
                self.symbol
            );
        }

        #[cfg(debug_assertions)]
        if DF.log_model_store {
            log::debug!(
                "MODEL STORE: loaded {} (saved {})",
                self.path.display(),
                stored.saved_at
            );
        }

        Ok(Some(stored.trained))
    }

    /// Writes a sibling temp file and renames it over the artifact, so the previous
    /// model stays intact until the new one is fully on disk.
    fn save(&self, trained: &TrainedModel<M>) -> Result<()> {
        let tmp_path = self.tmp_path();
        let stored = ModelFile {
            version: PERSISTENCE.model_version,
            symbol: self.symbol.clone(),
            saved_at: Utc::now(),
            trained,
        };

        let written = write_bincode(&tmp_path, &stored).and_then(|()| {
            fs::rename(&tmp_path, &self.path).with_context(|| {
                format!(
                    "Failed to move {} into place at {}",
                    tmp_path.display(),
                    self.path.display()
                )
            })
        });
        if written.is_err() && tmp_path.is_file() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;

        #[cfg(debug_assertions)]
        if DF.log_model_store {
            log::debug!("MODEL STORE: saved {}", self.path.display());
        }
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to delete model: {}", self.path.display()))?;
        Ok(true)
    }
}

/// Keeps nothing. For callers that want in-memory models only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullModelStore;

impl<M> ModelStore<M> for NullModelStore {
    fn load(&self) -> Result<Option<TrainedModel<M>>> {
        Ok(None)
    }

    fn save(&self, _trained: &TrainedModel<M>) -> Result<()> {
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearWindowModel, ScalerState, TrainingResult};

    fn trained() -> TrainedModel<LinearWindowModel> {
        TrainedModel {
            model: LinearWindowModel::new(4, 0.05),
            scaler: ScalerState::fit(&[10.0, 20.0]).unwrap(),
            lookback: 4,
            train_ratio: 0.65,
            result: TrainingResult {
                train_rmse: 1.5,
                test_rmse: 2.5,
                loss_history: vec![0.3, 0.2, 0.1],
                val_loss_history: vec![0.35, 0.3, 0.25],
                epochs: 3,
                batch_size: 8,
            },
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = BincodeModelStore::new(dir.path(), "NFLX");
        let loaded: Option<TrainedModel<LinearWindowModel>> = store.load().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_creates_directories_and_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = BincodeModelStore::new(&dir.path().join("nested/models"), "nflx");
        let original = trained();

        store.save(&original).unwrap();
        assert!(store.path().ends_with("NFLX_model_v2.bin"));

        let loaded: TrainedModel<LinearWindowModel> = store.load().unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_replaces_previous_artifact_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = BincodeModelStore::new(dir.path(), "NFLX");
        store.save(&trained()).unwrap();

        let mut newer = trained();
        newer.result.test_rmse = 0.75;
        store.save(&newer).unwrap();

        assert!(!store.tmp_path().exists());
        let loaded: TrainedModel<LinearWindowModel> = store.load().unwrap().unwrap();
        assert_eq!(loaded, newer);
    }

    #[test]
    fn test_failed_save_keeps_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = BincodeModelStore::new(dir.path(), "NFLX");
        let original = trained();
        store.save(&original).unwrap();

        // A directory squatting on the temp path makes the write fail up front.
        fs::create_dir_all(store.tmp_path()).unwrap();
        let mut newer = trained();
        newer.result.test_rmse = 0.75;
        assert!(store.save(&newer).is_err());

        let loaded: TrainedModel<LinearWindowModel> = store.load().unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_delete_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let store = BincodeModelStore::new(dir.path(), "NFLX");
        store.save(&trained()).unwrap();

        assert!(ModelStore::<LinearWindowModel>::delete(&store).unwrap());
        assert!(!store.path().exists());
        assert!(!ModelStore::<LinearWindowModel>::delete(&store).unwrap());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = BincodeModelStore::new(dir.path(), "NFLX");
        fs::write(store.path(), b"not a model").unwrap();
        let res: Result<Option<TrainedModel<LinearWindowModel>>> = store.load();
        assert!(res.is_err());
    }
}
