use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::PromptStore;
use crate::storage::{default_storage, StorageConfig};

#[derive(Debug, thiserror::Error)]
pub enum ModelStoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotTrained(String),
    #[error("Model not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A trained classifier as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedModel {
    pub model_id: String,
    pub prompts: PromptStore,
    pub temperature: f32,
    pub prompt_sample_size: usize,
    pub target_column: String,
}

/// Whether [`ModelStore::save`] wrote the file. `Skipped` means a file with
/// that id already existed and overwriting was not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(String),
    Skipped(String),
}

impl SaveOutcome {
    pub fn model_id(&self) -> &str {
        match self {
            Self::Written(id) | Self::Skipped(id) => id,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Saved models as `<models_dir>/<model_id>.json` files.
#[derive(Debug, Clone)]
pub struct ModelStore {
    storage: StorageConfig,
}

impl ModelStore {
    /// Creates a ModelStore over the process-wide default storage root
    pub fn new_default() -> io::Result<Self> {
        Ok(Self { storage: default_storage()? })
    }

    pub fn new(storage: StorageConfig) -> io::Result<Self> {
        storage.init()?;
        Ok(Self { storage })
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn get_model_path(&self, model_id: &str) -> PathBuf {
        self.storage.models_dir.join(format!("{}.json", model_id))
    }

    pub fn exists(&self, model_id: &str) -> bool {
        validate_model_id(model_id).is_ok() && self.get_model_path(model_id).is_file()
    }

    /// Writes `model` to disk.
    ///
    /// An empty model id is replaced by a generated one. Every known class
    /// must have at least one description. The write is not atomic.
    pub fn save(&self, model: &SavedModel, overwrite: bool) -> Result<SaveOutcome, ModelStoreError> {
        let undescribed = model.prompts.undescribed_labels();
        if !undescribed.is_empty() {
            return Err(ModelStoreError::NotTrained(format!(
                "Classes without descriptions: {}",
                undescribed.join(", ")
            )));
        }

        let mut model = model.clone();
        if model.model_id.is_empty() {
            model.model_id = uuid::Uuid::new_v4().to_string();
            log::info!("Model id is empty, generated '{}'", model.model_id);
        }
        validate_model_id(&model.model_id)?;

        let path = self.get_model_path(&model.model_id);
        if path.exists() {
            if !overwrite {
                log::info!("Model file {:?} already exists, skipping", path);
                return Ok(SaveOutcome::Skipped(model.model_id));
            }
            log::info!("Model file {:?} already exists, rewriting", path);
        }

        // The root may have been deleted since this store was created
        fs::create_dir_all(&self.storage.models_dir)?;
        let bytes = serde_json::to_vec_pretty(&model)?;
        fs::write(&path, bytes)?;
        log::info!("Saved model '{}' to {:?}", model.model_id, path);

        Ok(SaveOutcome::Written(model.model_id))
    }

    pub fn load(&self, model_id: &str) -> Result<SavedModel, ModelStoreError> {
        validate_model_id(model_id)?;

        let path = self.get_model_path(model_id);
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ModelStoreError::NotFound(model_id.to_string()),
            _ => ModelStoreError::Io(e),
        })?;
        let model: SavedModel = serde_json::from_slice(&bytes)?;
        log::info!("Loaded model '{}' from {:?}", model.model_id, path);
        Ok(model)
    }

    pub fn remove(&self, model_id: &str) -> Result<(), ModelStoreError> {
        validate_model_id(model_id)?;
        let path = self.get_model_path(model_id);
        if !path.exists() {
            return Err(ModelStoreError::NotFound(model_id.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    /// Ids of every saved model, sorted.
    pub fn list(&self) -> Result<Vec<String>, ModelStoreError> {
        if !self.storage.models_dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.storage.models_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// A model id must name a single file inside the models directory.
fn validate_model_id(model_id: &str) -> Result<(), ModelStoreError> {
    if model_id.is_empty() {
        return Err(ModelStoreError::Validation("Model id cannot be empty".into()));
    }
    let mut components = Path::new(model_id).components();
    let single_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_name || model_id.contains(['/', '\\']) {
        return Err(ModelStoreError::Validation(format!(
            "Model id '{}' must not contain path separators or '..'",
            model_id
        )));
    }
    Ok(())
}
