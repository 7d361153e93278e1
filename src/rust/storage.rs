use lazy_static::lazy_static;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const ROOT_ENV_VAR: &str = "TAO_HOME";
const ROOT_DIR_NAME: &str = ".tao";
const MODELS_DIR_NAME: &str = "models";

lazy_static! {
    // Resolved and created once per process; later callers share the outcome.
    static ref DEFAULT_STORAGE: Result<StorageConfig, String> = {
        let config = StorageConfig::new(StorageConfig::default_root());
        config.init().map(|_| config).map_err(|e| e.to_string())
    };
}

/// Location of the on-disk state: a root directory and the `models`
/// directory beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub models_dir: PathBuf,
}

impl StorageConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let models_dir = root.join(MODELS_DIR_NAME);
        Self { root, models_dir }
    }

    /// Returns the default storage root path
    pub fn default_root() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(ROOT_ENV_VAR) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        // 2. Use the user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(ROOT_DIR_NAME);
        }

        // 3. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join(ROOT_DIR_NAME)
    }

    /// Creates the root and models directories if they do not exist
    pub fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.models_dir)?;
        log::debug!("Storage ready at {:?}", self.root);
        Ok(())
    }

    /// Removes the whole storage root, including every saved model
    pub fn delete(&self) -> io::Result<()> {
        if self.root.exists() {
            log::info!("Deleting storage root {:?}", self.root);
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

/// The process-wide default storage, created on first use.
pub fn default_storage() -> io::Result<StorageConfig> {
    DEFAULT_STORAGE
        .as_ref()
        .map(Clone::clone)
        .map_err(|msg| io::Error::new(io::ErrorKind::Other, msg.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_dir_layout() {
        let config = StorageConfig::new("/tmp/tao-layout");
        assert_eq!(config.models_dir, PathBuf::from("/tmp/tao-layout/models"));
    }

    #[test]
    fn test_init_and_delete() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = StorageConfig::new(dir.path().join("root"));

        config.init()?;
        assert!(config.models_dir.is_dir());
        config.init()?; // Second call should be fine

        config.delete()?;
        assert!(!config.root.exists());
        config.delete()?; // Deleting a missing root is a no-op
        Ok(())
    }

    #[test]
    fn test_default_root_resolution() {
        // Resolution only; nothing is created on disk
        let root = StorageConfig::default_root();
        match env::var(ROOT_ENV_VAR) {
            Ok(path) if !path.is_empty() => assert_eq!(root, PathBuf::from(path)),
            _ => assert!(root.ends_with(ROOT_DIR_NAME)),
        }
        assert_eq!(StorageConfig::default_root(), root);
        assert!(StorageConfig::new(&root).models_dir.ends_with(MODELS_DIR_NAME));
    }
}
