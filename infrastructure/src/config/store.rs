//! Live configuration store
//!
//! Holds the process-wide current [`CouncilConfig`] behind a lock and
//! persists accepted updates to a TOML file. Readers take an `Arc`
//! snapshot; an update builds and validates the new value, writes it to
//! disk, and only then replaces the live `Arc`. A rejected or unpersisted
//! update leaves the live value untouched.

use crate::config::loader::ConfigLoader;
use council_application::config::{ConfigError, ConfigUpdate, CouncilConfig};
use council_application::ports::config_source::ConfigSource;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::info;

/// File-backed implementation of the [`ConfigSource`] port
pub struct FileConfigStore {
    path: PathBuf,
    current: RwLock<Arc<CouncilConfig>>,
}

impl FileConfigStore {
    /// Open the store, loading the file at `path` merged over defaults.
    ///
    /// A missing file is not an error; defaults apply and the file is
    /// created on the first accepted update.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = ConfigLoader::load(Some(&path))?;
        config.validate()?;
        Ok(Self {
            path,
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// Store at the default global config location, with defaults when
    /// no config directory is resolvable.
    pub fn open_default() -> Result<Self, ConfigError> {
        match ConfigLoader::global_config_path() {
            Some(path) => Self::open(path),
            None => Ok(Self {
                path: PathBuf::from("config.toml"),
                current: RwLock::new(Arc::new(CouncilConfig::default())),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, config: &CouncilConfig) -> Result<(), ConfigError> {
        let rendered =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Persist(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Persist(e.to_string()))?;
        }
        std::fs::write(&self.path, rendered).map_err(|e| ConfigError::Persist(e.to_string()))
    }
}

impl ConfigSource for FileConfigStore {
    fn snapshot(&self) -> Arc<CouncilConfig> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            // A poisoned lock still holds a valid last value
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn update(&self, update: ConfigUpdate) -> Result<Arc<CouncilConfig>, ConfigError> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let next = guard.apply(update);
        next.validate()?;
        self.persist(&next)?;

        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        info!("Configuration updated and persisted to {}", self.path.display());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Model;

    fn store_in(dir: &tempfile::TempDir) -> FileConfigStore {
        FileConfigStore::open(dir.path().join("config.toml")).unwrap()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(*store.snapshot(), CouncilConfig::default());
    }

    #[test]
    fn test_update_persists_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .update(ConfigUpdate {
                chairman: Some(Model::new("anthropic/claude-opus-4.5")),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            store.snapshot().chairman,
            Model::new("anthropic/claude-opus-4.5")
        );

        let reopened = store_in(&dir);
        assert_eq!(
            reopened.snapshot().chairman,
            Model::new("anthropic/claude-opus-4.5")
        );
    }

    #[test]
    fn test_invalid_update_leaves_live_value_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let before = store.snapshot();

        let result = store.update(ConfigUpdate {
            chairman: Some(Model::new("outsider/model")),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::ChairmanNotInCouncil(_))));
        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_snapshot_is_immune_to_later_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let snapshot = store.snapshot();

        store
            .update(ConfigUpdate {
                request_timeout_secs: Some(30),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(snapshot.request_timeout_secs, 120);
        assert_eq!(store.snapshot().request_timeout_secs, 30);
    }
}
