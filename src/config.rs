//! Application configuration for the command-line front end.
//!
//! Loaded from an optional JSON file; command-line flags override individual
//! values afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WizardError;
use crate::storage::{DEFAULT_STORAGE_KEY, FileStore, LocalDraftStore};

/// Directory drafts are kept in when none is configured.
pub const DEFAULT_STORE_DIR: &str = ".regwizard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    /// Directory holding the file-backed key-value store
    pub store_dir: PathBuf,
    /// Key the draft is stored under; change it to abandon old drafts
    pub storage_key: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file. Missing keys take defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Check values that would otherwise fail later at first use.
    pub fn validate(&self) -> std::result::Result<(), WizardError> {
        if self.store_dir.as_os_str().is_empty() {
            return Err(WizardError::config("store_dir must not be empty"));
        }
        FileStore::new(&self.store_dir)
            .path_for(&self.storage_key)
            .map_err(|e| WizardError::config(e.to_string()))?;
        Ok(())
    }

    /// Draft store described by this configuration.
    pub fn draft_store(&self) -> LocalDraftStore<FileStore> {
        LocalDraftStore::with_key(FileStore::new(&self.store_dir), self.storage_key.clone())
    }
}
