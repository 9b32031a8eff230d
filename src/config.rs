//! Configuration for FlatKV
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{FlatError, Result};

/// Main configuration for a FlatKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the single backing file. Created on first open.
    pub path: PathBuf,

    /// Create missing parent directories of `path` on open
    pub create_dirs: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Flush each record to durable storage before its superseded slot is
    /// freed and the write is reported complete
    pub fsync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./flatkv.db"),
            create_dirs: true,
            fsync_on_write: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Default config pointed at `path`
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Reject configurations that can never open
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(FlatError::Config("store path is empty".to_string()));
        }
        if self.path.is_dir() {
            return Err(FlatError::Config(format!(
                "store path {} is a directory",
                self.path.display()
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Enable or disable flush-to-disk after every write
    pub fn fsync_on_write(mut self, enabled: bool) -> Self {
        self.config.fsync_on_write = enabled;
        self
    }

    /// Enable or disable creation of missing parent directories
    pub fn create_dirs(mut self, enabled: bool) -> Self {
        self.config.create_dirs = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
