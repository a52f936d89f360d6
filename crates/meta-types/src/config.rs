//! Configuration loading for the META indexer.
//!
//! Layered config: defaults -> default config file -> explicit config file -> env vars.
//! The default config file lives at `<platform config dir>/meta-index/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::MetaError;

/// Main indexer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB object store directory
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Path to the SQLite index database file
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of identifier stream channels
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "meta-index")
}

fn default_store_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("objects"))
        .unwrap_or_else(|| PathBuf::from("./objects"))
        .to_string_lossy()
        .to_string()
}

fn default_index_path() -> String {
    project_dirs()
        .map(|p| p.data_local_dir().join("index.db"))
        .unwrap_or_else(|| PathBuf::from("./index.db"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stream_buffer() -> usize {
    64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            index_path: default_index_path(),
            log_level: default_log_level(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Default config file, if present
    /// 3. Explicit config file (optional, must exist when given)
    /// 4. Environment variables (META_*)
    pub fn load(config_path: Option<&str>) -> Result<Self, MetaError> {
        let default_config_path = project_dirs()
            .map(|p| p.config_dir().join("config"))
            .unwrap_or_else(|| PathBuf::from("config"));

        let mut builder = Config::builder()
            .set_default("store_path", default_store_path())
            .map_err(|e| MetaError::Config(e.to_string()))?
            .set_default("index_path", default_index_path())
            .map_err(|e| MetaError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| MetaError::Config(e.to_string()))?
            .set_default("stream_buffer", default_stream_buffer() as i64)
            .map_err(|e| MetaError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // META_STORE_PATH, META_INDEX_PATH, META_LOG_LEVEL, META_STREAM_BUFFER
        builder = builder.add_source(Environment::with_prefix("META").try_parsing(true));

        let settings: Settings = builder
            .build()
            .map_err(|e| MetaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MetaError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), MetaError> {
        if self.stream_buffer == 0 {
            return Err(MetaError::Config("stream_buffer must be > 0".to_string()));
        }
        Ok(())
    }

    /// Object store path with a leading `~/` expanded.
    pub fn expanded_store_path(&self) -> PathBuf {
        expand_home(&self.store_path)
    }

    /// Index database path with a leading `~/` expanded.
    pub fn expanded_index_path(&self) -> PathBuf {
        expand_home(&self.index_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
