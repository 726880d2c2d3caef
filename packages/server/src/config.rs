//! Server configuration, loaded from a JSON file.

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::ui::handler::SessionLimits;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file ({path}): {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0} must be greater than zero")]
    Zero(&'static str),
}

/// Top-level server configuration. Every key is optional.
///
/// ```json
/// {
///   "log_path": "chat.log",
///   "address": "127.0.0.1:6000",
///   "http_address": "127.0.0.1:8080",
///   "max_name_length": 32,
///   "msg_buffer_size": 512,
///   "max_history_lines": 100
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Chat log file, truncated at startup. No chat log when absent.
    pub log_path: Option<PathBuf>,
    /// Raw TCP chat listener
    pub address: String,
    /// HTTP facade listener
    pub http_address: String,
    pub max_name_length: usize,
    /// Read buffer per session and maximum HTTP body size
    pub msg_buffer_size: usize,
    pub max_history_lines: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            address: "127.0.0.1:6000".into(),
            http_address: "127.0.0.1:8080".into(),
            max_name_length: 32,
            msg_buffer_size: 512,
            max_history_lines: 100,
        }
    }
}

impl ServerConfig {
    /// Read and parse the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_length == 0 {
            return Err(ConfigError::Zero("max_name_length"));
        }
        if self.msg_buffer_size == 0 {
            return Err(ConfigError::Zero("msg_buffer_size"));
        }
        if self.max_history_lines == 0 {
            return Err(ConfigError::Zero("max_history_lines"));
        }
        Ok(())
    }

    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            msg_buffer_size: self.msg_buffer_size,
            max_name_length: self.max_name_length,
        }
    }
}
