//! Server configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! socket_path: /tmp/command_socket
//! read_buffer_size: 1024
//! prompt: "> "
//! log_level: info
//! ```
//!
//! Every field is optional; missing fields take the defaults shown above.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default control socket location.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/command_socket";

/// Settings for the control socket server and its line client.
///
/// # Examples
///
/// ```
/// # use cmdtree_server::ServerConfig;
/// let config: ServerConfig = serde_yaml::from_str("socket_path: /run/app.sock").unwrap();
/// assert_eq!(config.socket_path.to_str(), Some("/run/app.sock"));
/// assert_eq!(config.read_buffer_size, 1024);
/// assert_eq!(config.prompt, "> ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Filesystem path of the Unix socket.
    pub socket_path: PathBuf,
    /// Longest accepted input line in bytes; longer lines are truncated.
    pub read_buffer_size: usize,
    /// Prompt printed by the line client.
    pub prompt: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            read_buffer_size: 1024,
            prompt: "> ".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ServerError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::ServerError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ServerError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::ServerError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns a copy using `socket_path` instead.
    pub fn with_socket_path(mut self, socket_path: impl Into<PathBuf>) -> Self {
        self.socket_path = socket_path.into();
        self
    }
}
