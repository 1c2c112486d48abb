//! Error types for the transport and configuration layer.

use cmdtree_core::CommandError;
use thiserror::Error;

/// Errors that can occur while serving or talking to a command socket.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket or file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Building the command table failed.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The peer closed the connection before a full response arrived.
    #[error("connection closed by peer")]
    Disconnected,
}

/// Convenience alias for results with [`ServerError`].
pub type Result<T> = std::result::Result<T, ServerError>;
