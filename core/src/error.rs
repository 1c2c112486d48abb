//! Error types for registration and dispatch.
//!
//! Registration errors are configuration mistakes found at startup. Dispatch
//! errors describe bad user input; their text has already been written to the
//! response by the time the error is returned.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors produced by the command table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A non-stub command with this path is already registered.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    /// The path is empty after normalization.
    #[error("command path cannot be empty")]
    EmptyPath,

    /// The input token matched more than one sibling.
    #[error("ambiguous command '{token}' ({candidates} candidates)")]
    AmbiguousCommand {
        /// Token as typed.
        token: String,
        /// Number of siblings still matching.
        candidates: usize,
    },

    /// The input token matched no sibling.
    #[error("command not found: '{token}'")]
    CommandNotFound {
        /// Token as typed.
        token: String,
    },

    /// `help` or `?` was followed by more input.
    #[error("help must appear at line end (position {position})")]
    TrailingHelpMisplaced {
        /// Byte offset right after the help keyword.
        position: usize,
    },

    /// A handler reported a failure.
    #[error("handler failed: {0}")]
    Handler(String),

    /// Growing the table's storage failed; no state was modified.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

impl CommandError {
    /// Convenience constructor for handler failures.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Returns `true` for errors caused by user input rather than setup.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousCommand { .. }
                | Self::CommandNotFound { .. }
                | Self::TrailingHelpMisplaced { .. }
        )
    }
}

/// Convenience alias for results with [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors() {
        let not_found = CommandError::CommandNotFound {
            token: "frob".to_string(),
        };
        assert!(not_found.is_input_error());
        assert!(CommandError::TrailingHelpMisplaced { position: 4 }.is_input_error());
        assert!(!CommandError::handler("boom").is_input_error());
        assert!(!CommandError::DuplicateCommand("show".to_string()).is_input_error());
        assert!(!CommandError::EmptyPath.is_input_error());
    }
}
