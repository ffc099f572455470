//! Error types for qos-terminal.

use qos_shell::ShellError;
use thiserror::Error;

/// Errors that stop the terminal frontend.
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error from terminal operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The shell could not be built.
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),

    /// Terminal not available.
    #[error("Terminal not available")]
    TerminalNotAvailable,
}

impl From<qos_shell::ConfigError> for TuiError {
    fn from(err: qos_shell::ConfigError) -> Self {
        Self::Shell(err.into())
    }
}
