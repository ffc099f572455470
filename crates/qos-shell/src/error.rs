//! Error types for qos-shell.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level shell errors.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The app catalog rejected its seed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A cross-thread post failed.
    #[error("post failed: {0}")]
    Post(#[from] PostError),

    /// A periodic tick failed.
    #[error("tick failed: {0}")]
    Tick(#[from] TickError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML did not match the config schema.
    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A value is out of its allowed range.
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// App catalog seeding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An entry with this id already exists with different contents.
    #[error("conflicting entry for app id '{id}'")]
    Conflict { id: String },
}

/// Failure to post a task to the foreground queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PostError {
    /// The queue is at capacity; the post was dropped.
    #[error("foreground queue full")]
    Full,

    /// The foreground queue no longer exists.
    #[error("foreground queue closed")]
    Closed,
}

/// Failure inside a single periodic tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    /// A particle reached a non-finite position and was reset.
    #[error("particle {index} left finite space")]
    NonFinite { index: usize },

    /// The tick panicked.
    #[error("{activity} tick panicked: {message}")]
    Panicked {
        activity: &'static str,
        message: String,
    },
}
