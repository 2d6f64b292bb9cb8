// src/errors.rs

//! Crate-wide error type and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcdockError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("failed to spawn process for '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command has already been started")]
    AlreadyStarted,

    #[error("no running process to signal")]
    NotRunning,

    #[error("no command with alias '{0}' in manifest")]
    AliasNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcdockError>;
