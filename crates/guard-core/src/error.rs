use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the session guard.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The stored credential file could not be read.
    #[error("Failed to read credential file {path}: {source}")]
    CredentialRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored credential file could not be written or removed.
    #[error("Failed to write credential file {path}: {source}")]
    CredentialWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A navigation request could not be carried out.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A host event name is not one of the recognised activity signals.
    #[error("Unknown activity signal: {0}")]
    UnknownSignal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the guard crates.
pub type Result<T> = std::result::Result<T, GuardError>;
