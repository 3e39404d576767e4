//! Error types for the vault export system.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! This ensures composable error handling across crates.

use std::io;
use thiserror::Error as ThisError;

/// A single per-file failure recorded during an export run.
///
/// The path is always the vault-relative path of the offending file so
/// that the aggregate report reads the same regardless of where the
/// vault lives on disk.
#[derive(Debug)]
pub struct FileFailure {
    pub vault_path: String,
    pub cause: anyhow::Error,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.vault_path, self.cause)
    }
}

/// The core error type for all vaultport operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The provided path is not a usable Obsidian vault
    #[error("Invalid vault: {reason}")]
    InvalidVault { reason: String },

    /// Vault settings file exists but cannot be read or parsed
    #[error("Failed to read vault settings: {reason}")]
    Settings { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Parse error
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// One or more per-file jobs failed during an export run.
    ///
    /// Raised only after every file has been attempted, so the output
    /// tree contains everything that could be written.
    #[error("Failed to export {} file(s):\n{}", failures.len(), format_failures(failures))]
    ExportFailed { failures: Vec<FileFailure> },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

fn format_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  {failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid vault error
    pub fn invalid_vault(reason: impl Into<String>) -> Self {
        Error::InvalidVault {
            reason: reason.into(),
        }
    }

    /// Create a settings error
    pub fn settings(reason: impl Into<String>) -> Self {
        Error::Settings {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
