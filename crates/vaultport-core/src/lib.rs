//! # vaultport-core
//!
//! Core data models, error types, and configuration for the vault export
//! system. This crate defines the canonical types that all other crates
//! depend on.
//!
//! ## Architecture Principles
//!
//! - **Type-Driven Design**: enums replace string-based flags
//! - **Zero Panic in Libraries**: fallible operations return `Result<T, Error>`
//! - **Immutable Registry**: vault files are computed once per run and
//!   never mutated afterwards
//!
//! ## Core Modules
//!
//! - [`models`] - Registry data types ([`VaultFile`], [`Vault`], link options)
//! - [`error`] - Error types and the [`Result`] alias
//! - [`config`] - The export configuration surface
//! - [`paths`] - Pure path and slug helpers

pub mod config;
pub mod error;
pub mod models;
pub mod paths;

pub use config::{CopyFrontmatter, ExportConfig, MathOptions};
pub use error::{Error, FileFailure, Result};
pub use models::{
    FileKind, LinkFormat, LinkSyntax, MediaKind, Vault, VaultFile, VaultOptions, classify_file,
    media_kind,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{CopyFrontmatter, ExportConfig, MathOptions};
    pub use crate::error::{Error, FileFailure, Result};
    pub use crate::models::{
        FileKind, LinkFormat, LinkSyntax, MediaKind, Vault, VaultFile, VaultOptions,
    };
}
