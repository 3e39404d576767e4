//! Vault access for vaultport.
//!
//! This crate owns everything that touches the vault on disk before the
//! transform stage runs: validating that a directory really is an
//! Obsidian vault, reading its `app.json` settings, and building the
//! immutable file registry the resolver works from.
//!
//! # Example
//!
//! ```no_run
//! use vaultport_core::ExportConfig;
//! use vaultport_vault::{index_vault, open_vault};
//!
//! # fn main() -> vaultport_core::Result<()> {
//! let config = ExportConfig::new("./my-vault");
//! let vault = open_vault(&config)?;
//! let files = index_vault(&vault, &config.ignore)?;
//! println!("{} files indexed", files.len());
//! # Ok(())
//! # }
//! ```

pub mod indexer;
pub mod settings;

pub use indexer::{index_vault, open_vault};
pub use settings::read_vault_options;

/// Common imports for vault consumers.
pub mod prelude {
    pub use crate::indexer::{index_vault, open_vault};
    pub use crate::settings::read_vault_options;
    pub use vaultport_core::prelude::*;
}
