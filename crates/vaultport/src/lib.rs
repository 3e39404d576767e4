//! # vaultport
//!
//! Export an Obsidian vault as pages and assets for a documentation site.
//!
//! This crate ties the pipeline together: open and index the vault
//! (`vaultport-vault`), transform each note out of the Obsidian markdown
//! dialect (`vaultport-transform`), and materialize the output trees
//! inside the site directory (`vaultport-export`). The `vaultport`
//! binary is a thin CLI over [`run_export`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultport::run_export;
//! use vaultport_core::ExportConfig;
//!
//! # async fn example() -> vaultport_core::Result<()> {
//! let mut config = ExportConfig::new("/path/to/vault");
//! config.site_dir = "/path/to/site".into();
//!
//! let report = run_export(&config).await?;
//! println!("{} pages, {} assets", report.pages, report.assets);
//! # Ok(())
//! # }
//! ```

use tracing::instrument;
use vaultport_core::Result;

pub use vaultport_core::{CopyFrontmatter, ExportConfig, MathOptions};
pub use vaultport_export::{ExportReport, export_vault};
pub use vaultport_transform::{TransformContext, TransformState, transform_note};
pub use vaultport_vault::{index_vault, open_vault};

/// Run one full export: open, index, transform, materialize.
#[instrument(skip_all, fields(vault = %config.vault_dir.display()))]
pub async fn run_export(config: &ExportConfig) -> Result<ExportReport> {
    config.validate()?;

    let vault = vaultport_vault::open_vault(config)?;
    log::info!(
        "vault opened with {:?} links in {:?} format",
        vault.options.link_syntax,
        vault.options.link_format
    );

    let files = vaultport_vault::index_vault(&vault, &config.ignore)?;
    log::info!("indexed {} files", files.len());

    vaultport_export::export_vault(config, &vault, &files).await
}
