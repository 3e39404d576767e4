//! # Output Materialization
//!
//! Turns an indexed vault into three output trees inside a documentation
//! site: transformed pages under `src/content/docs/<output>`, images for
//! the site image pipeline under `src/assets/<output>`, and verbatim
//! files under `public/<output>`.
//!
//! Every run starts from clean trees. Files are exported concurrently
//! and independently: one bad note never stops the rest of the vault,
//! and all per-file failures are reported together once every file has
//! been attempted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultport_core::ExportConfig;
//! use vaultport_export::export_vault;
//! use vaultport_vault::{index_vault, open_vault};
//!
//! # async fn example() -> vaultport_core::Result<()> {
//! let config = ExportConfig::new("/path/to/vault");
//! let vault = open_vault(&config)?;
//! let files = index_vault(&vault, &config.ignore)?;
//!
//! let report = export_vault(&config, &vault, &files).await?;
//! println!("exported {} pages", report.pages);
//! # Ok(())
//! # }
//! ```

use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::instrument;
use vaultport_core::{Error, ExportConfig, FileFailure, FileKind, Result, Vault, VaultFile, paths};
use vaultport_transform::{
    HtmlDiagramRenderer, OutputKind, TransformContext, TransformState, transform_note,
};

/// Counts from one completed export run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportReport {
    /// Pages written to the content tree.
    pub pages: usize,
    /// Images copied to the asset tree.
    pub assets: usize,
    /// Other files copied to the public tree.
    pub files: usize,
    /// Notes suppressed by their publish flag.
    pub skipped: usize,
    /// Alias redirect stubs written to the public tree.
    pub aliases: usize,
}

enum Outcome {
    Page { aliases: usize },
    Asset,
    File,
    Skipped,
}

/// Export every indexed file into the configured site directory.
///
/// The three output trees are cleared first, so stale pages from a
/// previous run never survive. Returns [`Error::ExportFailed`] listing
/// every failed file once all files have been attempted.
#[instrument(skip_all, fields(vault = %vault.path.display()))]
pub async fn export_vault(
    config: &ExportConfig,
    vault: &Vault,
    files: &[VaultFile],
) -> Result<ExportReport> {
    config.validate()?;

    for tree in [config.content_dir(), config.assets_dir(), config.public_dir()] {
        reset_tree(&tree).await?;
    }

    let diagrams = HtmlDiagramRenderer;
    let ctx = TransformContext {
        files,
        vault,
        output: &config.output,
        copy_frontmatter: config.copy_frontmatter,
        math: config.math,
        diagrams: &diagrams,
    };

    let results = join_all(files.iter().map(|file| export_file(config, &ctx, file))).await;

    let mut report = ExportReport::default();
    let mut failures = Vec::new();

    for result in results {
        match result {
            Ok(Outcome::Page { aliases }) => {
                report.pages += 1;
                report.aliases += aliases;
            }
            Ok(Outcome::Asset) => report.assets += 1,
            Ok(Outcome::File) => report.files += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(failure) => failures.push(failure),
        }
    }

    if !failures.is_empty() {
        return Err(Error::ExportFailed { failures });
    }

    log::info!(
        "exported {} pages, {} assets, {} files ({} skipped)",
        report.pages,
        report.assets,
        report.files,
        report.skipped
    );

    Ok(report)
}

async fn export_file(
    config: &ExportConfig,
    ctx: &TransformContext<'_>,
    file: &VaultFile,
) -> std::result::Result<Outcome, FileFailure> {
    let result = match file.kind {
        FileKind::Content => export_page(config, ctx, file).await,
        FileKind::Asset => copy_file(file, &config.assets_dir()).await.map(|()| Outcome::Asset),
        FileKind::File => copy_file(file, &config.public_dir()).await.map(|()| Outcome::File),
    };

    result.map_err(|cause| FileFailure {
        vault_path: file.vault_path.clone(),
        cause: anyhow::Error::new(cause),
    })
}

async fn export_page(
    config: &ExportConfig,
    ctx: &TransformContext<'_>,
    file: &VaultFile,
) -> Result<Outcome> {
    let text = tokio::fs::read_to_string(&file.fs_path).await?;

    let mut state = TransformState::default();
    let result = transform_note(file, &text, ctx, &mut state)?;
    if result.skip {
        return Ok(Outcome::Skipped);
    }

    let extension = match result.kind {
        OutputKind::Markdown => "md",
        OutputKind::Mdx => "mdx",
    };
    let page_path = tree_path(&config.content_dir(), &format!("{}.{extension}", file.slug));
    write_output(&page_path, result.content.as_bytes()).await?;

    for alias in &result.aliases {
        add_alias(config, file, alias).await?;
    }

    Ok(Outcome::Page {
        aliases: result.aliases.len(),
    })
}

async fn copy_file(file: &VaultFile, tree: &Path) -> Result<()> {
    let target = tree_path(tree, &file.slug);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(&file.fs_path, &target).await?;
    Ok(())
}

/// Write an HTML stub redirecting an alias URL to the note's page.
async fn add_alias(config: &ExportConfig, file: &VaultFile, alias: &str) -> Result<()> {
    let to = paths::join_paths(&format!("/{}", config.output), &file.slug);
    let from = paths::join_paths(paths::dir_name(&to), alias);

    let stub_dir = paths::slugify_path(&paths::join_paths(
        paths::dir_name(&file.vault_path),
        alias,
    ));
    let stub_path = tree_path(&config.public_dir(), &format!("{stub_dir}/index.html"));

    write_output(&stub_path, redirect_stub(&file.stem, alias, &from, &to).as_bytes()).await
}

/// The stub carries a full `<html>` element so that search indexers do
/// not drop the page, and a canonical link pointing at the real one.
fn redirect_stub(stem: &str, alias: &str, from: &str, to: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <title>{stem}</title>
    <meta http-equiv="refresh" content="0;url={to}">
    <meta name="robots" content="noindex">
    <link rel="canonical" href="{to}">
  </head>
  <body data-pagefind-body>
    <h2 id="alias">Alias</h2>
    <code>(name: {alias})</code>
    <a href="{to}" data-pagefind-ignore>Redirecting from <code>{from}</code> to "<code>{to}</code>"</a>
  </body>
</html>"#
    )
}

/// Resolve a vault-relative slug inside an output tree.
fn tree_path(tree: &Path, slug: &str) -> PathBuf {
    tree.join(slug.trim_start_matches('/'))
}

async fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

async fn reset_tree(tree: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(tree).await {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => return Err(error.into()),
    }
    tokio::fs::create_dir_all(tree).await?;
    Ok(())
}
