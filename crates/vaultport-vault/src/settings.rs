//! Vault settings file reading.
//!
//! Obsidian stores editor preferences in `<vault>/<config folder>/app.json`.
//! Only the two link-related fields matter for the export; everything else
//! in the file is ignored.

use serde::Deserialize;
use std::path::Path;
use vaultport_core::{Error, LinkFormat, LinkSyntax, Result, VaultOptions};

/// The subset of `app.json` the exporter reads.
///
/// Both fields are optional: a freshly created vault ships an empty
/// settings file and gets Obsidian's defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default = "default_link_format")]
    new_link_format: LinkFormat,
    #[serde(default)]
    use_markdown_links: bool,
}

fn default_link_format() -> LinkFormat {
    LinkFormat::Shortest
}

/// Read link preferences from the vault settings file.
///
/// A missing or unparseable settings file is a fatal setup error: without
/// it there is no way to know how links in the vault are written.
pub fn read_vault_options(settings_path: &Path) -> Result<VaultOptions> {
    let data = std::fs::read_to_string(settings_path).map_err(|e| {
        Error::settings(format!("{}: {e}", settings_path.display()))
    })?;

    let settings: AppSettings = serde_json::from_str(&data).map_err(|e| {
        Error::settings(format!("{}: {e}", settings_path.display()))
    })?;

    Ok(VaultOptions {
        link_format: settings.new_link_format,
        link_syntax: if settings.use_markdown_links {
            LinkSyntax::Markdown
        } else {
            LinkSyntax::Wikilink
        },
    })
}
