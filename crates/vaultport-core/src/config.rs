//! Export configuration.
//!
//! This is the plain-data surface handed to the core by whatever hosts it
//! (the CLI, a build-tool hook, a test). No defaults are read from the
//! environment here; validation happens before any file is touched.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Which source frontmatter keys are copied into generated pages, beyond
/// the always-recomputed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyFrontmatter {
    /// Copy nothing extra.
    #[default]
    None,
    /// Copy only keys the target platform recognizes.
    Known,
    /// Copy every key except the recomputed ones.
    All,
}

impl FromStr for CopyFrontmatter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "known" => Ok(Self::Known),
            "all" => Ok(Self::All),
            other => Err(Error::config_error(format!(
                "unknown copy-frontmatter policy '{other}' (expected none, known, or all)"
            ))),
        }
    }
}

/// Math delimiter handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathOptions {
    /// Treat a single `$` pair as inline math. Disable for vaults where
    /// dollar signs are plain prose.
    pub single_dollar: bool,
}

impl Default for MathOptions {
    fn default() -> Self {
        Self {
            single_dollar: true,
        }
    }
}

/// Configuration for one export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Path to the Obsidian vault directory.
    pub vault_dir: PathBuf,
    /// Root of the documentation site the output trees are written into.
    pub site_dir: PathBuf,
    /// Name of the output directory inside each output tree.
    pub output: String,
    /// Glob patterns excluding files from indexing entirely.
    pub ignore: Vec<String>,
    /// Name of the vault settings folder, normally `.obsidian`.
    pub config_folder: String,
    pub copy_frontmatter: CopyFrontmatter,
    pub math: MathOptions,
}

impl ExportConfig {
    pub fn new(vault_dir: impl Into<PathBuf>) -> Self {
        Self {
            vault_dir: vault_dir.into(),
            site_dir: PathBuf::from("."),
            output: "notes".to_string(),
            ignore: Vec::new(),
            config_folder: ".obsidian".to_string(),
            copy_frontmatter: CopyFrontmatter::default(),
            math: MathOptions::default(),
        }
    }

    /// Validate the configuration surface before a run starts.
    pub fn validate(&self) -> Result<()> {
        if self.output.is_empty() {
            return Err(Error::config_error("output directory name cannot be empty"));
        }

        if self.output.contains('/') {
            return Err(Error::config_error(
                "output must be a directory name, not a path",
            ));
        }

        if self.config_folder.is_empty() {
            return Err(Error::config_error("config folder name cannot be empty"));
        }

        Ok(())
    }

    /// Content output tree: one page per non-skipped note.
    pub fn content_dir(&self) -> PathBuf {
        self.site_dir
            .join("src/content/docs")
            .join(&self.output)
    }

    /// Asset output tree, consumed by the site image pipeline.
    pub fn assets_dir(&self) -> PathBuf {
        self.site_dir.join("src/assets").join(&self.output)
    }

    /// Public output tree, served verbatim.
    pub fn public_dir(&self) -> PathBuf {
        self.site_dir.join("public").join(&self.output)
    }
}
