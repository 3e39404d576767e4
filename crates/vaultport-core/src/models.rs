//! Core data models for the vault registry.
//!
//! These types are built once per run by the indexer, then shared
//! read-only with the resolver, the transform pipeline, and the
//! materializer. Nothing here is ever mutated after indexing and nothing
//! is persisted across runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths;

/// How Obsidian writes new links in this vault (`newLinkFormat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    /// Links carry the full vault-root-relative path.
    Absolute,
    /// Links are relative to the referencing file's directory.
    Relative,
    /// Links use the bare file name when it is unique in the vault.
    Shortest,
}

/// Whether the vault uses wikilinks or standard markdown links
/// (`useMarkdownLinks`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSyntax {
    Markdown,
    Wikilink,
}

/// Link preferences read from the vault settings file, immutable for the
/// whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultOptions {
    pub link_format: LinkFormat,
    pub link_syntax: LinkSyntax,
}

impl Default for VaultOptions {
    fn default() -> Self {
        Self {
            link_format: LinkFormat::Shortest,
            link_syntax: LinkSyntax::Wikilink,
        }
    }
}

/// A validated Obsidian vault.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Absolute path to the vault root.
    pub path: PathBuf,
    pub options: VaultOptions,
}

/// How a discovered file is handled by the materializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// A markdown note, transformed into a page.
    Content,
    /// An image consumable by the site image pipeline.
    Asset,
    /// Any other supported file, copied verbatim under the public tree.
    File,
}

/// Extension family of a supported media or document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
}

const IMAGE_EXTENSIONS: &[&str] = &["avif", "bmp", "gif", "jpeg", "jpg", "png", "svg", "webp"];
const AUDIO_EXTENSIONS: &[&str] = &["3gp", "flac", "m4a", "mp3", "ogg", "wav"];
const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mov", "mp4", "ogv", "webm"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Classify a path by its extension family, if it is a supported
/// non-markdown file.
pub fn media_kind(path: &str) -> Option<MediaKind> {
    let ext = paths::extension(path).to_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Document)
    } else {
        None
    }
}

/// Classify a supported file into its registry kind.
///
/// BMP images are excluded from the asset pipeline (the site image
/// service cannot process them) and fall back to a verbatim copy.
pub fn classify_file(path: &str) -> Option<FileKind> {
    if paths::extension(path).eq_ignore_ascii_case("md") {
        return Some(FileKind::Content);
    }

    match media_kind(path)? {
        MediaKind::Image if !paths::extension(path).eq_ignore_ascii_case("bmp") => {
            Some(FileKind::Asset)
        }
        _ => Some(FileKind::File),
    }
}

/// One entry in the vault registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    /// Absolute filesystem path, used for reads and copies.
    pub fs_path: PathBuf,
    /// Path relative to the vault root, always with a leading `/`.
    /// This is the resolver's primary lookup key.
    pub vault_path: String,
    /// Base name, extension included.
    pub file_name: String,
    /// Base name without extension.
    pub stem: String,
    /// Slugified output identity, derived from `vault_path`.
    pub slug: String,
    pub kind: FileKind,
    /// True iff no other file in the vault shares this base name.
    /// Controls whether "shortest" links may address the file by name
    /// alone.
    pub unique_file_name: bool,
}

impl VaultFile {
    /// Build a registry entry from a vault-relative path.
    ///
    /// `unique_file_name` starts out true; the indexer fixes it up in a
    /// second pass once every file name has been seen.
    pub fn new(fs_path: PathBuf, vault_path: String, kind: FileKind) -> Self {
        let file_name = paths::base_name(&vault_path).to_string();
        let stem = paths::strip_extension(&vault_path).to_string();
        let slug = paths::slugify_path(&vault_path);

        Self {
            fs_path,
            vault_path,
            file_name,
            stem,
            slug,
            kind,
            unique_file_name: true,
        }
    }

    /// Exact stem comparison against a raw reference path.
    ///
    /// `folder/Note` matches a file whose stem is `Note`; matching by
    /// stem alone is what lets "shortest" links address a note from
    /// anywhere in the vault.
    pub fn is_equal_stem(&self, reference: &str) -> bool {
        self.stem == paths::strip_extension(reference)
    }

    /// Exact file-name comparison against a raw reference path.
    pub fn is_equal_file_name(&self, reference: &str) -> bool {
        self.file_name == paths::base_name(reference)
    }
}
