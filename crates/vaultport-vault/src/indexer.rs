//! Vault discovery and indexing.
//!
//! One scan per run: enumerate every supported file, classify it, compute
//! its output identity, and mark base-name uniqueness. The resulting
//! registry is the single source of truth for every later step and is
//! never mutated.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::path::Path;
use tracing::instrument;
use vaultport_core::{Error, ExportConfig, Result, Vault, VaultFile, classify_file};
use walkdir::WalkDir;

use crate::settings::read_vault_options;

/// Validate the vault directory and read its settings.
///
/// The path must be an existing directory containing the configured
/// settings folder with an `app.json` inside it; anything else fails
/// before a single vault file is touched.
#[instrument(skip(config), fields(vault = ?config.vault_dir))]
pub fn open_vault(config: &ExportConfig) -> Result<Vault> {
    let vault_dir = config
        .vault_dir
        .canonicalize()
        .map_err(|_| Error::invalid_vault("the provided vault path is not a directory"))?;

    if !vault_dir.is_dir() {
        return Err(Error::invalid_vault(
            "the provided vault path is not a directory",
        ));
    }

    let settings_path = vault_dir.join(&config.config_folder).join("app.json");
    if !settings_path.is_file() {
        return Err(Error::invalid_vault(format!(
            "the provided vault path is not a valid Obsidian vault directory \
             (missing {}/app.json)",
            config.config_folder
        )));
    }

    let options = read_vault_options(&settings_path)?;
    log::debug!("vault options: {options:?}");

    Ok(Vault {
        path: vault_dir,
        options,
    })
}

/// Enumerate and classify every supported file in the vault.
///
/// Ignore patterns are matched against the vault-relative path (leading
/// `/` stripped) at enumeration time, so ignored files never enter the
/// registry. The settings folder and other dot-directories are always
/// skipped.
#[instrument(skip_all, fields(vault = ?vault.path))]
pub fn index_vault(vault: &Vault, ignore: &[String]) -> Result<Vec<VaultFile>> {
    let ignore_set = build_ignore_set(ignore)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&vault.path)
        .into_iter()
        .filter_entry(|e| !is_hidden(e.path()))
    {
        let entry = entry.map_err(|e| Error::other(format!("vault scan failed: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(vault_path) = vault_relative_path(&vault.path, entry.path()) else {
            continue;
        };

        if is_ignored(&ignore_set, &vault_path) {
            log::debug!("ignoring {vault_path}");
            continue;
        }

        let Some(kind) = classify_file(&vault_path) else {
            continue;
        };

        files.push(VaultFile::new(
            entry.path().to_path_buf(),
            vault_path,
            kind,
        ));
    }

    mark_unique_file_names(&mut files);

    log::info!("indexed {} vault files", files.len());
    Ok(files)
}

/// Compute the `/`-separated vault-relative path with a leading slash.
fn vault_relative_path(vault_root: &Path, fs_path: &Path) -> Option<String> {
    let relative = fs_path.strip_prefix(vault_root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    Some(format!("/{}", parts.join("/")))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            Error::config_error(format!("invalid ignore pattern '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| Error::config_error(format!("invalid ignore patterns: {e}")))
}

/// A pattern matches a file if it matches the relative path itself or any
/// of its ancestor directories, so `folder` ignores the whole subtree.
fn is_ignored(set: &GlobSet, vault_path: &str) -> bool {
    if set.is_empty() {
        return false;
    }

    let relative = vault_path.trim_start_matches('/');
    if set.is_match(relative) {
        return true;
    }

    let mut ancestor = relative;
    while let Some(pos) = ancestor.rfind('/') {
        ancestor = &ancestor[..pos];
        if set.is_match(ancestor) {
            return true;
        }
    }

    false
}

/// Single pass over every base file name; files sharing a name with any
/// other file lose their `unique_file_name` flag.
fn mark_unique_file_names(files: &mut [VaultFile]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for file in files.iter() {
        *counts.entry(file.file_name.as_str()).or_default() += 1;
    }

    let duplicated: Vec<String> = counts
        .iter()
        .filter(|&(_, &count)| count > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    for file in files.iter_mut() {
        file.unique_file_name = !duplicated.contains(&file.file_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vaultport_core::{FileKind, LinkFormat, LinkSyntax};

    fn make_vault(dir: &TempDir) {
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join(".obsidian/app.json"), "{}").unwrap();
    }

    fn touch(dir: &TempDir, relative: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"content").unwrap();
    }

    fn open(dir: &TempDir) -> Vault {
        open_vault(&ExportConfig::new(dir.path())).unwrap()
    }

    #[test]
    fn test_open_vault_rejects_missing_directory() {
        let config = ExportConfig::new("/does/not/exist");
        assert!(matches!(open_vault(&config), Err(Error::InvalidVault { .. })));
    }

    #[test]
    fn test_open_vault_rejects_plain_directory() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        assert!(matches!(open_vault(&config), Err(Error::InvalidVault { .. })));
    }

    #[test]
    fn test_open_vault_reads_options() {
        let dir = TempDir::new().unwrap();
        make_vault(&dir);

        let vault = open(&dir);
        assert_eq!(vault.options.link_format, LinkFormat::Shortest);
        assert_eq!(vault.options.link_syntax, LinkSyntax::Wikilink);
    }

    #[test]
    fn test_index_classifies_and_slugs() {
        let dir = TempDir::new().unwrap();
        make_vault(&dir);
        touch(&dir, "root note.md");
        touch(&dir, "folder/An image.png");
        touch(&dir, "folder/A sound.mp3");
        touch(&dir, "ignored.exe");

        let vault = open(&dir);
        let files = index_vault(&vault, &[]).unwrap();
        assert_eq!(files.len(), 3);

        let note = files.iter().find(|f| f.file_name == "root note.md").unwrap();
        assert_eq!(note.kind, FileKind::Content);
        assert_eq!(note.vault_path, "/root note.md");
        assert_eq!(note.slug, "/root-note");

        let image = files.iter().find(|f| f.file_name == "An image.png").unwrap();
        assert_eq!(image.kind, FileKind::Asset);
        assert_eq!(image.slug, "/folder/an-image.png");

        let sound = files.iter().find(|f| f.file_name == "A sound.mp3").unwrap();
        assert_eq!(sound.kind, FileKind::File);
    }

    #[test]
    fn test_index_skips_settings_folder() {
        let dir = TempDir::new().unwrap();
        make_vault(&dir);
        touch(&dir, ".obsidian/workspace.md");
        touch(&dir, "note.md");

        let vault = open(&dir);
        let files = index_vault(&vault, &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].vault_path, "/note.md");
    }

    #[test]
    fn test_index_uniqueness_pass() {
        let dir = TempDir::new().unwrap();
        make_vault(&dir);
        touch(&dir, "duplicate.md");
        touch(&dir, "folder/duplicate.md");
        touch(&dir, "unique.md");

        let vault = open(&dir);
        let files = index_vault(&vault, &[]).unwrap();

        for file in &files {
            match file.file_name.as_str() {
                "duplicate.md" => assert!(!file.unique_file_name),
                "unique.md" => assert!(file.unique_file_name),
                other => panic!("unexpected file {other}"),
            }
        }
    }

    #[test]
    fn test_index_ignore_patterns() {
        let dir = TempDir::new().unwrap();
        make_vault(&dir);
        touch(&dir, "Callouts.md");
        touch(&dir, "Youtube video.md");
        touch(&dir, "folder/nested folder/deep.md");
        touch(&dir, "kept.md");

        let vault = open(&dir);

        let files = index_vault(
            &vault,
            &["Callouts.md".to_string(), "*outub*".to_string()],
        )
        .unwrap();
        let names: Vec<_> = files.iter().map(|f| f.vault_path.as_str()).collect();
        assert!(!names.contains(&"/Callouts.md"));
        assert!(!names.contains(&"/Youtube video.md"));
        assert!(names.contains(&"/kept.md"));

        // A folder pattern ignores the whole subtree.
        let files = index_vault(&vault, &["folder/nested folder".to_string()]).unwrap();
        assert!(files.iter().all(|f| !f.vault_path.contains("/nested folder/")));

        // Globstar variant.
        let files = index_vault(&vault, &["**/nested folder".to_string()]).unwrap();
        assert!(files.iter().all(|f| !f.vault_path.contains("/nested folder/")));
    }

    #[test]
    fn test_index_rejects_bad_pattern() {
        let dir = TempDir::new().unwrap();
        make_vault(&dir);

        let vault = open(&dir);
        assert!(index_vault(&vault, &["[".to_string()]).is_err());
    }
}
