//! Reference resolution.
//!
//! Given a raw reference string as it appeared in source text, decide the
//! output URL of its target according to the vault's addressing policy.
//! Resolution is stateless over the registry and never fails: a reference
//! to an unindexed target degrades to a best-effort slugified URL.

use vaultport_core::{LinkFormat, VaultFile, paths};

use crate::context::TransformContext;

/// The output identity of one link or embed occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub url: String,
    pub text: String,
}

/// Resolve a wikilink target against the registry.
///
/// `display` is the optional `|text` part of the wikilink; when absent,
/// the visible text falls back to the raw target (with anchor syntax
/// stripped for same-page references).
pub fn resolve_reference(
    raw: &str,
    display: Option<&str>,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
) -> ResolvedReference {
    if paths::is_absolute_url(raw) {
        return ResolvedReference {
            url: raw.to_string(),
            text: display.unwrap_or(raw).to_string(),
        };
    }

    if paths::is_anchor(raw) {
        let stripped = if paths::is_block_anchor(raw) { 2 } else { 1 };
        return ResolvedReference {
            url: paths::slugify_anchor(raw),
            text: display.unwrap_or(&raw[stripped.min(raw.len())..]).to_string(),
        };
    }

    let (url_path, anchor) = paths::split_anchor(raw);
    let url = match ctx.vault.options.link_format {
        LinkFormat::Relative => {
            // Join the source file's directory with the raw path; no
            // registry lookup, so unindexed targets still resolve.
            let joined = paths::join_paths(paths::dir_name(&source.vault_path), url_path);
            file_url(ctx.output, &joined, anchor)
        }
        LinkFormat::Absolute => file_url(ctx.output, url_path, anchor),
        LinkFormat::Shortest => {
            let matching = ctx
                .files
                .iter()
                .find(|f| f.is_equal_stem(url_path) || f.is_equal_file_name(url_path));

            match matching {
                Some(file) => file_url(ctx.output, &output_path(file, url_path), anchor),
                None => file_url(ctx.output, url_path, anchor),
            }
        }
    };

    ResolvedReference {
        url,
        text: display.unwrap_or(raw).to_string(),
    }
}

/// Output path for a matched registry file.
///
/// A unique name may be addressed by its precomputed slug; an ambiguous
/// one is resolved by the full path it was referenced under, falling back
/// to a dead link when the path does not exist.
pub fn output_path(file: &VaultFile, reference: &str) -> String {
    if file.unique_file_name {
        file.slug.clone()
    } else {
        paths::slugify_path(reference)
    }
}

/// Build an output URL under the content root, anchor included.
pub fn file_url(output: &str, path: &str, anchor: Option<&str>) -> String {
    let slug = paths::slugify_path(path);
    let url = paths::join_paths(&format!("/{output}"), &slug);
    format!("{url}{}", paths::slugify_anchor(anchor.unwrap_or_default()))
}
