//! Standard markdown link rewriting.
//!
//! Vaults configured for markdown link syntax write `[text](url)` links
//! with percent-encoded targets. This pass re-runs resolution on them so
//! both syntaxes converge on identical output URLs. Wikilink vaults skip
//! it entirely; their links were already resolved by the replacement pass.

use regex::Regex;
use std::sync::LazyLock;
use vaultport_core::{LinkFormat, VaultFile, paths};

use crate::context::TransformContext;
use crate::replacements::find_candidate;
use crate::resolver::{file_url, output_path};
use crate::scan::ExcludedRanges;

/// Markdown link or image: the optional leading `!` keeps images out.
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\[\]]*)\]\(([^()]+)\)").unwrap());

/// Rewrite markdown-syntax links against the registry.
pub fn apply_links(
    body: &str,
    excluded: &ExcludedRanges,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
) -> String {
    if !body.contains("](") {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut pos = 0;

    while pos < body.len() {
        let Some(caps) = find_candidate(&LINK, body, pos, excluded) else {
            out.push_str(&body[pos..]);
            break;
        };
        let Some(full) = caps.get(0) else {
            out.push_str(&body[pos..]);
            break;
        };

        let is_image = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let text = caps.get(2).map_or("", |m| m.as_str());
        let url = caps.get(3).map_or("", |m| m.as_str());

        out.push_str(&body[pos..full.start()]);
        match (!is_image).then(|| rewrite_url(url, source, ctx)).flatten() {
            Some(rewritten) => out.push_str(&format!("[{text}]({rewritten})")),
            None => out.push_str(full.as_str()),
        }
        pos = full.end();
    }

    out
}

fn rewrite_url(url: &str, source: &VaultFile, ctx: &TransformContext<'_>) -> Option<String> {
    if paths::is_absolute_url(url) {
        return None;
    }

    if paths::is_anchor(url) {
        return Some(paths::slugify_anchor(url));
    }

    let (path_part, anchor) = paths::split_anchor(url);
    // Markdown targets are percent-encoded; decode the anchor before it
    // is slugified.
    let anchor = anchor.map(paths::percent_decode);
    let anchor = anchor.as_deref();
    let name = paths::base_name(&paths::percent_decode(path_part)).to_string();
    let matching = ctx.files.iter().find(|f| f.is_equal_file_name(&name))?;

    let rewritten = match ctx.vault.options.link_format {
        LinkFormat::Relative => file_url(
            ctx.output,
            &paths::join_paths(paths::dir_name(&source.vault_path), path_part),
            anchor,
        ),
        LinkFormat::Absolute | LinkFormat::Shortest => {
            file_url(ctx.output, &output_path(matching, path_part), anchor)
        }
    };

    Some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HtmlDiagramRenderer;
    use crate::scan::scan_markdown;
    use std::path::PathBuf;
    use vaultport_core::{
        CopyFrontmatter, FileKind, LinkSyntax, MathOptions, Vault, VaultOptions,
    };

    const DIAGRAMS: HtmlDiagramRenderer = HtmlDiagramRenderer;

    fn apply(body: &str, format: LinkFormat) -> String {
        let files = vec![
            VaultFile::new(
                PathBuf::from("/vault/root.md"),
                "/root.md".to_string(),
                FileKind::Content,
            ),
            VaultFile::new(
                PathBuf::from("/vault/folder/other note.md"),
                "/folder/other note.md".to_string(),
                FileKind::Content,
            ),
        ];
        let vault = Vault {
            path: PathBuf::from("/vault"),
            options: VaultOptions {
                link_format: format,
                link_syntax: LinkSyntax::Markdown,
            },
        };
        let ctx = TransformContext {
            files: &files,
            vault: &vault,
            output: "notes",
            copy_frontmatter: CopyFrontmatter::None,
            math: MathOptions::default(),
            diagrams: &DIAGRAMS,
        };
        let scan = scan_markdown(body, MathOptions::default());
        apply_links(body, &scan.excluded, &files[0].clone(), &ctx)
    }

    #[test]
    fn test_rewrites_matching_link() {
        let out = apply("see [the note](folder/other%20note.md)", LinkFormat::Shortest);
        assert_eq!(out, "see [the note](/notes/folder/other-note)");
    }

    #[test]
    fn test_relative_joins_source_directory() {
        let out = apply("[x](folder/other%20note.md)", LinkFormat::Relative);
        assert_eq!(out, "[x](/notes/folder/other-note)");
    }

    #[test]
    fn test_anchor_suffix_kept() {
        let out = apply("[x](other%20note.md#Some%20Heading)", LinkFormat::Shortest);
        assert_eq!(out, "[x](/notes/folder/other-note#some-heading)");
    }

    #[test]
    fn test_unknown_target_untouched() {
        let body = "[x](missing.md)";
        assert_eq!(apply(body, LinkFormat::Shortest), body);
    }

    #[test]
    fn test_external_and_images_untouched() {
        let body = "[x](https://example.com) and ![img](folder/pic.png)";
        assert_eq!(apply(body, LinkFormat::Shortest), body);
    }

    #[test]
    fn test_same_page_anchor() {
        assert_eq!(apply("[x](#Some Heading)", LinkFormat::Shortest), "[x](#some-heading)");
    }
}
