//! Inline dialect replacements.
//!
//! One atomic scan over the note body rewrites highlights, comments,
//! wikilinks, embeds, and tags. Candidates are consumed in textual order:
//! the earliest match wins and the span it covers is never revisited, so a
//! tag-shaped token inside a comment disappears with the comment. Spans
//! inside code blocks, inline code, or HTML are never candidates.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use vaultport_core::{LinkSyntax, VaultFile, paths};

use crate::context::TransformContext;
use crate::resolver::resolve_reference;
use crate::scan::ExcludedRanges;

/// Highlight: ==text==
static HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==([^\n=][^\n]*?)==").unwrap());

/// Comment: %%text%%, possibly spanning lines. Never rendered.
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)%%(.+?)%%").unwrap());

/// Wikilink or embed: [[target]], [[target|text]], ![[target]]
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").unwrap());

/// Tag: #word, preceded by start-of-text or whitespace
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)#([\w/-]+)").unwrap());

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

#[inline]
fn has_highlight(text: &str) -> bool {
    text.contains("==")
}

#[inline]
fn has_comment(text: &str) -> bool {
    text.contains("%%")
}

#[inline]
fn has_wikilink(text: &str) -> bool {
    text.contains("[[")
}

#[inline]
fn has_tag(text: &str) -> bool {
    text.contains('#')
}

enum Rule {
    Highlight,
    Comment,
    Wikilink,
    Tag,
}

/// Rewrite every dialect span in `body` in one left-to-right pass.
pub fn apply_replacements(
    body: &str,
    excluded: &ExcludedRanges,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
) -> String {
    let rules: [(Rule, &Regex, bool); 4] = [
        (Rule::Highlight, &HIGHLIGHT, has_highlight(body)),
        (Rule::Comment, &COMMENT, has_comment(body)),
        (Rule::Wikilink, &WIKILINK, has_wikilink(body)),
        (Rule::Tag, &TAG, has_tag(body)),
    ];

    if rules.iter().all(|(_, _, present)| !present) {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut pos = 0;

    while pos < body.len() {
        let mut earliest: Option<(usize, usize, String)> = None;

        for (rule, regex, present) in &rules {
            if !present {
                continue;
            }
            let Some(caps) = find_candidate(regex, body, pos, excluded) else {
                continue;
            };
            let Some(m) = caps.get(0) else {
                continue;
            };

            if earliest.as_ref().is_none_or(|(start, _, _)| m.start() < *start) {
                let replacement = apply_rule(rule, &caps, source, ctx);
                earliest = Some((m.start(), m.end(), replacement));
            }
        }

        match earliest {
            Some((start, end, replacement)) => {
                out.push_str(&body[pos..start]);
                out.push_str(&replacement);
                pos = end;
            }
            None => {
                out.push_str(&body[pos..]);
                break;
            }
        }
    }

    out
}

/// First match of `regex` at or after `pos` whose start is not excluded.
pub(crate) fn find_candidate<'t>(
    regex: &Regex,
    text: &'t str,
    pos: usize,
    excluded: &ExcludedRanges,
) -> Option<Captures<'t>> {
    let mut search = pos;

    while search <= text.len() {
        let caps = regex.captures_at(text, search)?;
        let start = caps.get(0)?.start();

        if excluded.contains(start) {
            search = start + 1;
            continue;
        }

        return Some(caps);
    }

    None
}

fn apply_rule(
    rule: &Rule,
    caps: &Captures<'_>,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
) -> String {
    match rule {
        Rule::Highlight => {
            let text = caps.get(1).map_or("", |m| m.as_str());
            format!("<mark class=\"vp-highlight\">{text}</mark>")
        }
        Rule::Comment => String::new(),
        Rule::Wikilink => {
            let is_embed = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let target = caps.get(2).map_or("", |m| m.as_str());
            let display = caps.get(3).map(|m| m.as_str());

            replace_wikilink(is_embed, target, display, source, ctx)
        }
        Rule::Tag => {
            let tag = caps.get(1).map_or("", |m| m.as_str());

            // Tags made of digits only are not valid tags.
            if NUMERIC.is_match(tag) {
                caps.get(0).map_or(String::new(), |m| m.as_str().to_string())
            } else {
                format!(" <span class=\"vp-tag\">#{tag}</span>")
            }
        }
    }
}

fn replace_wikilink(
    is_embed: bool,
    target: &str,
    display: Option<&str>,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
) -> String {
    let resolved = resolve_reference(target, display, source, ctx);

    if is_embed {
        // Note embeds keep their raw target so the embed pass can locate
        // the transcluded file; everything else is resolved here.
        let url = if is_markdown_target(target, ctx) {
            target.to_string()
        } else {
            resolved.url
        };
        return format!("![{}]({url})", resolved.text);
    }

    format!("[{}]({})", resolved.text, resolved.url)
}

/// Whether an embed target is a markdown note rather than a media file.
pub fn is_markdown_target(target: &str, ctx: &TransformContext<'_>) -> bool {
    (ctx.vault.options.link_syntax == LinkSyntax::Markdown && target.ends_with(".md"))
        || paths::extension(target).is_empty()
}
