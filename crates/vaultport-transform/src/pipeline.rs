//! The dialect transform pipeline.
//!
//! A fixed ordered sequence of passes turns one Obsidian note into one
//! output page: metadata extraction and the publish check, diagram
//! rendering, inline replacements, standard link rewriting, embed
//! materialization, callout conversion, metadata synthesis, and import
//! injection. Each pass re-derives its excluded ranges from the text the
//! previous pass produced.

use tracing::instrument;
use vaultport_core::{LinkSyntax, Result, VaultFile};

use crate::callouts::apply_callouts;
use crate::context::{OutputKind, TransformContext, TransformResult, TransformState};
use crate::embeds::apply_embeds;
use crate::frontmatter;
use crate::links::apply_links;
use crate::replacements::apply_replacements;
use crate::scan::scan_markdown;

/// Transform one note's source text into output markup.
///
/// `state` carries the per-invocation side channel; callers start from
/// `TransformState::default()` and the pipeline reuses it across nested
/// note embeds.
#[instrument(skip_all, fields(file = %source.vault_path))]
pub fn transform_note(
    source: &VaultFile,
    text: &str,
    ctx: &TransformContext<'_>,
    state: &mut TransformState,
) -> Result<TransformResult> {
    let (metadata, body_start) = frontmatter::extract(text);

    // An unpublished note is suppressed before any other pass runs, but
    // never when transcluded into a published host.
    if !state.embedded
        && metadata.as_ref().and_then(|m| m.publish()) == Some(false)
    {
        log::debug!("skipping unpublished note {}", source.vault_path);
        return Ok(TransformResult::skipped());
    }

    let body = text[body_start..].trim_start_matches('\n');

    // Diagram blocks are spliced first so every later pass sees the
    // rendered markup as plain excluded HTML.
    let scan = scan_markdown(body, ctx.math);
    if scan.has_math {
        state.include_katex_styles = true;
    }
    let mut body = body.to_string();
    for (range, diagram) in scan.diagrams.iter().rev() {
        let rendered = ctx.diagrams.render(diagram)?;
        body.replace_range(range.clone(), &rendered);
    }

    let scan = scan_markdown(&body, ctx.math);
    let body = apply_replacements(&body, &scan.excluded, source, ctx);

    let body = if ctx.vault.options.link_syntax == LinkSyntax::Markdown {
        let scan = scan_markdown(&body, ctx.math);
        apply_links(&body, &scan.excluded, source, ctx)
    } else {
        body
    };

    let scan = scan_markdown(&body, ctx.math);
    let body = apply_embeds(&body, &scan.excluded, source, ctx, state)?;

    let scan = scan_markdown(&body, ctx.math);
    let body = apply_callouts(&body, &scan.excluded);

    // Transcluded notes contribute their body only; the host owns the
    // metadata block and the import preamble.
    if state.embedded {
        return Ok(TransformResult {
            content: body,
            aliases: Vec::new(),
            skip: false,
            kind: OutputKind::Markdown,
        });
    }

    let aliases = metadata.as_ref().map(|m| m.aliases()).unwrap_or_default();
    let block = frontmatter::synthesize(&source.stem, metadata.as_ref(), ctx, state)?;

    let imports = collect_imports(state);
    let kind = if imports.is_empty() {
        OutputKind::Markdown
    } else {
        OutputKind::Mdx
    };

    let mut content = block;
    content.push_str("\n\n");
    if !imports.is_empty() {
        content.push_str(&imports.join("\n\n"));
        content.push_str("\n\n");
    }
    content.push_str(body.trim_end());
    content.push('\n');

    Ok(TransformResult {
        content,
        aliases,
        skip: false,
        kind,
    })
}

fn collect_imports(state: &TransformState) -> Vec<String> {
    let mut imports = Vec::new();

    if state.include_twitter_component {
        imports.push("import Twitter from 'vaultport/components/Twitter.astro'".to_string());
    }
    if state.include_youtube_component {
        imports.push("import Youtube from 'vaultport/components/Youtube.astro'".to_string());
    }
    if !state.asset_imports.is_empty() {
        imports.push("import { Image } from 'astro:assets'".to_string());
        for (id, path) in &state.asset_imports {
            imports.push(format!("import {id} from '{path}'"));
        }
    }

    imports
}
