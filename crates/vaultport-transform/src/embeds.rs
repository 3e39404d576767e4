//! Embed materialization.
//!
//! Every image node left over after the inline replacements is classified
//! by its target and replaced with kind-specific output: sized images,
//! player markup for audio and video, a viewer for documents, provider
//! components for recognized external services, and recursive inline
//! transclusion for note embeds.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;
use vaultport_core::{LinkFormat, LinkSyntax, MediaKind, Result, VaultFile, media_kind, paths};

use crate::context::{TransformContext, TransformState};
use crate::pipeline::transform_note;
use crate::replacements::{find_candidate, is_markdown_target};
use crate::resolver::output_path;
use crate::scan::ExcludedRanges;

/// Markdown image: ![alt](url)
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\[\]]*)\]\(([^()]+)\)").unwrap());

/// Image caption size suffix: `Alt|W` or `Alt|WxH`
static IMAGE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<alt>.*)\|)?(?:(?P<width_only>\d+)|(?P<width>\d+)x(?P<height>\d+))$")
        .unwrap()
});

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/)|youtu\.be/)([\w-]{6,12})")
        .unwrap()
});

static TWITTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[\w.]+\.)?(?:twitter|x)\.com/\w+/status(?:es)?/\d+").unwrap()
});

/// How many note embeds may nest before resolution gives up.
const MAX_EMBED_DEPTH: usize = 8;

/// Replace every embed and image occurrence in `body`.
pub fn apply_embeds(
    body: &str,
    excluded: &ExcludedRanges,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
    state: &mut TransformState,
) -> Result<String> {
    if !body.contains("![") {
        return Ok(body.to_string());
    }

    let mut out = String::with_capacity(body.len());
    let mut pos = 0;

    while pos < body.len() {
        let Some(caps) = find_candidate(&IMAGE, body, pos, excluded) else {
            out.push_str(&body[pos..]);
            break;
        };
        let Some(full) = caps.get(0) else {
            out.push_str(&body[pos..]);
            break;
        };

        let alt = caps.get(1).map_or("", |m| m.as_str());
        let url = caps.get(2).map_or("", |m| m.as_str());

        out.push_str(&body[pos..full.start()]);
        match replace_image(alt, url, source, ctx, state)? {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(full.as_str()),
        }
        pos = full.end();
    }

    Ok(out)
}

fn replace_image(
    alt: &str,
    url: &str,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
    state: &mut TransformState,
) -> Result<Option<String>> {
    if paths::is_absolute_url(url) {
        if let Some(external) = external_embed(url, state) {
            return Ok(Some(external));
        }

        if media_kind(url) == Some(MediaKind::Image) {
            return Ok(sized_image(alt, url, None));
        }

        return Ok(None);
    }

    if is_markdown_target(url, ctx) {
        return note_embed(url, source, ctx, state).map(Some);
    }

    let resolved_prefix = format!("/{}/", ctx.output);
    let file_url = if url.starts_with(&resolved_prefix) {
        url.to_string()
    } else {
        match ctx.vault.options.link_format {
            LinkFormat::Relative => crate::resolver::file_url(
                ctx.output,
                &paths::join_paths(paths::dir_name(&source.vault_path), url),
                None,
            ),
            LinkFormat::Absolute => crate::resolver::file_url(ctx.output, url, None),
            LinkFormat::Shortest => {
                let name = paths::base_name(&paths::percent_decode(url)).to_string();
                match ctx.files.iter().find(|f| f.is_equal_file_name(&name)) {
                    Some(file) => {
                        crate::resolver::file_url(ctx.output, &output_path(file, url), None)
                    }
                    None => url.to_string(),
                }
            }
        }
    };

    match media_kind(&file_url) {
        Some(MediaKind::Audio) => Ok(Some(format!(
            "<audio class=\"vp-embed-audio\" controls src=\"{file_url}\"></audio>"
        ))),
        Some(MediaKind::Video) => Ok(Some(format!(
            "<video class=\"vp-embed-video\" controls src=\"{file_url}\"></video>"
        ))),
        Some(MediaKind::Document) => Ok(Some(format!(
            "<iframe class=\"vp-embed-pdf\" src=\"{file_url}\"></iframe>"
        ))),
        _ => {
            if is_asset(&file_url) {
                let asset_path = asset_path(source, &file_url);
                match sized_image(alt, &asset_path, Some(state)) {
                    Some(sized) => Ok(Some(sized)),
                    None => Ok(Some(format!("![{alt}]({asset_path})"))),
                }
            } else {
                Ok(Some(format!("![{alt}]({file_url})")))
            }
        }
    }
}

/// BMP images cannot go through the site image pipeline.
fn is_asset(path: &str) -> bool {
    media_kind(path) == Some(MediaKind::Image) && !paths::extension(path).eq_ignore_ascii_case("bmp")
}

/// Relative import path from the generated page to the copied asset.
///
/// Pages live three directories below the site root plus however deep the
/// note sits in the vault.
fn asset_path(source: &VaultFile, file_url: &str) -> String {
    let depth = source.vault_path.matches('/').count().saturating_sub(1);
    format!("{}assets{file_url}", "../".repeat(depth + 3))
}

fn external_embed(url: &str, state: &mut TransformState) -> Option<String> {
    if TWITTER.is_match(url) {
        state.include_twitter_component = true;
        return Some(format!("<Twitter id=\"{url}\" />"));
    }

    if let Some(caps) = YOUTUBE.captures(url) {
        let id = caps.get(1)?.as_str();
        state.include_youtube_component = true;
        return Some(format!("<Youtube id=\"{id}\" />"));
    }

    None
}

/// Render an image whose caption carries a `W` or `WxH` size suffix.
///
/// External images become a plain `<img>`; vault assets become an
/// `<Image>` component backed by a generated import.
fn sized_image(alt: &str, src: &str, asset_state: Option<&mut TransformState>) -> Option<String> {
    let caps = IMAGE_SIZE.captures(alt)?;

    let alt_text = caps.name("alt").map_or("", |m| m.as_str());
    let width = caps
        .name("width_only")
        .or_else(|| caps.name("width"))
        .map(|m| m.as_str())?;
    let height = caps.name("height").map(|m| m.as_str());

    let height_attr = height.unwrap_or("auto");
    let style = match height {
        Some(h) => format!(" style=\"height: {h}px !important;\""),
        None => String::new(),
    };

    match asset_state {
        Some(state) => {
            let id = generate_import_id();
            state.asset_imports.push((id.clone(), src.to_string()));
            Some(format!(
                "<Image src={{{id}}} alt=\"{alt_text}\" width=\"{width}\" height=\"{height_attr}\"{style} />"
            ))
        }
        None => Some(format!(
            "<img src=\"{src}\" alt=\"{alt_text}\" width=\"{width}\" height=\"{height_attr}\"{style} />"
        )),
    }
}

/// Six lowercase letters, unique enough for one generated page.
fn generate_import_id() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(6)
        .map(|b| char::from(b'a' + (b % 26)))
        .collect()
}

/// Transclude a markdown note, wrapped in a labeled blockquote.
///
/// A target missing from the registry, a cycle, or an embed nested too
/// deeply all collapse to an empty embed instead of failing the note.
fn note_embed(
    url: &str,
    source: &VaultFile,
    ctx: &TransformContext<'_>,
    state: &mut TransformState,
) -> Result<String> {
    let file_ext = match ctx.vault.options.link_syntax {
        LinkSyntax::Wikilink => ".md",
        LinkSyntax::Markdown => "",
    };
    let file_path = paths::percent_decode(&match ctx.vault.options.link_format {
        LinkFormat::Relative => paths::join_paths(paths::dir_name(&source.vault_path), url),
        _ => url.to_string(),
    });
    let full_path = paths::join_paths("/", &format!("{file_path}{file_ext}"));

    let matching = ctx.files.iter().find(|f| {
        f.vault_path == full_path || f.is_equal_stem(&file_path) || f.is_equal_file_name(&file_path)
    });
    let Some(target) = matching else {
        return Ok(String::new());
    };

    if target.vault_path == source.vault_path || state.trail.contains(&target.vault_path) {
        log::warn!(
            "embed cycle through {} detected in {}, dropping the embed",
            target.vault_path,
            source.vault_path
        );
        return Ok(String::new());
    }
    if state.trail.len() >= MAX_EMBED_DEPTH {
        log::warn!("embeds nested deeper than {MAX_EMBED_DEPTH} in {}", source.vault_path);
        return Ok(String::new());
    }

    let content = std::fs::read_to_string(&target.fs_path)?;

    // The trail holds every note on the current transclusion path,
    // including the top-level host.
    let pushed_source = if state.trail.contains(&source.vault_path) {
        false
    } else {
        state.trail.push(source.vault_path.clone());
        true
    };
    let was_embedded = state.embedded;
    state.embedded = true;
    state.trail.push(target.vault_path.clone());
    let result = transform_note(target, &content, ctx, state);
    state.trail.pop();
    state.embedded = was_embedded;
    if pushed_source {
        state.trail.pop();
    }
    let result = result?;

    let mut lines = vec![format!("> <strong>{}</strong>", target.stem), ">".to_string()];
    for line in result.content.trim_end().lines() {
        if line.trim().is_empty() {
            lines.push(">".to_string());
        } else {
            lines.push(format!("> {line}"));
        }
    }

    Ok(lines.join("\n"))
}
