//! Shared transform context and per-invocation state.
//!
//! The context is built once per run, after indexing and before fan-out,
//! and is only ever read. Everything mutable (collected aliases, import
//! declarations, side-channel flags, the transclusion trail) lives in
//! [`TransformState`], threaded explicitly through the pipeline so that
//! recursive note embeds stay reentrant.

use vaultport_core::{CopyFrontmatter, MathOptions, Result, Vault, VaultFile};

/// Renders a diagram code block into output markup.
///
/// The actual rendering backend (mermaid to SVG, typically) is an external
/// collaborator; the pipeline only needs markup-in, markup-out.
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<String>;
}

/// Default renderer: emits the diagram source as a fenced HTML block the
/// site can pick up client-side.
#[derive(Debug, Default)]
pub struct HtmlDiagramRenderer;

impl DiagramRenderer for HtmlDiagramRenderer {
    fn render(&self, source: &str) -> Result<String> {
        let escaped = escape_html(source);
        Ok(format!(
            "<pre class=\"vp-diagram mermaid\"><code>{escaped}</code></pre>"
        ))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Read-only data shared by every pipeline invocation of a run.
pub struct TransformContext<'a> {
    /// The full vault registry.
    pub files: &'a [VaultFile],
    pub vault: &'a Vault,
    /// Output directory name, e.g. `notes`.
    pub output: &'a str,
    pub copy_frontmatter: CopyFrontmatter,
    pub math: MathOptions,
    pub diagrams: &'a dyn DiagramRenderer,
}

/// Mutable state for one top-level transform and its nested transclusions.
#[derive(Default)]
pub struct TransformState {
    /// True while transforming a note embedded into another note.
    pub embedded: bool,
    /// Vault paths of notes currently being transcluded, for cycle
    /// detection.
    pub trail: Vec<String>,
    /// Generated `(identifier, path)` asset imports.
    pub asset_imports: Vec<(String, String)>,
    pub include_katex_styles: bool,
    pub include_twitter_component: bool,
    pub include_youtube_component: bool,
}

/// Whether the produced page is plain markdown or needs component support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Markdown,
    Mdx,
}

/// Result of transforming one content file.
#[derive(Debug)]
pub struct TransformResult {
    pub content: String,
    pub aliases: Vec<String>,
    /// True when the note's metadata marks it unpublished.
    pub skip: bool,
    pub kind: OutputKind,
}

impl TransformResult {
    pub(crate) fn skipped() -> Self {
        Self {
            content: String::new(),
            aliases: Vec::new(),
            skip: true,
            kind: OutputKind::Markdown,
        }
    }
}
