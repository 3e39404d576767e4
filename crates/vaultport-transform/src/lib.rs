//! # vaultport-transform
//!
//! The Obsidian-to-site markup transform. Given one note's source text
//! plus the vault registry, [`transform_note`] produces the content of
//! one output page: Obsidian dialect constructs (wikilinks, embeds,
//! callouts, highlights, comments, tags, math, diagrams) rewritten into
//! markup the site generator understands.
//!
//! The transform is a fixed pipeline of text-to-text passes. Each pass
//! first scans the current text with a markdown parser to find the
//! regions where dialect syntax is inert (code blocks, inline code, raw
//! HTML, math), then rewrites only outside of those regions.
//!
//! ## Core Modules
//!
//! - [`pipeline`] - Pass ordering and orchestration ([`transform_note`])
//! - [`scan`] - Excluded-range computation via `pulldown-cmark`
//! - [`resolver`] - Reference-to-URL resolution per the vault's link policy
//! - [`replacements`] - Inline dialect replacements (wikilinks, tags, ...)
//! - [`links`] - Standard markdown link rewriting
//! - [`embeds`] - Embed materialization, including note transclusion
//! - [`callouts`] - Callout-to-aside conversion
//! - [`frontmatter`] - Note metadata extraction and synthesis

pub mod callouts;
pub mod context;
pub mod embeds;
pub mod frontmatter;
pub mod links;
pub mod pipeline;
pub mod replacements;
pub mod resolver;
pub mod scan;

pub use context::{
    DiagramRenderer, HtmlDiagramRenderer, OutputKind, TransformContext, TransformResult,
    TransformState,
};
pub use pipeline::transform_note;
pub use resolver::{ResolvedReference, resolve_reference};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::context::{
        DiagramRenderer, HtmlDiagramRenderer, OutputKind, TransformContext, TransformResult,
        TransformState,
    };
    pub use crate::pipeline::transform_note;
}
