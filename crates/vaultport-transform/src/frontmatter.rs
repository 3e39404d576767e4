//! Note metadata handling.
//!
//! Source frontmatter is parsed leniently: an unparseable block is treated
//! as absent, never as an error, but its bytes are still stripped from the
//! body. Generated pages always get a synthesized metadata block with at
//! least a title.

use serde_yaml::{Mapping, Value};
use vaultport_core::{CopyFrontmatter, Error, Result, paths};

use crate::context::{TransformContext, TransformState};

const KATEX_STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css";

/// Keys the target platform recognizes, copied under the `Known` policy.
const KNOWN_KEYS: &[&str] = &[
    "title",
    "slug",
    "editUrl",
    "head",
    "tableOfContents",
    "template",
    "hero",
    "banner",
    "lastUpdated",
    "prev",
    "next",
    "pagefind",
    "draft",
    "sidebar",
];

/// Keys recomputed by the pipeline, never copied under the `All` policy.
const RECOMPUTED_KEYS: &[&str] = &["cover", "image", "description", "permalink", "tags"];

/// Parsed source metadata, keeping the raw mapping for the copy policies.
#[derive(Debug, Clone)]
pub struct NoteFrontmatter {
    pub raw: Mapping,
}

impl NoteFrontmatter {
    fn get_str(&self, key: &str) -> Option<&str> {
        match self.raw.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    fn get_list(&self, key: &str) -> Vec<String> {
        match self.raw.get(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// The publish flag, tolerating the string forms Obsidian emits.
    pub fn publish(&self) -> Option<bool> {
        match self.raw.get("publish") {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn aliases(&self) -> Vec<String> {
        self.get_list("aliases")
    }

    pub fn tags(&self) -> Vec<String> {
        self.get_list("tags")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    pub fn permalink(&self) -> Option<&str> {
        self.get_str("permalink")
    }

    /// The social-preview image: `cover` wins over `image`.
    pub fn og_image(&self) -> Option<&str> {
        self.get_str("cover").or_else(|| self.get_str("image"))
    }
}

/// Split a leading metadata block off the source text.
///
/// Returns the parsed metadata (or `None` when absent or unparseable) and
/// the byte offset where the body starts. The block is stripped even when
/// it fails to parse.
pub fn extract(source: &str) -> (Option<NoteFrontmatter>, usize) {
    let mut lines = source.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (None, 0);
    };
    if first.trim_end() != "---" {
        return (None, 0);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;

    for line in lines {
        if line.trim_end() == "---" {
            let body_start = offset + line.len();
            let parsed = serde_yaml::from_str::<Mapping>(&source[yaml_start..offset])
                .map(|raw| NoteFrontmatter { raw })
                .ok();
            return (parsed, body_start);
        }
        offset += line.len();
    }

    // No closing delimiter: not a metadata block at all.
    (None, 0)
}

/// Build the output metadata block for a generated page.
pub fn synthesize(
    stem: &str,
    source: Option<&NoteFrontmatter>,
    ctx: &TransformContext<'_>,
    state: &TransformState,
) -> Result<String> {
    let mut map = Mapping::new();
    map.insert(Value::from("title"), Value::from(stem));
    map.insert(Value::from("editUrl"), Value::from(false));

    if let Some(frontmatter) = source {
        match ctx.copy_frontmatter {
            CopyFrontmatter::None => {}
            CopyFrontmatter::Known => {
                for key in KNOWN_KEYS {
                    if let Some(value) = frontmatter.raw.get(*key) {
                        map.insert(Value::from(*key), value.clone());
                    }
                }
            }
            CopyFrontmatter::All => {
                for (key, value) in &frontmatter.raw {
                    let copied = key
                        .as_str()
                        .is_some_and(|k| !RECOMPUTED_KEYS.contains(&k));
                    if copied {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }

    let mut head = match map.remove("head") {
        Some(Value::Sequence(entries)) => entries,
        _ => Vec::new(),
    };

    if state.include_katex_styles {
        head.push(head_tag(
            "link",
            &[("rel", "stylesheet"), ("href", KATEX_STYLESHEET)],
        ));
    }

    if let Some(og_image) = source.and_then(|f| f.og_image())
        && paths::is_absolute_url(og_image)
    {
        if !head_has(&head, "og:image") {
            head.push(head_tag(
                "meta",
                &[("property", "og:image"), ("content", og_image)],
            ));
        }
        if !head_has(&head, "twitter:image") {
            head.push(head_tag(
                "meta",
                &[("name", "twitter:image"), ("content", og_image)],
            ));
        }
    }

    if !head.is_empty() {
        map.insert(Value::from("head"), Value::Sequence(head));
    }

    if let Some(description) = source.and_then(|f| f.description()) {
        map.insert(Value::from("description"), Value::from(description));
    }
    if let Some(permalink) = source.and_then(|f| f.permalink()) {
        map.insert(Value::from("slug"), Value::from(permalink));
    }
    if let Some(frontmatter) = source {
        let tags = frontmatter.tags();
        if !tags.is_empty() {
            map.insert(
                Value::from("tags"),
                Value::Sequence(tags.into_iter().map(Value::from).collect()),
            );
        }
    }

    let yaml = serde_yaml::to_string(&map)
        .map_err(|e| Error::parse_error(format!("frontmatter serialization failed: {e}")))?;

    Ok(format!("---\n{yaml}---"))
}

fn head_tag(tag: &str, attrs: &[(&str, &str)]) -> Value {
    let mut attr_map = Mapping::new();
    for (key, value) in attrs {
        attr_map.insert(Value::from(*key), Value::from(*value));
    }

    let mut entry = Mapping::new();
    entry.insert(Value::from("tag"), Value::from(tag));
    entry.insert(Value::from("attrs"), Value::Mapping(attr_map));
    Value::Mapping(entry)
}

/// Whether an existing head entry already declares this property or name.
fn head_has(head: &[Value], property: &str) -> bool {
    head.iter().any(|entry| {
        let attrs = entry.get("attrs");
        let value_of = |key: &str| attrs.and_then(|a| a.get(key)).and_then(Value::as_str);
        value_of("property") == Some(property) || value_of("name") == Some(property)
    })
}
