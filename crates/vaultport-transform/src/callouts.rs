//! Callout conversion.
//!
//! A quoted block whose first line carries a `[!type]` tag becomes a
//! severity-typed aside block. The type dictionary is fixed and
//! case-insensitive; anything unrecognized lands in the mildest bucket.
//! Nested callouts convert recursively.

use regex::Regex;
use std::sync::LazyLock;

use crate::scan::ExcludedRanges;

/// Callout header: > [!type] optional title, with an optional fold marker.
static CALLOUT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*>\s*\[!(\w+)\][+-]? ?(.*)$").unwrap());

/// Any quoted line.
static QUOTE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*>").unwrap());

/// One level of quote prefix.
static QUOTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*> ?").unwrap());

const ASIDE_DELIMITER: &str = ":::";
const MAX_NESTING: usize = 5;

/// Map a callout type onto one of the four output severities.
fn severity(callout_type: &str) -> &'static str {
    match callout_type.to_lowercase().as_str() {
        "abstract" | "summary" | "tldr" | "tip" | "hint" | "important" | "example" => "tip",
        "question" | "help" | "faq" | "warning" | "caution" | "attention" => "caution",
        "failure" | "fail" | "missing" | "danger" | "error" | "bug" => "danger",
        _ => "note",
    }
}

/// Convert every callout block in `body` into an aside block.
pub fn apply_callouts(body: &str, excluded: &ExcludedRanges) -> String {
    if !body.contains("[!") {
        return body.to_string();
    }

    let converted = convert(body, Some(excluded), 0);
    if body.ends_with('\n') && !converted.ends_with('\n') {
        converted + "\n"
    } else {
        converted
    }
}

fn convert(text: &str, excluded: Option<&ExcludedRanges>, depth: usize) -> String {
    if depth > MAX_NESTING {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut offset = 0;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let line_offset = offset;
        offset += line.len() + 1;

        let in_excluded = excluded.is_some_and(|e| e.contains(line_offset));
        let Some(caps) = (!in_excluded)
            .then(|| CALLOUT_START.captures(line))
            .flatten()
        else {
            out.push(line.to_string());
            i += 1;
            continue;
        };

        // Collect the rest of the quoted block.
        let mut j = i + 1;
        while j < lines.len() && QUOTE_LINE.is_match(lines[j]) {
            offset += lines[j].len() + 1;
            j += 1;
        }

        let callout_type = caps.get(1).map_or("", |m| m.as_str());
        let title = caps.get(2).map_or("", |m| m.as_str()).trim();

        let header = if title.is_empty() {
            format!("{ASIDE_DELIMITER}{}", severity(callout_type))
        } else {
            format!("{ASIDE_DELIMITER}{}[{title}]", severity(callout_type))
        };
        out.push(header);

        if j > i + 1 {
            let inner = lines[i + 1..j]
                .iter()
                .map(|l| QUOTE_PREFIX.replace(l, "").into_owned())
                .collect::<Vec<_>>()
                .join("\n");
            out.push(convert(&inner, None, depth + 1));
        }

        out.push(ASIDE_DELIMITER.to_string());
        i = j;
    }

    out.join("\n")
}
