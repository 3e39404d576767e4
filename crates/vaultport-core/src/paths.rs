//! Pure path and slug helpers shared by the indexer, resolver, and pipeline.
//!
//! All functions operate on `/`-separated vault-relative paths, never on
//! OS-native paths. Slug generation is deterministic: the same input always
//! produces the same output, and two distinct vault-relative paths never
//! collapse into the same slug because every segment is slugified
//! independently.

/// Generate a URL-safe slug from a single path segment or anchor.
///
/// Lowercases, keeps alphanumerics, collapses whitespace and dashes into
/// single dashes, and drops everything else.
pub fn slugify(text: &str) -> String {
    slug_chars(&text.to_lowercase())
}

/// Slug variant that keeps the original casing.
///
/// Used for the final segment of content paths: Obsidian treats note names
/// as case-sensitive, and lowering them here would detach pages from block
/// anchors pointing at them.
pub fn slugify_preserving_case(text: &str) -> String {
    slug_chars(text)
}

fn slug_chars(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Slugify a vault path, one segment at a time.
///
/// The final segment drops a `.md` extension entirely; any other extension
/// is preserved (slugged stem plus the original extension) so asset
/// references keep enough information to be classified and served.
pub fn slugify_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let segment = percent_decode(segment);
            if index < last {
                return slugify(&segment);
            }

            match extension(&segment) {
                "" | "md" => slugify_preserving_case(strip_extension(&segment)),
                ext => format!("{}.{}", slugify(strip_extension(&segment)), ext),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Slugify an anchor fragment, returning it with a leading `#`.
///
/// A caret-prefixed identifier is an Obsidian block reference and is
/// rewritten to a `block-` prefix before slugification. An empty anchor
/// yields an empty string so the result can be appended unconditionally.
pub fn slugify_anchor(anchor: &str) -> String {
    let anchor = anchor.strip_prefix('#').unwrap_or(anchor);

    if anchor.is_empty() {
        String::new()
    } else if let Some(block) = anchor.strip_prefix('^') {
        format!("#block-{}", slugify(block))
    } else {
        format!("#{}", slugify(anchor))
    }
}

/// Whether a reference is an anchor into the current document.
pub fn is_anchor(reference: &str) -> bool {
    reference.starts_with('#')
}

/// Whether a reference is a block anchor (`#^id` or `^id`).
pub fn is_block_anchor(reference: &str) -> bool {
    reference.starts_with("#^") || reference.starts_with('^')
}

/// Split a reference into its path component and optional anchor.
///
/// The anchor keeps any caret prefix: `Note#^id` yields `("Note",
/// Some("^id"))`.
pub fn split_anchor(reference: &str) -> (&str, Option<&str>) {
    match reference.find('#') {
        Some(pos) => (&reference[..pos], Some(&reference[pos + 1..])),
        None => (reference, None),
    }
}

/// Return the final path segment without its extension.
pub fn strip_extension(path: &str) -> &str {
    let name = base_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Return the extension of the final path segment, without the dot and
/// lowercased checks left to the caller. Empty when there is none.
pub fn extension(path: &str) -> &str {
    let name = base_name(path);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(pos) => &name[pos + 1..],
    }
}

/// Return the final segment of a `/`-separated path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Return the directory part of a `/`-separated path, without a trailing
/// separator. The root directory is `""`.
pub fn dir_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "",
        Some(pos) => &path[..pos],
    }
}

/// Whether a reference is an absolute URL (scheme-qualified).
pub fn is_absolute_url(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("mailto:")
        || reference.contains("://")
}

/// Decode percent-encoded sequences, leaving malformed ones untouched.
///
/// Obsidian percent-encodes spaces in markdown-syntax links; wikilink
/// targets are never encoded.
pub fn percent_decode(input: &str) -> String {
    if !input.contains('%') {
        return input.to_string();
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push(hi * 16 + lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Join two `/`-separated path components, normalizing `.` and `..`
/// segments the way POSIX `path.join` does, without touching the
/// filesystem.
pub fn join_paths(base: &str, tail: &str) -> String {
    let absolute = base.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in base.split('/').chain(tail.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("My Note"), "my-note");
        assert_eq!(slugify("BIG heading?! with Special @chars"), "big-heading-with-special-chars");
        assert_eq!(slugify("Multiple   Spaces   Here"), "multiple-spaces-here");
    }

    #[test]
    fn test_slugify_deterministic() {
        let input = "folder name/Some Note";
        assert_eq!(slugify_path(input), slugify_path(input));
    }

    #[test]
    fn test_slugify_path_segments_independent() {
        assert_eq!(slugify_path("/folder name/some note.md"), "/folder-name/some-note");
        assert_eq!(slugify_path("folder/nested folder/file.md"), "folder/nested-folder/file");
    }

    #[test]
    fn test_slugify_path_keeps_note_casing() {
        // Directory segments are lowered, the note name is not.
        assert_eq!(slugify_path("/Folder Name/Some Note.md"), "/folder-name/Some-Note");
    }

    #[test]
    fn test_slugify_path_preserves_asset_extension() {
        assert_eq!(slugify_path("/An image.png"), "/an-image.png");
        assert_eq!(slugify_path("folder/A sound.mp3"), "folder/a-sound.mp3");
    }

    #[test]
    fn test_slugify_path_injective_for_distinct_paths() {
        let a = slugify_path("/folder/note.md");
        let b = slugify_path("/folder/nested/note.md");
        assert_ne!(a, b);
    }

    #[test]
    fn test_slugify_anchor_heading() {
        assert_eq!(slugify_anchor("Random heading"), "#random-heading");
        assert_eq!(slugify_anchor("#Random heading"), "#random-heading");
        assert_eq!(slugify_anchor(""), "");
    }

    #[test]
    fn test_slugify_anchor_block() {
        assert_eq!(slugify_anchor("^root-list-item"), "#block-root-list-item");
        assert_eq!(slugify_anchor("#^root-list-item"), "#block-root-list-item");
    }

    #[test]
    fn test_split_anchor() {
        assert_eq!(split_anchor("Note#Heading"), ("Note", Some("Heading")));
        assert_eq!(split_anchor("Note#^block"), ("Note", Some("^block")));
        assert_eq!(split_anchor("Note"), ("Note", None));
        assert_eq!(split_anchor("#Heading"), ("", Some("Heading")));
    }

    #[test]
    fn test_strip_extension_and_extension() {
        assert_eq!(strip_extension("folder/note.md"), "note");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension(".obsidian"), ".obsidian");
        assert_eq!(extension("image.PNG"), "PNG");
        assert_eq!(extension("no-extension"), "");
    }

    #[test]
    fn test_dir_and_base_name() {
        assert_eq!(base_name("/folder/note.md"), "note.md");
        assert_eq!(dir_name("/folder/nested/note.md"), "/folder/nested");
        assert_eq!(dir_name("/note.md"), "");
        assert_eq!(dir_name("note.md"), "");
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("An%20image.png"), "An image.png");
        assert_eq!(percent_decode("plain"), "plain");
        assert_eq!(percent_decode("bad%2"), "bad%2");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/folder", "note"), "/folder/note");
        assert_eq!(join_paths("/folder/nested", "../note"), "/folder/note");
        assert_eq!(join_paths("", "note"), "note");
        assert_eq!(join_paths("/", "note.md"), "/note.md");
    }

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("https://example.com"));
        assert!(is_absolute_url("mailto:user@example.com"));
        assert!(!is_absolute_url("folder/note"));
        assert!(!is_absolute_url("#anchor"));
    }
}
