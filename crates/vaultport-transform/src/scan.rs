//! CommonMark scan pass.
//!
//! Before any dialect regex runs, the text is scanned once with
//! pulldown-cmark to find the regions where dialect syntax must not be
//! interpreted (code blocks, inline code, HTML) and to pick up the
//! side-channel inputs of later passes: math usage and diagram blocks.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::ops::Range;
use vaultport_core::MathOptions;

/// Byte ranges where dialect syntax is not interpreted.
#[derive(Debug, Default, Clone)]
pub struct ExcludedRanges {
    ranges: Vec<Range<usize>>,
}

impl ExcludedRanges {
    /// Check whether a byte offset falls inside any excluded range.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx > 0 && offset < self.ranges[idx - 1].end
    }

    fn add(&mut self, range: Range<usize>) {
        self.ranges.push(range);
    }

    /// Sort and merge overlapping ranges so `contains` can binary-search.
    fn optimize(&mut self) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

/// Everything one pulldown-cmark pass produces.
#[derive(Debug, Default)]
pub struct MarkdownScan {
    pub excluded: ExcludedRanges,
    /// Diagram code blocks: full fenced range plus the diagram source.
    pub diagrams: Vec<(Range<usize>, String)>,
    /// True when the text contains math the pipeline must style.
    pub has_math: bool,
}

/// Scan `text` and collect excluded ranges, diagram blocks, and math usage.
pub fn scan_markdown(text: &str, math: MathOptions) -> MarkdownScan {
    let mut scan = MarkdownScan::default();

    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_MATH);

    let parser = Parser::new_ext(text, opts);

    let mut code_block: Option<(usize, bool)> = None; // (start, is_diagram)
    let mut code_text = String::new();

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let is_diagram = matches!(
                    &kind,
                    CodeBlockKind::Fenced(lang) if lang.as_ref() == "mermaid"
                );
                code_block = Some((range.start, is_diagram));
                code_text.clear();
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((start, is_diagram)) = code_block.take() {
                    scan.excluded.add(start..range.end);
                    if is_diagram {
                        scan.diagrams.push((start..range.end, code_text.clone()));
                    }
                }
            }
            Event::Text(text) if code_block.is_some() => {
                code_text.push_str(&text);
            }
            Event::Code(_) | Event::Html(_) | Event::InlineHtml(_) => {
                scan.excluded.add(range.clone());
            }
            Event::DisplayMath(_) => {
                scan.has_math = true;
                scan.excluded.add(range.clone());
            }
            Event::InlineMath(_) => {
                // A single dollar pair is only math when configured so.
                if math.single_dollar {
                    scan.has_math = true;
                    scan.excluded.add(range.clone());
                }
            }
            _ => {}
        }
    }

    scan.excluded.optimize();
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> MarkdownScan {
        scan_markdown(text, MathOptions::default())
    }

    #[test]
    fn test_code_blocks_excluded() {
        let text = "before\n\n```rust\nlet x = \"[[link]]\";\n```\n\nafter";
        let scan = scan(text);

        let link = text.find("[[link]]").unwrap();
        assert!(scan.excluded.contains(link));
        assert!(!scan.excluded.contains(0));
        assert!(!scan.excluded.contains(text.find("after").unwrap()));
    }

    #[test]
    fn test_inline_code_excluded() {
        let text = "see `==not a highlight==` here";
        let scan = scan(text);

        assert!(scan.excluded.contains(text.find("==").unwrap()));
        assert!(!scan.excluded.contains(0));
    }

    #[test]
    fn test_mermaid_blocks_collected() {
        let text = "intro\n\n```mermaid\ngraph TD\nA-->B\n```\n";
        let scan = scan(text);

        assert_eq!(scan.diagrams.len(), 1);
        assert!(scan.diagrams[0].1.contains("graph TD"));
        assert!(text[scan.diagrams[0].0.clone()].starts_with("```mermaid"));
    }

    #[test]
    fn test_math_detection() {
        assert!(scan("some $x^2$ inline").has_math);
        assert!(scan("display:\n\n$$\nx^2\n$$\n").has_math);
        assert!(!scan("no math here").has_math);
    }

    #[test]
    fn test_single_dollar_disabled() {
        let math = MathOptions {
            single_dollar: false,
        };
        assert!(!scan_markdown("price $x$ here", math).has_math);
        assert!(scan_markdown("$$x^2$$", math).has_math);
    }

    #[test]
    fn test_overlapping_ranges_merge() {
        let mut excluded = ExcludedRanges::default();
        excluded.add(0..10);
        excluded.add(5..15);
        excluded.add(20..30);
        excluded.optimize();

        assert!(excluded.contains(12));
        assert!(!excluded.contains(17));
        assert!(excluded.contains(25));
    }
}
