//! Splits a document into [`Block`]s. The [`Segmenter`] walks the document
//! one line at a time (with a single line of lookahead) and yields blocks in
//! document order. Every line is consumed exactly once; blank lines only
//! separate blocks and never produce one themselves.

use std::iter::Peekable;
use std::str::Lines;

/// The longest run of `#` that still counts as a heading marker.
const MAX_HEADING_LEVEL: usize = 4;

const FENCE: &str = "```";

/// The kind of a [`Block`] along with any per-kind data recovered from its
/// marker line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind<'a> {
    /// A `#`..`####` heading. The level is always in `1..=4`.
    Heading(u8),

    Paragraph,

    /// A run of `- ` (or `* `) items.
    UnorderedList,

    /// A run of `1. ` items. `start` is the number written on the first item,
    /// or `None` if it doesn't fit in a `u64`.
    OrderedList { start: Option<u64> },

    Blockquote,

    /// A fenced code block. `language` is the first word after the opening
    /// fence, if any.
    CodeFence { language: Option<&'a str> },

    HorizontalRule,
}

/// One structural piece of a document. `lines` holds the content of each
/// source line with the block marker (`# `, `> `, `- `, `1. `, fences)
/// already removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block<'a> {
    pub kind: BlockKind<'a>,
    pub lines: Vec<&'a str>,
}

impl<'a> Block<'a> {
    fn new(kind: BlockKind<'a>, lines: Vec<&'a str>) -> Self {
        Block { kind, lines }
    }
}

/// Yields the [`Block`]s of a document. See the module docs.
pub struct Segmenter<'a> {
    lines: Peekable<Lines<'a>>,
}

impl<'a> Segmenter<'a> {
    pub fn new(document: &'a str) -> Self {
        Segmenter {
            lines: document.lines().peekable(),
        }
    }

    /// Consumes following lines for as long as `strip` recognizes them,
    /// pushing the stripped content onto `lines`.
    fn take_run(
        &mut self,
        lines: &mut Vec<&'a str>,
        strip: impl Fn(&'a str) -> Option<&'a str>,
    ) {
        while let Some(content) = self.lines.peek().and_then(|&line| strip(line)) {
            lines.push(content);
            self.lines.next();
        }
    }

    fn code_fence(&mut self, info: &'a str) -> Block<'a> {
        let mut lines = Vec::new();
        // An unterminated fence runs to the end of the document.
        for line in &mut self.lines {
            if line.trim_end() == FENCE {
                break;
            }
            lines.push(line);
        }
        Block::new(
            BlockKind::CodeFence {
                language: info.split_whitespace().next(),
            },
            lines,
        )
    }

    fn paragraph(&mut self, first: &'a str) -> Block<'a> {
        let mut lines = vec![first];
        while let Some(&line) = self.lines.peek() {
            if is_blank(line) || Marker::classify(line) != Marker::Text {
                break;
            }
            lines.push(line);
            self.lines.next();
        }
        Block::new(BlockKind::Paragraph, lines)
    }
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Block<'a>> {
        let line = loop {
            let line = self.lines.next()?;
            if !is_blank(line) {
                break line;
            }
        };

        Some(match Marker::classify(line) {
            Marker::Heading(level) => Block::new(
                BlockKind::Heading(level as u8),
                vec![line[level + 1..].trim()],
            ),
            Marker::Rule => Block::new(BlockKind::HorizontalRule, Vec::new()),
            Marker::Fence => self.code_fence(&line[FENCE.len()..]),
            Marker::Quote => {
                let mut lines = vec![strip_quote(line).unwrap_or_default()];
                self.take_run(&mut lines, strip_quote);
                Block::new(BlockKind::Blockquote, lines)
            }
            Marker::Bullet => {
                let mut lines = vec![strip_bullet(line).unwrap_or_default()];
                self.take_run(&mut lines, strip_bullet);
                Block::new(BlockKind::UnorderedList, lines)
            }
            Marker::Ordinal => {
                let start = line
                    .split('.')
                    .next()
                    .and_then(|digits| digits.parse::<u64>().ok());
                let mut lines = vec![strip_ordinal(line).unwrap_or_default()];
                self.take_run(&mut lines, strip_ordinal);
                Block::new(BlockKind::OrderedList { start }, lines)
            }
            Marker::Text => self.paragraph(line),
        })
    }
}

/// What the leading characters of a non-blank line announce. The variants are
/// checked in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Heading(usize),
    Rule,
    Fence,
    Quote,
    Bullet,
    Ordinal,
    Text,
}

impl Marker {
    fn classify(line: &str) -> Marker {
        if let Some(level) = heading_level(line) {
            Marker::Heading(level)
        } else if is_rule(line) {
            Marker::Rule
        } else if line.starts_with(FENCE) {
            Marker::Fence
        } else if strip_quote(line).is_some() {
            Marker::Quote
        } else if strip_bullet(line).is_some() {
            Marker::Bullet
        } else if strip_ordinal(line).is_some() {
            Marker::Ordinal
        } else {
            Marker::Text
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Returns the number of leading `#` characters if they are followed by a
/// space and there are no more than [`MAX_HEADING_LEVEL`] of them.
fn heading_level(line: &str) -> Option<usize> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    match (1..=MAX_HEADING_LEVEL).contains(&level) && line[level..].starts_with(' ') {
        true => Some(level),
        false => None,
    }
}

/// `---`, `***` or `___` (three or more of one character), optionally padded
/// with whitespace.
fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    match trimmed.chars().next() {
        Some(c @ ('-' | '*' | '_')) => trimmed.len() >= 3 && trimmed.chars().all(|x| x == c),
        _ => false,
    }
}

fn strip_quote(line: &str) -> Option<&str> {
    line.strip_prefix("> ").or_else(|| line.strip_prefix('>'))
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn strip_ordinal(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    match digits {
        0 => None,
        _ => line[digits..].strip_prefix(". "),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segment(document: &str) -> Vec<Block> {
        Segmenter::new(document).collect()
    }

    fn block<'a>(kind: BlockKind<'a>, lines: &[&'a str]) -> Block<'a> {
        Block::new(kind, lines.to_vec())
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(Vec::<Block>::new(), segment(""));
        assert_eq!(Vec::<Block>::new(), segment("\n  \n\t\n"));
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            vec![
                block(BlockKind::Heading(1), &["One"]),
                block(BlockKind::Heading(4), &["Four"]),
                block(BlockKind::Paragraph, &["##### Five"]),
            ],
            segment("# One\n#### Four\n\n##### Five"),
        );
    }

    #[test]
    fn test_hash_without_space_is_text() {
        assert_eq!(
            vec![block(BlockKind::Paragraph, &["#", "#hashtag"])],
            segment("#\n#hashtag"),
        );
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        assert_eq!(
            vec![
                block(BlockKind::Paragraph, &["first line", "second line"]),
                block(BlockKind::Paragraph, &["another"]),
            ],
            segment("first line\nsecond line\n\n\nanother\n"),
        );
    }

    #[test]
    fn test_marker_interrupts_paragraph() {
        assert_eq!(
            vec![
                block(BlockKind::Paragraph, &["text"]),
                block(BlockKind::UnorderedList, &["item"]),
                block(BlockKind::Heading(2), &["Title"]),
            ],
            segment("text\n- item\n## Title"),
        );
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(
            vec![
                block(BlockKind::HorizontalRule, &[]),
                block(BlockKind::HorizontalRule, &[]),
                block(BlockKind::HorizontalRule, &[]),
                block(BlockKind::Paragraph, &["--"]),
            ],
            segment("---\n  -----  \n***\n\n--"),
        );
    }

    #[test]
    fn test_code_fence() {
        assert_eq!(
            vec![
                block(
                    BlockKind::CodeFence {
                        language: Some("rust")
                    },
                    &["fn main() {}", "", "# not a heading"],
                ),
                block(BlockKind::Paragraph, &["after"]),
            ],
            segment("```rust extra\nfn main() {}\n\n# not a heading\n```\nafter"),
        );
    }

    #[test]
    fn test_unterminated_code_fence() {
        assert_eq!(
            vec![block(
                BlockKind::CodeFence { language: None },
                &["- still code", "```not a close"],
            )],
            segment("```\n- still code\n```not a close"),
        );
    }

    #[test]
    fn test_blockquote_strips_markers() {
        assert_eq!(
            vec![
                block(BlockKind::Blockquote, &["quoted", "tight", ""]),
                block(BlockKind::Paragraph, &["plain"]),
            ],
            segment("> quoted\n>tight\n>\n\nplain"),
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            vec![
                block(BlockKind::UnorderedList, &["a", "b", "c"]),
                block(BlockKind::OrderedList { start: Some(3) }, &["x", "y"]),
            ],
            segment("- a\n* b\n- c\n\n3. x\n10. y"),
        );
    }

    #[test]
    fn test_list_run_stops_at_other_marker() {
        assert_eq!(
            vec![
                block(BlockKind::UnorderedList, &["a"]),
                block(BlockKind::OrderedList { start: Some(1) }, &["b"]),
                block(BlockKind::Paragraph, &["1.no space"]),
            ],
            segment("- a\n1. b\n\n1.no space"),
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            vec![
                block(BlockKind::Heading(1), &["Title"]),
                block(BlockKind::Paragraph, &["body"]),
            ],
            segment("# Title\r\n\r\nbody\r\n"),
        );
    }
}
