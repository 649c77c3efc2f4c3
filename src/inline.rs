//! The inline half of the converter. [`Spans`] splits a run of text into
//! [`Span`]s scanning left to right, and [`push_inline`] writes them as HTML.
//!
//! At every position the scanner tries, in order: code span, image, link,
//! strong (`**`/`__`), emphasis (`*`/`_`) and highlight (`==`). Longer
//! delimiters are always tried before shorter ones, and a search for a closing
//! delimiter steps over code spans, so backticks bind tighter than anything
//! else. An opener without a partner is plain text.

use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use std::collections::HashMap;
use std::io;

/// How deeply strong/emphasis/highlight/link content may nest before the
/// remaining text is emitted literally.
const MAX_DEPTH: usize = 16;

/// One inline construct. Content of [`Span::Strong`], [`Span::Emphasis`],
/// [`Span::Highlight`] and the label of [`Span::Link`] is raw source text that
/// may itself contain spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Code(&'a str),
    Image { alt: &'a str, url: &'a str },
    Link { label: &'a str, url: &'a str },
    Strong(&'a str),
    Emphasis(&'a str),
    Highlight(&'a str),
}

/// Iterates over the [`Span`]s of a single run of text. Never yields an empty
/// [`Span::Text`].
pub struct Spans<'a> {
    text: &'a str,
    pos: usize,

    /// A construct found while collecting the preceding text, along with the
    /// offset just past it.
    pending: Option<(Span<'a>, usize)>,

    /// The offset of the last backtick. A backtick there or later never opens
    /// a code span.
    last_backtick: Option<usize>,

    /// The most recent search for each closing delimiter: where it started and
    /// what it found. A later search starting between the two has the same
    /// answer, which keeps scanning linear when openers go unmatched.
    searches: HashMap<&'static str, (usize, Option<usize>)>,
}

impl<'a> Spans<'a> {
    pub fn new(text: &'a str) -> Self {
        Spans {
            text,
            pos: 0,
            pending: None,
            last_backtick: text.rfind('`'),
            searches: HashMap::new(),
        }
    }

    fn construct_at(&mut self, i: usize) -> Option<(Span<'a>, usize)> {
        let text = self.text;
        let rest = &text.as_bytes()[i..];
        match rest {
            [b'`', ..] => self.code_span(i).map(|(code, end)| (Span::Code(code), end)),
            [b'!', b'[', ..] => self
                .bracketed(i + 1, true)
                .map(|(alt, url, end)| (Span::Image { alt, url }, end)),
            [b'[', ..] => self
                .bracketed(i, false)
                .map(|(label, url, end)| (Span::Link { label, url }, end)),
            [b'*', b'*', ..] => self.delimited(i, "**").map(|(s, end)| (Span::Strong(s), end)),
            [b'*', ..] => self.delimited(i, "*").map(|(s, end)| (Span::Emphasis(s), end)),
            [b'_', b'_', ..] => self.delimited(i, "__").map(|(s, end)| (Span::Strong(s), end)),
            [b'_', ..] => self.delimited(i, "_").map(|(s, end)| (Span::Emphasis(s), end)),
            [b'=', b'=', ..] => self
                .delimited(i, "==")
                .map(|(s, end)| (Span::Highlight(s), end)),
            _ => None,
        }
    }

    /// Matches `` `code` `` at `i`, pairing with the nearest following
    /// backtick. Empty code spans don't count.
    fn code_span(&self, i: usize) -> Option<(&'a str, usize)> {
        self.code_span_end(i)
            .map(|end| (&self.text[i + 1..end - 1], end))
    }

    /// Returns the offset just past the backtick closing a code span opened
    /// at `i`, if any.
    fn code_span_end(&self, i: usize) -> Option<usize> {
        if self.last_backtick.map_or(true, |last| i >= last) {
            return None;
        }
        match self.text[i + 1..].find('`') {
            None | Some(0) => None,
            Some(offset) => Some(i + 1 + offset + 1),
        }
    }

    /// Matches `[label](url)` with the `[` at `i`. Labels can't contain `]`
    /// and URLs can't contain `)`, other than inside code spans. Only links
    /// require a non-empty label.
    fn bracketed(&mut self, i: usize, allow_empty_label: bool) -> Option<(&'a str, &'a str, usize)> {
        let text = self.text;
        let label_start = i + 1;
        let label_end = self.find_closer(label_start, "]")?;
        if label_end == label_start && !allow_empty_label {
            return None;
        }
        let url_start = label_end + 1;
        if !text[url_start..].starts_with('(') {
            return None;
        }
        let url_end = self.find_closer(url_start + 1, ")")?;
        let url = text[url_start + 1..url_end].trim();
        match url.is_empty() {
            true => None,
            false => Some((&text[label_start..label_end], url, url_end + 1)),
        }
    }

    /// Matches `{delim}content{delim}` at `i` using the nearest acceptable
    /// closing delimiter. Content is non-empty and doesn't begin or end with
    /// whitespace. A single-character delimiter never opens or closes on a
    /// doubled one, and `_`/`__` don't open or close inside a word.
    fn delimited(&mut self, i: usize, delim: &'static str) -> Option<(&'a str, usize)> {
        let text = self.text;
        let marker = delim.as_bytes()[0];
        let open_end = i + delim.len();

        match text[open_end..].chars().next() {
            None => return None,
            Some(c) if c.is_whitespace() => return None,
            Some(_) if delim.len() == 1 && text.as_bytes()[open_end] == marker => return None,
            Some(_) => {}
        }
        if marker == b'_' && text[..i].chars().next_back().map_or(false, char::is_alphanumeric) {
            return None;
        }

        let close = self.find_closer(open_end + 1, delim)?;
        Some((&text[open_end..close], close + delim.len()))
    }

    /// Finds the first usable `closer` at or after `from`, stepping over code
    /// spans. Answers are reused from the previous search for the same closer
    /// where they still apply.
    fn find_closer(&mut self, from: usize, closer: &'static str) -> Option<usize> {
        if let Some(&(start, found)) = self.searches.get(closer) {
            if from >= start && found.map_or(true, |at| from <= at) {
                return found;
            }
        }
        let found = self.scan_for_closer(from, closer);
        self.searches.insert(closer, (from, found));
        found
    }

    fn scan_for_closer(&self, from: usize, closer: &str) -> Option<usize> {
        let text = self.text;
        let bytes = text.as_bytes();
        let marker = closer.as_bytes()[0];
        let emphasis = matches!(marker, b'*' | b'_' | b'=');
        let single = closer.len() == 1;
        let intraword = marker == b'_';

        let mut j = from;
        while j + closer.len() <= bytes.len() {
            if bytes[j] == b'`' {
                if let Some(end) = self.code_span_end(j) {
                    j = end;
                    continue;
                }
            }
            if bytes[j] != marker || !text[j..].starts_with(closer) {
                j += 1;
                continue;
            }
            if !emphasis {
                return Some(j);
            }
            if single && bytes.get(j + 1) == Some(&marker) {
                j += 2;
                continue;
            }
            // `***` closes the inner emphasis before the strong.
            while !single && bytes.get(j + closer.len()) == Some(&marker) {
                j += 1;
            }
            let close_end = j + closer.len();
            let hugs = !text[..j].chars().next_back().map_or(true, char::is_whitespace);
            let word_follows = intraword
                && text[close_end..].chars().next().map_or(false, char::is_alphanumeric);
            if hugs && !word_follows {
                return Some(j);
            }
            j += 1;
        }
        None
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        if let Some((span, end)) = self.pending.take() {
            self.pos = end;
            return Some(span);
        }

        let start = self.pos;
        let len = self.text.len();
        let mut i = start;
        while i < len {
            // Every construct opens on an ASCII byte, which is always a char
            // boundary.
            if self.text.as_bytes()[i].is_ascii() {
                if let Some((span, end)) = self.construct_at(i) {
                    if i == start {
                        self.pos = end;
                        return Some(span);
                    }
                    self.pending = Some((span, end));
                    self.pos = i;
                    return Some(Span::Text(&self.text[start..i]));
                }
            }
            i += 1;
        }

        self.pos = len;
        match start < len {
            true => Some(Span::Text(&self.text[start..])),
            false => None,
        }
    }
}

/// Writes `text` as HTML: literal text is escaped and every recognized
/// construct is replaced by its tag.
pub fn push_inline<W: StrWrite>(w: &mut W, text: &str) -> io::Result<()> {
    push_spans(w, text, 0)
}

fn push_spans<W: StrWrite>(w: &mut W, text: &str, depth: usize) -> io::Result<()> {
    if depth >= MAX_DEPTH {
        return escape_html(&mut *w, text);
    }
    for span in Spans::new(text) {
        match span {
            Span::Text(s) => escape_html(&mut *w, s)?,
            Span::Code(s) => {
                w.write_str("<code>")?;
                escape_html(&mut *w, s)?;
                w.write_str("</code>")?;
            }
            Span::Image { alt, url } => {
                w.write_str(r#"<img src=""#)?;
                escape_href(&mut *w, url)?;
                w.write_str(r#"" alt=""#)?;
                escape_html(&mut *w, alt)?;
                w.write_str(r#"">"#)?;
            }
            Span::Link { label, url } => {
                w.write_str(r#"<a href=""#)?;
                escape_href(&mut *w, url)?;
                w.write_str(r#"">"#)?;
                push_spans(w, label, depth + 1)?;
                w.write_str("</a>")?;
            }
            Span::Strong(s) => push_wrapped(w, "strong", s, depth)?,
            Span::Emphasis(s) => push_wrapped(w, "em", s, depth)?,
            Span::Highlight(s) => push_wrapped(w, "mark", s, depth)?,
        }
    }
    Ok(())
}

fn push_wrapped<W: StrWrite>(w: &mut W, tag: &str, content: &str, depth: usize) -> io::Result<()> {
    write!(w, "<{}>", tag)?;
    push_spans(w, content, depth + 1)?;
    write!(w, "</{}>", tag)
}
