//! Renders [`Block`]s into HTML. Text in every block except code fences goes
//! through [`push_inline`]; code fences are escaped but otherwise written
//! verbatim. Consecutive blocks are separated by a newline.

use crate::block::{Block, BlockKind};
use crate::inline::push_inline;
use pulldown_cmark::escape::{escape_html, StrWrite};
use std::io;

/// Writes [`Block`]s as HTML, one [`HtmlRenderer::on_block`] call per block.
#[derive(Default)]
pub struct HtmlRenderer {
    blocks_written: usize,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        HtmlRenderer::default()
    }

    pub fn on_block<W: StrWrite>(&mut self, w: &mut W, block: Block) -> io::Result<()> {
        if self.blocks_written > 0 {
            w.write_str("\n")?;
        }
        self.blocks_written += 1;

        match block.kind {
            BlockKind::Heading(level) => self.on_heading(w, level, &block.lines),
            BlockKind::Paragraph => {
                w.write_str("<p>")?;
                push_inline(w, &block.lines.join("\n"))?;
                w.write_str("</p>")
            }
            BlockKind::UnorderedList => {
                w.write_str("<ul>\n")?;
                self.on_items(w, &block.lines)?;
                w.write_str("</ul>")
            }
            BlockKind::OrderedList { start } => {
                match start {
                    None | Some(1) => w.write_str("<ol>\n")?,
                    Some(start) => write!(w, "<ol start=\"{}\">\n", start)?,
                }
                self.on_items(w, &block.lines)?;
                w.write_str("</ol>")
            }
            BlockKind::Blockquote => {
                w.write_str("<blockquote>")?;
                push_inline(w, block.lines.join("\n").trim())?;
                w.write_str("</blockquote>")
            }
            BlockKind::CodeFence { language } => self.on_code_fence(w, language, &block.lines),
            BlockKind::HorizontalRule => self.on_rule(w),
        }
    }

    fn on_heading<W: StrWrite>(&mut self, w: &mut W, level: u8, lines: &[&str]) -> io::Result<()> {
        write!(w, "<h{}>", level)?;
        for line in lines {
            push_inline(w, line)?;
        }
        write!(w, "</h{}>", level)
    }

    fn on_items<W: StrWrite>(&mut self, w: &mut W, items: &[&str]) -> io::Result<()> {
        for item in items {
            w.write_str("<li>")?;
            push_inline(w, item.trim())?;
            w.write_str("</li>\n")?;
        }
        Ok(())
    }

    fn on_code_fence<W: StrWrite>(
        &mut self,
        w: &mut W,
        language: Option<&str>,
        lines: &[&str],
    ) -> io::Result<()> {
        match language {
            None => w.write_str("<pre><code>")?,
            Some(lang) => {
                w.write_str(r#"<pre><code class="language-"#)?;
                escape_html(&mut *w, lang)?;
                w.write_str(r#"">"#)?;
            }
        }
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                w.write_str("\n")?;
            }
            escape_html(&mut *w, line)?;
        }
        w.write_str("</code></pre>")
    }

    fn on_rule<W: StrWrite>(&mut self, w: &mut W) -> io::Result<()> {
        w.write_str("<hr />")
    }
}

/// Renders every [`Block`] produced by `blocks` into `w`.
pub fn push_html<'a, W, I>(w: &mut W, blocks: I) -> io::Result<()>
where
    W: StrWrite,
    I: Iterator<Item = Block<'a>>,
{
    let mut renderer = HtmlRenderer::new();
    for block in blocks {
        renderer.on_block(w, block)?;
    }
    Ok(())
}
