//! The markup converter: turns the body of a post (front matter already
//! removed) into an HTML fragment. Conversion happens in two passes over the
//! same text. [`crate::block::Segmenter`] cuts the document into blocks and
//! [`crate::htmlrenderer::HtmlRenderer`] writes each one, handing block text to
//! [`crate::inline`] for emphasis, links, images and the like.
//!
//! Conversion is total: malformed markup degrades to escaped literal text and
//! the output is always balanced HTML. The converter holds no state between
//! calls, so any number of documents can be converted concurrently.
//!
//! Link and image URLs are written as given (attribute-escaped); resolving
//! them against the site's base path is left to the page templates.

use crate::block::Segmenter;
use crate::htmlrenderer::push_html;
use pulldown_cmark::escape::StrWrite;
use std::io;

/// Converts `markdown` to HTML, writing the result into `w`. The only errors
/// are those returned by `w` itself.
pub fn to_html<W: StrWrite>(w: &mut W, markdown: &str) -> io::Result<()> {
    push_html(w, Segmenter::new(markdown))
}

/// Converts `markdown` to an HTML string.
pub fn render(markdown: &str) -> String {
    let mut html = String::with_capacity(markdown.len() + markdown.len() / 2);
    // Writing into a `String` can't fail.
    let _ = to_html(&mut html, markdown);
    html
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document() {
        assert_eq!("", render(""));
        assert_eq!("", render("\n\n   \n"));
    }

    #[test]
    fn test_script_is_never_emitted() {
        for input in &[
            "<script>alert(1)</script>",
            "# <script>",
            "- <script>",
            "> <script>",
            "```\n<script>\n```",
            "**<script>**",
            "[<script>](<script>)",
            "![<script>](x)",
            "`<script>`",
            "```<script>\nx\n```",
        ] {
            let html = render(input);
            assert!(!html.contains("<script"), "{:?} rendered as {:?}", input, html);
        }
    }

    #[test]
    fn test_plain_text_round_trip() {
        assert_eq!(
            "<p>Just words &amp; &lt;symbols&gt; &quot;quoted&quot;\non two lines</p>",
            render("Just words & <symbols> \"quoted\"\non two lines"),
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            "<p><strong>bold with <em>italic</em> inside</strong></p>",
            render("**bold with *italic* inside**"),
        );
        assert_eq!("<p><code>**not bold**</code></p>", render("`**not bold**`"));
    }

    #[test]
    fn test_unmatched_delimiter() {
        assert_eq!("<p>half *open</p>", render("half *open"));
    }

    #[test]
    fn test_block_boundaries() {
        assert_eq!("<p>one</p>\n<p>two</p>", render("one\n\ntwo"));
        assert_eq!("<ul>\n<li>a</li>\n<li>b</li>\n</ul>", render("- a\n- b"));
    }

    #[test]
    fn test_code_fence_integrity() {
        assert_eq!(
            "<p>before</p>\n<pre><code class=\"language-md\">**not bold**\n&lt;b&gt;</code></pre>\n<p>after</p>",
            render("before\n\n```md\n**not bold**\n<b>\n```\n\nafter"),
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!("<h4>Four</h4>", render("#### Four"));
        assert_eq!("<p>##### Five</p>", render("##### Five"));
    }

    #[test]
    fn test_to_html_appends() -> io::Result<()> {
        let mut html = String::from("<article>");
        to_html(&mut html, "# Hi")?;
        assert_eq!("<article><h1>Hi</h1>", html);
        Ok(())
    }

    #[test]
    fn test_sample_post() {
        let markdown = "Welcome to my blog!

This is an example post written in **Markdown**.

## Features

- Write in Markdown
- No JavaScript, no trackers

## Code example

```python
print(\"Hello, World!\")
```

> \"Simplicity is the ultimate sophistication.\" - Leonardo da Vinci

---

1. ==first==
2. [second](https://example.org)
3. ![third](/third.png)
";
        let wanted = "<p>Welcome to my blog!</p>
<p>This is an example post written in <strong>Markdown</strong>.</p>
<h2>Features</h2>
<ul>
<li>Write in Markdown</li>
<li>No JavaScript, no trackers</li>
</ul>
<h2>Code example</h2>
<pre><code class=\"language-python\">print(&quot;Hello, World!&quot;)</code></pre>
<blockquote>&quot;Simplicity is the ultimate sophistication.&quot; - Leonardo da Vinci</blockquote>
<hr />
<ol>
<li><mark>first</mark></li>
<li><a href=\"https://example.org\">second</a></li>
<li><img src=\"/third.png\" alt=\"third\"></li>
</ol>";
        assert_eq!(wanted, render(markdown));
    }
}
