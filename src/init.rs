//! Scaffolding for a new blog.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const EXAMPLE_POST_FILE: &str = "my-first-post.md";

const EXAMPLE_POST: &str = r#"---
title: My first post
date: 2025-01-15
---

Welcome to my blog!

This is an example post written in **Markdown**. You can edit or delete it.

## Features

- Write in Markdown
- Automatic light/dark theme
- Fast and lightweight
- No JavaScript, no trackers

## Code example

```python
print("Hello, World!")
```

> "Simplicity is the ultimate sophistication." - Leonardo da Vinci

Happy writing!
"#;

/// Writes an example post into `posts_directory`, creating the directory if
/// needed. Returns the path of the new post, or `None` if the example post
/// already exists.
pub fn create_example_post(posts_directory: &Path) -> io::Result<Option<PathBuf>> {
    fs::create_dir_all(posts_directory)?;
    let path = posts_directory.join(EXAMPLE_POST_FILE);
    if path.exists() {
        return Ok(None);
    }
    fs::write(&path, EXAMPLE_POST)?;
    Ok(Some(path))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::Parser;

    #[test]
    fn test_create_example_post() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let posts_directory = dir.path().join("posts");
        let path = create_example_post(&posts_directory)?;
        assert_eq!(Some(posts_directory.join(EXAMPLE_POST_FILE)), path);

        // A second call leaves the (possibly edited) post alone.
        fs::write(posts_directory.join(EXAMPLE_POST_FILE), "edited")?;
        assert_eq!(None, create_example_post(&posts_directory)?);
        assert_eq!("edited", fs::read_to_string(posts_directory.join(EXAMPLE_POST_FILE))?);
        Ok(())
    }

    #[test]
    fn test_example_post_parses() {
        let post = Parser::new("/", Path::new("public"))
            .parse_str("my-first-post", EXAMPLE_POST)
            .unwrap();
        assert_eq!("My first post", post.title);
        assert_eq!("2025-01-15", post.date);
        assert!(post.body.contains(r#"<pre><code class="language-python">"#));
        assert!(post.body.contains("<li>No JavaScript, no trackers</li>"));
    }
}
