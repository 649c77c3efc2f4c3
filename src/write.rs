use crate::config::Config;
use crate::post::Post;
use crate::theme::Theme;
use crate::value::escaped_href;
use gtmpl::{Template, Value};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The file name of the index page inside the output directory.
pub const INDEX_FILE: &str = "index.html";

/// The file name of the stylesheet inside the output directory.
pub const STYLESHEET_FILE: &str = "style.css";

/// Responsible for templating and writing HTML pages to disk from [`Post`]s.
pub struct Writer<'a> {
    /// The templates and stylesheet.
    pub theme: &'a Theme,

    /// Site-wide settings. The title, subtitle and description are made
    /// available to both post and index templates as `site`.
    pub config: &'a Config,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk. The page
    /// is rendered completely before the file is created.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert("site".to_owned(), Value::from(self.config));
            obj.insert("home_page".to_owned(), escaped_href(&self.config.base_path));
            obj.insert(
                "static_url".to_owned(),
                escaped_href(&format!("{}{}", self.config.base_path, STYLESHEET_FILE)),
            );
        }
        let context =
            gtmpl::Context::from(value).map_err(|err| Error::Template(err.to_string()))?;
        let mut html = Vec::new();
        page.template.execute(&mut html, &context)?;
        std::fs::write(&page.file_path, html)?;
        Ok(())
    }

    /// Writes the page for a single post to [`Post::file_path`].
    pub fn write_post(&self, post: &Post) -> Result<()> {
        self.write_page(&Page {
            item: post.into(),
            has_posts: true,
            file_path: post.file_path.clone(),
            template: &self.theme.post_template,
        })
    }

    /// Writes the index page listing `posts` (which should already be sorted,
    /// most recent first) into `output_directory`.
    pub fn write_index(&self, posts: &[&Post], output_directory: &Path) -> Result<PathBuf> {
        let file_path = output_directory.join(INDEX_FILE);
        self.write_page(&Page {
            item: Value::Array(posts.iter().map(|&post| post.into()).collect()),
            has_posts: !posts.is_empty(),
            file_path: file_path.clone(),
            template: &self.theme.index_template,
        })?;
        Ok(file_path)
    }

    /// Writes the theme's stylesheet into `output_directory`.
    pub fn write_stylesheet(&self, output_directory: &Path) -> Result<PathBuf> {
        let file_path = output_directory.join(STYLESHEET_FILE);
        std::fs::write(&file_path, &self.theme.stylesheet)?;
        Ok(file_path)
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page: a post, or the list of posts.
    item: Value,

    /// Whether there is anything to list. Always true for post pages.
    has_posts: bool,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item` and `has_posts` (see [`Page`] for descriptions).
    fn to_value(&self) -> Value {
        use std::collections::HashMap;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("has_posts".to_owned(), Value::Bool(self.has_posts));
        Value::Object(m)
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
