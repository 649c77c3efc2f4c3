//! Loads the page templates and stylesheet. Templates use Go template syntax
//! (see [`gtmpl`]). A built-in theme is compiled into the binary; a theme
//! directory containing the same three files replaces it.

use gtmpl::Template;
use std::fmt;
use std::path::{Path, PathBuf};

const POST_TEMPLATE_FILE: &str = "post.html";
const INDEX_TEMPLATE_FILE: &str = "index.html";
const STYLESHEET_FILE: &str = "style.css";

const EMBEDDED_POST_TEMPLATE: &str = include_str!("../theme/post.html");
const EMBEDDED_INDEX_TEMPLATE: &str = include_str!("../theme/index.html");
const EMBEDDED_STYLESHEET: &str = include_str!("../theme/style.css");

/// Parsed templates plus the stylesheet copied next to the pages.
pub struct Theme {
    /// Renders one post. Its `item` is the post.
    pub post_template: Template,

    /// Renders the index page. Its `item` is the list of posts.
    pub index_template: Template,

    pub stylesheet: String,
}

impl Theme {
    /// Loads the theme from `directory`, or the built-in theme if there is no
    /// directory.
    pub fn load(directory: Option<&Path>) -> Result<Theme> {
        match directory {
            Some(directory) => Theme::from_directory(directory),
            None => Theme::embedded(),
        }
    }

    /// The built-in theme.
    pub fn embedded() -> Result<Theme> {
        Ok(Theme {
            post_template: parse_template(POST_TEMPLATE_FILE, EMBEDDED_POST_TEMPLATE)?,
            index_template: parse_template(INDEX_TEMPLATE_FILE, EMBEDDED_INDEX_TEMPLATE)?,
            stylesheet: EMBEDDED_STYLESHEET.to_owned(),
        })
    }

    /// Reads `post.html`, `index.html` and `style.css` from `directory`.
    pub fn from_directory(directory: &Path) -> Result<Theme> {
        let read = |file_name: &str| {
            let path = directory.join(file_name);
            std::fs::read_to_string(&path).map_err(|err| Error::OpenFile { path, err })
        };
        Ok(Theme {
            post_template: parse_template(POST_TEMPLATE_FILE, &read(POST_TEMPLATE_FILE)?)?,
            index_template: parse_template(INDEX_TEMPLATE_FILE, &read(INDEX_TEMPLATE_FILE)?)?,
            stylesheet: read(STYLESHEET_FILE)?,
        })
    }
}

fn parse_template(name: &str, contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|err| Error::ParseTemplate {
            name: name.to_owned(),
            err,
        })?;
    Ok(template)
}

/// The result of loading a [`Theme`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading a [`Theme`].
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading theme files.
    OpenFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate { name: String, err: String },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenFile { path, err } => {
                write!(f, "Opening theme file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { name, err } => {
                write!(f, "Parsing template '{}': {}", name, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenFile { path: _, err } => Some(err),
            Error::ParseTemplate { .. } => None,
        }
    }
}
