//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::post`]), loading the theme ([`crate::theme`]), and rendering post
//! and index pages ([`crate::write`]).

use crate::config::Config;
use crate::post::{Error as ParseError, Parsed, Parser as PostParser};
use crate::theme::{Error as ThemeError, Theme};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::path::{Path, PathBuf};

/// What happened during a build that didn't abort it.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// The number of post pages written.
    pub posts: usize,

    /// The number of posts that failed to parse or to render. Failing posts
    /// are left out of the index.
    pub failures: usize,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`PostParser::parse_posts`] and [`Writer`] which do the heavy-lifting.
///
/// A post that fails to parse or to render is logged and counted in the
/// returned [`Summary`]; the rest of the site is still built. Problems with
/// the posts directory, the theme, the output directory or the index page
/// abort the build.
pub fn build_site(config: &Config) -> Result<Summary> {
    mkdir(&config.posts_directory)?;

    let post_parser = PostParser::new(&config.base_path, &config.output_directory);
    let Parsed { posts, failures } =
        post_parser.parse_posts(&config.posts_directory, config.threads)?;
    for failure in &failures {
        log::error!("{}", failure.error);
    }

    let theme = Theme::load(config.theme_directory.as_deref())?;

    // Pages of deleted posts are left in place. Nothing in the output
    // directory is ever removed.
    mkdir(&config.output_directory)?;

    let writer = Writer {
        theme: &theme,
        config,
    };
    let mut written = Vec::with_capacity(posts.len());
    let mut summary = Summary {
        posts: 0,
        failures: failures.len(),
    };
    for post in &posts {
        match writer.write_post(post) {
            Ok(()) => {
                log::info!("  {}", post.file_path.display());
                written.push(post);
            }
            Err(err) => {
                log::error!("writing post `{}`: {}", post.file_path.display(), err);
                summary.failures += 1;
            }
        }
    }
    summary.posts = written.len();

    let index = writer.write_index(&written, &config.output_directory)?;
    log::info!("  {}", index.display());
    writer.write_stylesheet(&config.output_directory)?;

    log::info!("Site built in {}", config.output_directory.display());
    Ok(summary)
}

fn mkdir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDirectory {
        path: dir.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, theme
/// loading, writing, and creating output directories.
#[derive(Debug)]
pub enum Error {
    /// Returned when the posts directory can't be read.
    Parse(ParseError),

    /// Returned when the theme can't be loaded.
    Theme(ThemeError),

    /// Returned when the index page or the stylesheet can't be written.
    Write(WriteError),

    /// Returned for I/O problems while creating directories.
    CreateDirectory { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Theme(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::CreateDirectory { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Theme(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::CreateDirectory { path: _, err } => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<ThemeError> for Error {
    /// Converts [`ThemeError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ThemeError) -> Error {
        Error::Theme(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn config(root: &Path, threads: usize) -> Config {
        Config {
            title: String::from("My Blog"),
            subtitle: String::from("A minimal, no-nonsense blog"),
            description: String::from("Welcome to my blog."),
            base_path: String::from("/"),
            posts_directory: root.join("posts"),
            output_directory: root.join("public"),
            theme_directory: None,
            threads,
        }
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 2);
        fs::create_dir_all(&config.posts_directory).unwrap();
        fs::write(
            config.posts_directory.join("first.md"),
            "---\ntitle: First\ndate: 2021-01-01\n---\nHello **there**.\n",
        )
        .unwrap();
        fs::write(
            config.posts_directory.join("second.md"),
            "---\ntitle: Second\ndate: 2021-02-01\n---\n<script>x</script>\n",
        )
        .unwrap();
        fs::write(config.posts_directory.join("broken.md"), "---\ntitle: Broken\n").unwrap();

        let summary = build_site(&config)?;
        assert_eq!(
            Summary {
                posts: 2,
                failures: 1
            },
            summary
        );

        let first = fs::read_to_string(config.output_directory.join("first.html")).unwrap();
        assert!(first.contains("<p>Hello <strong>there</strong>.</p>"));
        let second = fs::read_to_string(config.output_directory.join("second.html")).unwrap();
        assert!(second.contains("<p>&lt;script&gt;x&lt;/script&gt;</p>"));
        assert!(!config.output_directory.join("broken.html").exists());

        let index = fs::read_to_string(config.output_directory.join("index.html")).unwrap();
        let second_at = index.find("/second.html").unwrap();
        let first_at = index.find("/first.html").unwrap();
        assert!(second_at < first_at);
        assert!(!index.contains("Broken"));
        assert!(config.output_directory.join("style.css").is_file());
        Ok(())
    }

    #[test]
    fn test_build_empty_site_creates_posts_directory() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), 1);
        assert_eq!(Summary::default(), build_site(&config)?);
        assert!(config.posts_directory.is_dir());
        let index = fs::read_to_string(config.output_directory.join("index.html")).unwrap();
        assert!(index.contains("No posts yet"));
        Ok(())
    }

    #[test]
    fn test_missing_theme_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), 1);
        config.theme_directory = Some(dir.path().join("no-such-theme"));
        match build_site(&config) {
            Err(Error::Theme(_)) => {}
            other => panic!("wanted a theme error; found {:?}", other),
        }
    }
}
