//! Defines the [`Post`], [`Parser`], and [`Error`] types. Also defines the
//! logic for parsing posts from the file system into memory. See
//! [`crate::value`] for how posts are converted into template values.

use std::{
    ffi::OsStr,
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::markdown;

/// The extension of post source files.
pub const MARKDOWN_EXTENSION: &str = "md";

/// The extension of rendered post pages.
pub const HTML_EXTENSION: &str = "html";

/// A post, parsed and converted, ready to be templated.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The source file name without its extension. Also the output file name.
    pub slug: String,

    /// The post title, from the frontmatter or derived from the slug.
    pub title: String,

    /// The post date, from the frontmatter or the day the site was built.
    pub date: String,

    /// The URL of the post page, i.e., `{base_path}{slug}.html`.
    pub url: String,

    /// Where the post page will be written.
    pub file_path: PathBuf,

    /// The post body converted to HTML.
    pub body: String,
}

/// A post that failed to parse. Failures are per-document; other posts are
/// unaffected.
#[derive(Debug)]
pub struct Failure {
    pub path: PathBuf,
    pub error: Error,
}

/// The result of [`Parser::parse_posts`].
#[derive(Debug, Default)]
pub struct Parsed {
    /// Posts sorted by date, most recent first.
    pub posts: Vec<Post>,

    /// Source files that couldn't be parsed, in no particular order.
    pub failures: Vec<Failure>,
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `base_path` prefixes post page URLs (i.e., the URL for a post is
    /// `{base_path}{slug}.html`). It should end in a slash.
    base_path: &'a str,

    /// `output_directory` is the directory in which post pages will be
    /// rendered.
    output_directory: &'a Path,

    /// The date given to posts whose frontmatter doesn't have one.
    today: String,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(base_path: &'a str, output_directory: &'a Path) -> Parser<'a> {
        Parser {
            base_path,
            output_directory,
            today: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Parses a single [`Post`] from its slug and the contents of its source
    /// file.
    pub fn parse_str(&self, slug: &str, input: &str) -> Result<Post> {
        let (yaml, body) = split_frontmatter(input)?;
        let frontmatter: Frontmatter = match yaml {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
            _ => Frontmatter::default(),
        };

        let file_name = format!("{}.{}", slug, HTML_EXTENSION);
        let mut post = Post {
            slug: slug.to_owned(),
            title: frontmatter.title.unwrap_or_else(|| title_from_slug(slug)),
            date: frontmatter.date.unwrap_or_else(|| self.today.clone()),
            url: format!("{}{}", self.base_path, file_name),
            file_path: self.output_directory.join(&file_name),
            body: String::default(),
        };
        markdown::to_html(&mut post.body, body.trim())?;
        Ok(post)
    }

    /// Reads and parses the post at `path`. Errors are annotated with the
    /// path.
    pub fn parse_post(&self, path: &Path) -> Result<Post> {
        self._parse_post(path)
            .map_err(|e| Error::Annotated(format!("parsing post `{}`", path.display()), Box::new(e)))
    }

    fn _parse_post(&self, path: &Path) -> Result<Post> {
        use std::io::Read;
        let slug = path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| InvalidFileNameError(path.to_owned()))?;
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        self.parse_str(slug, &contents)
    }

    fn parse_into(&self, path: PathBuf, parsed: &mut Parsed) {
        match self.parse_post(&path) {
            Ok(post) => {
                log::debug!("Parsed `{}`", path.display());
                parsed.posts.push(post);
            }
            Err(error) => parsed.failures.push(Failure { path, error }),
        }
    }

    /// Searches `source_directory` (not its subdirectories) for post files
    /// (extension = `.md`) and parses each of them, using up to `threads`
    /// worker threads. Each post file is structured as follows:
    ///
    /// 1. Optional frontmatter: a `---` line, YAML with optional `title` and
    ///    `date` fields, and a closing `---` line
    /// 2. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// A post that fails to parse is reported in [`Parsed::failures`] and
    /// doesn't affect the others. Only problems listing the directory itself
    /// are returned as errors.
    pub fn parse_posts(&self, source_directory: &Path, threads: usize) -> Result<Parsed> {
        let paths = source_files(source_directory)?;
        let mut parsed = if threads < 2 || paths.len() < 2 {
            self.parse_posts_singlethreaded(paths)
        } else {
            self.parse_posts_parallel(paths, threads)?
        };
        parsed
            .posts
            .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(parsed)
    }

    fn parse_posts_singlethreaded(&self, paths: Vec<PathBuf>) -> Parsed {
        let mut parsed = Parsed::default();
        for path in paths {
            self.parse_into(path, &mut parsed);
        }
        parsed
    }

    fn parse_posts_parallel(&self, paths: Vec<PathBuf>, threads: usize) -> Result<Parsed> {
        use crossbeam_channel::unbounded;
        use std::thread;

        let (tx, rx) = unbounded::<PathBuf>();
        for path in paths {
            // The receiver is alive until the end of this function.
            let _ = tx.send(path);
        }
        drop(tx);

        thread::scope(|scope| {
            let workers: Vec<_> = (0..threads)
                .map(|_| {
                    let rx = rx.clone();
                    scope.spawn(move || {
                        let mut parsed = Parsed::default();
                        for path in rx {
                            self.parse_into(path, &mut parsed);
                        }
                        parsed
                    })
                })
                .collect();

            let mut parsed = Parsed::default();
            for worker in workers {
                let part = worker.join().map_err(|_| Error::WorkerPanicked)?;
                parsed.posts.extend(part.posts);
                parsed.failures.extend(part.failures);
            }
            Ok(parsed)
        })
    }
}

/// Lists the post source files directly inside `dir`, sorted by file name.
fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for result in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = result?;
        let is_markdown = entry.path().extension() == Some(OsStr::new(MARKDOWN_EXTENSION));
        if entry.file_type().is_file() && is_markdown {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Splits a source file into its YAML frontmatter (if any) and its body. The
/// frontmatter is optional, but once opened with a `---` line it must be
/// closed with another.
fn split_frontmatter(input: &str) -> Result<(Option<&str>, &str)> {
    const FENCE: &str = "---";
    let input = input.trim_start_matches('\u{feff}');
    let mut lines = input.split_inclusive('\n');
    let yaml_start = match lines.next() {
        Some(first) if first.trim_end() == FENCE => first.len(),
        _ => return Ok((None, input)),
    };

    let mut yaml_stop = yaml_start;
    for line in lines {
        if line.trim_end() == FENCE {
            let body_start = yaml_stop + line.len();
            return Ok((Some(&input[yaml_start..yaml_stop]), &input[body_start..]));
        }
        yaml_stop += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

/// Turns `my-first_post` into `My First Post`.
fn title_from_slug(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Deserialize, Default)]
struct Frontmatter {
    /// The title of the post.
    #[serde(default)]
    title: Option<String>,

    /// The date of the post, conventionally `YYYY-MM-DD`.
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {
    /// Implements the [`std::error::Error`] trait for [`InvalidFileNameError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file opens a frontmatter block (`---`) but
    /// never closes it.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// Returned when a parsing thread panicked.
    WorkerPanicked,

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::WorkerPanicked => write!(f, "a post parsing thread panicked"),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::WorkerPanicked => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible directory walks.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
