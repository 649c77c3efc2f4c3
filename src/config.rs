//! Loads the site [`Config`] from a `tinyblog.yaml` project file. Every field
//! of the project file is optional; a site without one builds with the
//! defaults.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "tinyblog.yaml";

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    title: String,
    subtitle: String,
    description: String,
    base_path: String,
    posts_directory: PathBuf,
    output_directory: PathBuf,
    theme_directory: Option<PathBuf>,
    threads: Option<usize>,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            title: String::from("My Blog"),
            subtitle: String::from("A minimal, no-nonsense blog"),
            description: String::from("Welcome to my blog."),
            base_path: String::from("/"),
            posts_directory: PathBuf::from("posts"),
            output_directory: PathBuf::from("public"),
            theme_directory: None,
            threads: None,
        }
    }
}

/// Site-wide settings. Passed by reference to everything that needs them;
/// nothing reads configuration from anywhere else.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The blog title, shown in every page header.
    pub title: String,

    /// Shown on the index page under the header.
    pub subtitle: String,

    /// Introductory text on the index page.
    pub description: String,

    /// The URL path at which the site is hosted. Always ends with `/`.
    pub base_path: String,

    /// Where post source files (`*.md`) live.
    pub posts_directory: PathBuf,

    /// Where the site is written.
    pub output_directory: PathBuf,

    /// A directory with `post.html`, `index.html` and `style.css` replacing
    /// the built-in theme.
    pub theme_directory: Option<PathBuf>,

    /// The number of threads used to parse posts.
    pub threads: usize,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents.
    /// If there's none, the default configuration rooted at `dir` is
    /// returned. `threads` overrides the project file's setting.
    pub fn from_directory(dir: &Path, threads: Option<usize>) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                log::debug!("Using project file `{}`", path.display());
                return Config::from_project_file(&path, threads);
            }
        }
        log::info!(
            "No `{}` found in `{}` or its parents; using defaults",
            PROJECT_FILE,
            dir.display()
        );
        Ok(Config::from_project(Project::default(), dir, threads))
    }

    /// Loads the project file at `path`. Relative directories in it are
    /// resolved against the directory containing `path`.
    pub fn from_project_file(path: &Path, threads: Option<usize>) -> Result<Config> {
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|err| Error::Open {
                path: path.to_owned(),
                err,
            })?;
        let project: Project = match contents.trim().is_empty() {
            true => Project::default(),
            false => serde_yaml::from_str(&contents).map_err(|err| Error::DeserializeYaml {
                path: path.to_owned(),
                err,
            })?,
        };
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Config::from_project(project, project_root, threads))
    }

    fn from_project(project: Project, project_root: &Path, threads: Option<usize>) -> Config {
        let mut base_path = project.base_path;
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Config {
            title: project.title,
            subtitle: project.subtitle,
            description: project.description,
            base_path,
            posts_directory: project_root.join(project.posts_directory),
            output_directory: project_root.join(project.output_directory),
            theme_directory: project
                .theme_directory
                .map(|theme_directory| project_root.join(theme_directory)),
            threads: match threads.or(project.threads) {
                None => num_cpus::get(),
                Some(threads) => threads.max(1),
            },
        }
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file exists but can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or has fields of the
    /// wrong type.
    DeserializeYaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening project file `{}`: {}", path.display(), err)
            }
            Error::DeserializeYaml { path, err } => {
                write!(f, "Loading project file `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::DeserializeYaml { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_directory(dir.path(), Some(3))?;
        assert_eq!(
            Config {
                title: String::from("My Blog"),
                subtitle: String::from("A minimal, no-nonsense blog"),
                description: String::from("Welcome to my blog."),
                base_path: String::from("/"),
                posts_directory: dir.path().join("posts"),
                output_directory: dir.path().join("public"),
                theme_directory: None,
                threads: 3,
            },
            config,
        );
        Ok(())
    }

    #[test]
    fn test_project_file_in_parent_directory() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("posts").join("drafts");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "title: Notes\nbase_path: /blog\noutput_directory: out\ntheme_directory: theme\nthreads: 2\n",
        )
        .unwrap();

        let config = Config::from_directory(&nested, None)?;
        assert_eq!("Notes", config.title);
        assert_eq!("A minimal, no-nonsense blog", config.subtitle);
        assert_eq!("/blog/", config.base_path);
        assert_eq!(dir.path().join("posts"), config.posts_directory);
        assert_eq!(dir.path().join("out"), config.output_directory);
        assert_eq!(Some(dir.path().join("theme")), config.theme_directory);
        assert_eq!(2, config.threads);
        Ok(())
    }

    #[test]
    fn test_threads_flag_overrides_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "threads: 8\n").unwrap();
        assert_eq!(1, Config::from_directory(dir.path(), Some(0))?.threads);
        Ok(())
    }

    #[test]
    fn test_invalid_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "threads: many\n").unwrap();
        match Config::from_directory(dir.path(), None) {
            Err(Error::DeserializeYaml { path, .. }) => {
                assert_eq!(dir.path().join(PROJECT_FILE), path)
            }
            other => panic!("wanted DeserializeYaml; found {:?}", other),
        }
    }
}
