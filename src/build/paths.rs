//! Path and URL derivation.
//!
//! This module handles conversions between:
//! - Relative source paths (e.g., `posts/2020-09-03-hello.md`)
//! - Build paths, the ordered output segments (e.g., `public/posts/2020/09/hello`)
//! - URLs, the build path without its root, used for links
//! - Output file paths, where the rendered page is written

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::config::{DEFAULT_INDEX_FILE, SiteSettings};

/// Layout of the date prefix in dated file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATED_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<date>\d{4}-\d{2}-\d{2})-(?<rest>.+)$").expect("dated file name regex")
});

#[derive(thiserror::Error, Debug)]
pub enum PathError {
    #[error("invalid date '{date}' in file name {path}: {source}")]
    InvalidDate {
        path: String,
        date: String,
        source: chrono::ParseError,
    },
}

/// Split a date-shaped file name into its date prefix and the rest.
///
/// `"2020-09-03-hello.md"` -> `Some(("2020-09-03", "hello.md"))`
pub fn split_dated_file_name(file_name: &str) -> Option<(&str, &str)> {
    let captures = DATED_FILE_NAME.captures(file_name)?;
    let date = captures.name("date")?.as_str();
    let rest = captures.name("rest")?.as_str();
    Some((date, rest))
}

/// Last segment of a `/`-separated relative path.
fn file_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// Strip the extension from a file name, keeping inner dots.
fn strip_extension(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Parse the creation date encoded in a dated file name.
///
/// Returns `Ok(None)` for undated names. A date-shaped prefix that is not a
/// calendar date (e.g. `2020-13-45-...`) is an error.
pub fn created_at(relative_path: &str) -> Result<Option<NaiveDate>, PathError> {
    let Some((date, _)) = split_dated_file_name(file_name(relative_path)) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(Some)
        .map_err(|source| PathError::InvalidDate {
            path: relative_path.to_string(),
            date: date.to_string(),
            source,
        })
}

/// Page name: the file name without date prefix and extension.
///
/// `"posts/2020-09-03-hello.md"` -> `"hello"`, `"about.md"` -> `"about"`
pub fn page_name(relative_path: &str) -> &str {
    let name = file_name(relative_path);
    match split_dated_file_name(name) {
        Some((_, rest)) => strip_extension(rest),
        None => strip_extension(name),
    }
}

/// Where a page is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Output segments, starting with the build root
    pub build_path: Vec<String>,
    /// Written as `<build_path>/index.html` rather than to `build_path` itself
    pub directory_style: bool,
}

impl BuildTarget {
    /// The relative URL: every segment after the build root, joined by `/`.
    pub fn url(&self) -> String {
        self.build_path
            .iter()
            .skip(1)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The file the rendered page is written to.
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.build_path, self.directory_style)
    }
}

/// Join build path segments into the output file path.
///
/// Directory-style pages are written to `<build_path>/index.html`.
pub fn output_path(build_path: &[String], directory_style: bool) -> PathBuf {
    let mut path: PathBuf = build_path.iter().collect();
    if directory_style {
        path.push("index.html");
    }
    path
}

/// Derives build paths from relative source paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root_build_dir: String,
    index_file: String,
}

impl PathResolver {
    pub fn new(root_build_dir: impl Into<String>) -> Self {
        Self {
            root_build_dir: root_build_dir.into(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }

    pub fn from_settings(settings: &SiteSettings) -> Self {
        Self::new(settings.build_dir.to_string_lossy()).with_index_file(&settings.index_file)
    }

    /// Use a different file as the root index (default `index.md`).
    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    /// Resolve the build target of a page.
    ///
    /// ```ignore
    /// resolve("posts/2020-09-03-hello.md", 2020-09-03) => [root, "posts", "2020", "09", "hello"], directory style
    /// resolve("about.md", None)                        => [root, "about"], directory style
    /// resolve("index.md", None)                        => [root, "index.html"]
    /// ```
    pub fn resolve(&self, relative_path: &str, created_at: Option<NaiveDate>) -> BuildTarget {
        let name = file_name(relative_path);

        if let (Some((_, rest)), Some(date)) = (split_dated_file_name(name), created_at) {
            let mut build_path = vec![self.root_build_dir.clone()];
            // A dated file at the root has no content folder
            if let Some((folder, _)) = relative_path.split_once('/') {
                build_path.push(folder.to_string());
            }
            build_path.push(format!("{:04}", date.year()));
            build_path.push(format!("{:02}", date.month()));
            build_path.push(strip_extension(rest).to_string());

            return BuildTarget {
                build_path,
                directory_style: true,
            };
        }

        if relative_path != self.index_file {
            return BuildTarget {
                build_path: vec![self.root_build_dir.clone(), strip_extension(name).to_string()],
                directory_style: true,
            };
        }

        BuildTarget {
            build_path: vec![self.root_build_dir.clone(), "index.html".to_string()],
            directory_style: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_split_dated_file_name() {
        assert_eq!(
            split_dated_file_name("2020-09-03-hello.md"),
            Some(("2020-09-03", "hello.md"))
        );
        assert_eq!(split_dated_file_name("hello.md"), None);
        assert_eq!(split_dated_file_name("2020-09-03.md"), None);
        assert_eq!(split_dated_file_name("x2020-09-03-hello.md"), None);
    }

    #[test]
    fn test_created_at() {
        assert_eq!(
            created_at("posts/2020-09-03-hello.md").unwrap(),
            Some(date(2020, 9, 3))
        );
        assert_eq!(created_at("about.md").unwrap(), None);
        // only the file name counts, not the folders
        assert_eq!(created_at("2020-09-03-archive/about.md").unwrap(), None);
    }

    #[test]
    fn test_created_at_invalid_date() {
        let err = created_at("posts/2020-13-45-broken.md").unwrap_err();
        assert!(err.to_string().contains("posts/2020-13-45-broken.md"));
    }

    #[test]
    fn test_page_name() {
        assert_eq!(page_name("posts/2020-09-03-hello.md"), "hello");
        assert_eq!(page_name("./posts/2020-12-12-bar.md"), "bar");
        assert_eq!(page_name("about.md"), "about");
        assert_eq!(page_name("posts/v1.2-notes.md"), "v1.2-notes");
    }

    #[test]
    fn test_resolve_dated() {
        let resolver = PathResolver::new("public");
        let target = resolver.resolve("posts/2020-09-03-hello.md", Some(date(2020, 9, 3)));

        assert_eq!(target.build_path, vec!["public", "posts", "2020", "09", "hello"]);
        assert!(target.directory_style);
        assert_eq!(target.url(), "posts/2020/09/hello");
        assert_eq!(
            target.output_path(),
            PathBuf::from("public/posts/2020/09/hello/index.html")
        );
    }

    #[test]
    fn test_resolve_dated_at_root() {
        let resolver = PathResolver::new("public");
        let target = resolver.resolve("2021-01-02-notes.html", Some(date(2021, 1, 2)));

        assert_eq!(target.build_path, vec!["public", "2021", "01", "notes"]);
    }

    #[test]
    fn test_resolve_named() {
        let resolver = PathResolver::new("public");
        let target = resolver.resolve("about.md", None);

        assert_eq!(target.build_path, vec!["public", "about"]);
        assert!(target.directory_style);
        assert_eq!(target.url(), "about");
        assert_eq!(target.output_path(), PathBuf::from("public/about/index.html"));
    }

    #[test]
    fn test_resolve_root_index() {
        let resolver = PathResolver::new("public");
        let target = resolver.resolve("index.md", None);

        assert_eq!(target.build_path, vec!["public", "index.html"]);
        assert!(!target.directory_style);
        assert_eq!(target.url(), "index.html");
        assert_eq!(target.output_path(), PathBuf::from("public/index.html"));
    }

    #[test]
    fn test_resolve_custom_index_file() {
        let resolver = PathResolver::new("public").with_index_file("home.html");

        assert_eq!(
            resolver.resolve("home.html", None).build_path,
            vec!["public", "index.html"]
        );
        assert_eq!(
            resolver.resolve("index.md", None).build_path,
            vec!["public", "index"]
        );
    }
}
