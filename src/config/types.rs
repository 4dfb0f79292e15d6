//! Configuration type definitions.
//!
//! `Config` is the untyped mapping that front matter and `.belbo.toml` decode
//! into. `SiteSettings` is the typed view of the keys the builder understands.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Config mapping
// =============================================================================

/// A string-keyed mapping of dynamically typed values.
///
/// Built once from the defaults and the project file, then merged again for
/// every page with that page's front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(Map<String, Value>);

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a TOML document (front matter or a config file body).
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Return a new mapping where `other`'s pairs replace ours.
    ///
    /// Nested tables are replaced wholesale, not merged.
    pub fn merge_with(&self, other: &Config) -> Config {
        let mut merged = self.0.clone();
        for (key, value) in &other.0 {
            merged.insert(key.clone(), value.clone());
        }
        Config(merged)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Read a list of strings. A lone string counts as a one-element list;
    /// non-string elements are ignored.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Map<String, Value>> for Config {
    fn from(map: Map<String, Value>) -> Self {
        Config(map)
    }
}

// =============================================================================
// Typed site settings
// =============================================================================

pub const DEFAULT_CONTENT_DIR: &str = "posts";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_BUILD_DIR: &str = "public";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_FRONTMATTER_SEP: &str = "---";
pub const DEFAULT_INDEX_FILE: &str = "index.md";
pub const DEFAULT_MARKDOWN_EXTENSIONS: &[&str] = &["tables", "footnotes", "strikethrough"];

/// The project-level settings, with every path resolved against the root.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Directory that is walked for content
    pub root_path: PathBuf,
    /// Content directories (already joined onto `root_path`)
    pub content_dirs: Vec<PathBuf>,
    /// Layouts live here, partials in its `partials/` subdirectory
    pub templates_dir: PathBuf,
    /// Where the site is written
    pub build_dir: PathBuf,
    /// Name of the static directory, relative to both root and build dir
    pub static_dir: PathBuf,
    /// Line that opens and closes a front matter block
    pub frontmatter_sep: String,
    /// Partials loaded for every page
    pub partials: Vec<String>,
    /// The file that becomes `<build_dir>/index.html`
    pub index_file: String,
    /// pulldown-cmark extensions, by name
    pub markdown_extensions: Vec<String>,
    /// Serve the build directory after building (bare invocation only)
    pub local_server: bool,
}

impl SiteSettings {
    /// Read the settings out of a config mapping.
    ///
    /// `base_path` is the directory holding the config file; `root_path` is
    /// resolved against it.
    pub fn from_config(config: &Config, base_path: &Path) -> Self {
        let root_path = normalize(
            &base_path.join(config.get_str("root_path").unwrap_or(".")),
        );

        let mut content_dirs = config.get_string_list("content_dir");
        if content_dirs.is_empty() && !config.contains_key("content_dir") {
            content_dirs.push(DEFAULT_CONTENT_DIR.to_string());
        }
        let content_dirs = content_dirs
            .iter()
            .map(|dir| root_path.join(normalize(Path::new(dir))))
            .collect();

        // `output_dir` is the older name of the same key
        let build_dir = config
            .get_str("output_dir")
            .or_else(|| config.get_str("build_dir"))
            .unwrap_or(DEFAULT_BUILD_DIR);

        let markdown_extensions = if config.contains_key("markdown_extensions") {
            config.get_string_list("markdown_extensions")
        } else {
            DEFAULT_MARKDOWN_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect()
        };

        Self {
            templates_dir: root_path.join(
                config
                    .get_str("templates_dir")
                    .unwrap_or(DEFAULT_TEMPLATES_DIR),
            ),
            build_dir: root_path.join(normalize(Path::new(build_dir))),
            static_dir: normalize(Path::new(
                config.get_str("static_dir").unwrap_or(DEFAULT_STATIC_DIR),
            )),
            frontmatter_sep: config
                .get_str("frontmatter_sep")
                .unwrap_or(DEFAULT_FRONTMATTER_SEP)
                .to_string(),
            partials: config.get_string_list("partials"),
            index_file: config
                .get_str("index_file")
                .unwrap_or(DEFAULT_INDEX_FILE)
                .to_string(),
            markdown_extensions,
            local_server: config.get_bool("local_server").unwrap_or(true),
            content_dirs,
            root_path,
        }
    }

    /// Source of the static assets.
    pub fn static_source(&self) -> PathBuf {
        self.root_path.join(&self.static_dir)
    }

    /// Destination of the static assets inside the build directory.
    pub fn static_destination(&self) -> PathBuf {
        self.build_dir.join(&self.static_dir)
    }
}

/// Drop `.` components so `./posts` and `posts` compare equal after joining.
fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
