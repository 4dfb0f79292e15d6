use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::build::front_matter::parse_front_matter;
use crate::build::paths::{self, PathError, PathResolver};
use crate::config::Config;
use crate::util::title_case;

// =============================================================================
// Pages
// =============================================================================

/// One content file, parsed and placed.
#[derive(Debug, Clone)]
pub struct Page {
    /// Path relative to the project root, `/`-separated (e.g. "posts/2020-09-03-hello.md")
    pub relative_path: String,
    /// Project config merged with this page's front matter
    pub config: Config,
    /// Content without the front matter block
    pub raw_content: String,
    /// Date from the file name, if it has one
    pub created_at: Option<NaiveDate>,
    /// File name without date prefix and extension
    pub name: String,
    /// Display title
    pub title: String,
    /// Output segments, starting with the build root
    pub build_path: Vec<String>,
    /// Written to `<build_path>/index.html`
    pub directory_style: bool,
    /// Link to this page, relative to the site root
    pub url: String,
}

impl Page {
    /// Name of the layout this page asks for.
    pub fn layout(&self) -> Option<&str> {
        self.config.get_str("layout")
    }

    pub fn is_draft(&self) -> bool {
        self.config.get_bool("draft").unwrap_or(false)
    }

    /// The file this page is written to.
    pub fn output_path(&self) -> PathBuf {
        paths::output_path(&self.build_path, self.directory_style)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: String,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Turns file text into pages.
#[derive(Debug, Clone)]
pub struct PageParser {
    defaults: Config,
    resolver: PathResolver,
    separator: String,
}

impl PageParser {
    pub fn new(defaults: Config, resolver: PathResolver, separator: impl Into<String>) -> Self {
        Self {
            defaults,
            resolver,
            separator: separator.into(),
        }
    }

    /// Parse one file. `relative_path` must already be `/`-separated.
    pub fn parse(&self, relative_path: &str, text: &str) -> Result<Page, PageError> {
        let parsed =
            parse_front_matter(text, &self.separator).map_err(|source| PageError::FrontMatter {
                path: relative_path.to_string(),
                source,
            })?;

        let config = self.defaults.merge_with(&parsed.front_matter);
        let created_at = paths::created_at(relative_path)?;
        let name = paths::page_name(relative_path).to_string();
        let title = config
            .get_str("title")
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&name));
        let target = self.resolver.resolve(relative_path, created_at);
        let url = target.url();

        Ok(Page {
            relative_path: relative_path.to_string(),
            config,
            raw_content: parsed.content,
            created_at,
            name,
            title,
            build_path: target.build_path,
            directory_style: target.directory_style,
            url,
        })
    }
}

// =============================================================================
// Page set
// =============================================================================

/// All pages of a site, newest first.
///
/// Cloning is cheap; every clone shares the same pages.
#[derive(Debug, Clone)]
pub struct PageSet {
    pages: Arc<[Page]>,
}

impl PageSet {
    /// Sort `pages` by creation date, newest first.
    ///
    /// The sort is stable: pages with the same date keep their discovery
    /// order, and undated pages follow every dated one.
    pub fn new(mut pages: Vec<Page>) -> Self {
        // `None` orders below every `Some`, so undated pages sort last
        pages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            pages: pages.into(),
        }
    }
}

impl Deref for PageSet {
    type Target = [Page];

    fn deref(&self) -> &[Page] {
        &self.pages
    }
}
