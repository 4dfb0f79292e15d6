use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{Config, SiteSettings};

use super::assets::{AssetError, copy_static};
use super::format::FormatRegistry;
use super::functions::FunctionRegistry;
use super::markdown::MarkdownError;
use super::page::{PageError, PageParser, PageSet};
use super::paths::PathResolver;
use super::pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingDocument};
use super::render::{Composer, PageInfo, RenderError};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to walk {}: {source}", .path.display())]
    Discover {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to prepare output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "refusing to clear output directory {}: it contains {}",
        .path.display(),
        .contains.display()
    )]
    UnsafeOutputDir { path: PathBuf, contains: PathBuf },

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Assets(#[from] AssetError),
}

/// A page after the pipeline ran.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub relative_path: String,
    pub url: String,
    pub output_path: PathBuf,
    pub html: String,
}

impl From<ProcessingDocument<'_>> for RenderedPage {
    fn from(doc: ProcessingDocument<'_>) -> Self {
        Self {
            relative_path: doc.page.relative_path.clone(),
            url: doc.page.url.clone(),
            output_path: doc.page.output_path(),
            html: doc.output_html.unwrap_or(doc.content),
        }
    }
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub pages: usize,
    pub static_files: usize,
    pub rendered: Vec<RenderedPage>,
}

pub struct Builder {
    /// Project config, the base every page config is merged onto
    config: Config,
    settings: SiteSettings,
    formats: FormatRegistry,
    functions: FunctionRegistry,
}

impl Builder {
    /// `base_path` is the directory the config file lives in.
    pub fn new(config: Config, base_path: &Path) -> Self {
        let settings = SiteSettings::from_config(&config, base_path);
        Self {
            config,
            settings,
            formats: FormatRegistry::with_defaults(),
            functions: FunctionRegistry::with_builtins(),
        }
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Full build: load and render every page, then replace the output
    /// directory with the result and copy the static files.
    ///
    /// Nothing in the output directory changes until every page rendered,
    /// and a project without pages leaves it alone.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let output_dir = &self.settings.build_dir;

        let pages = self.load_pages()?;
        if pages.is_empty() {
            tracing::warn!(
                "no pages found, leaving {} untouched",
                output_dir.display()
            );
            return Ok(BuildResult {
                output_dir: output_dir.clone(),
                pages: 0,
                static_files: 0,
                rendered: Vec::new(),
            });
        }
        tracing::info!("found {} page(s)", pages.len());

        let composer = Composer::load(
            &self.settings.templates_dir,
            &self.settings.partials,
            self.functions.clone(),
        )?;
        let infos: Vec<PageInfo> = pages.iter().map(PageInfo::from).collect();
        let ctx = PipelineContext::new(
            &infos,
            &self.formats,
            &composer,
            &self.settings.markdown_extensions,
        )?;

        let mut docs: Vec<ProcessingDocument> =
            pages.iter().map(ProcessingDocument::new).collect();
        Pipeline::render_pipeline().run(&mut docs, &ctx)?;

        self.reset_output_dir()?;
        Pipeline::write_pipeline().run(&mut docs, &ctx)?;
        let rendered: Vec<RenderedPage> = docs.into_iter().map(RenderedPage::from).collect();

        let static_files = copy_static(
            &self.settings.static_source(),
            &self.settings.static_destination(),
        )?;

        tracing::info!(
            "wrote {} page(s) and {} static file(s) to {}",
            rendered.len(),
            static_files,
            output_dir.display()
        );

        Ok(BuildResult {
            output_dir: output_dir.clone(),
            pages: pages.len(),
            static_files,
            rendered,
        })
    }

    /// Discover, parse and sort the pages. Drafts are left out.
    pub fn load_pages(&self) -> Result<PageSet, BuildError> {
        let root = &self.settings.root_path;
        let parser = PageParser::new(
            self.config.clone(),
            PathResolver::from_settings(&self.settings),
            self.settings.frontmatter_sep.as_str(),
        );

        let files = discover_content(root, &self.settings.content_dirs, |path| {
            self.formats.is_content(path)
        })?;

        let mut pages = Vec::with_capacity(files.len());
        for path in files {
            let relative = relative_path(root, &path);
            let bytes = fs::read(&path).map_err(|source| BuildError::Read {
                path: path.clone(),
                source,
            })?;
            // invalid UTF-8 becomes U+FFFD instead of failing the build
            let text = String::from_utf8_lossy(&bytes);

            let page = parser.parse(&relative, &text)?;
            if page.is_draft() {
                tracing::info!("skipping draft {relative}");
                continue;
            }

            tracing::debug!("loaded {relative} -> {}", page.url);
            pages.push(page);
        }

        Ok(PageSet::new(pages))
    }

    /// Remove the output directory and create it empty.
    ///
    /// Refuses when the output directory holds the project root, a content
    /// directory, the templates or the static files. Paths are compared
    /// canonicalized, so `..` and symlinks are resolved first.
    fn reset_output_dir(&self) -> Result<(), BuildError> {
        let output_dir = &self.settings.build_dir;
        let output_error = |source| BuildError::OutputDir {
            path: output_dir.clone(),
            source,
        };

        fs::create_dir_all(output_dir).map_err(output_error)?;
        let output = output_dir.canonicalize().map_err(output_error)?;

        let sources = [
            self.settings.root_path.clone(),
            self.settings.templates_dir.clone(),
            self.settings.static_source(),
        ]
        .into_iter()
        .chain(self.settings.content_dirs.iter().cloned());

        for source in sources {
            // a source that does not exist has nothing to lose
            let Ok(canonical) = source.canonicalize() else {
                continue;
            };
            if canonical.starts_with(&output) {
                return Err(BuildError::UnsafeOutputDir {
                    path: output_dir.clone(),
                    contains: source,
                });
            }
        }

        tracing::debug!("removing {}", output_dir.display());
        fs::remove_dir_all(output_dir).map_err(output_error)?;
        fs::create_dir_all(output_dir).map_err(output_error)
    }
}

/// Walk `root` in lexical order and collect the content files.
///
/// Only files directly in the root or directly in one of `content_dirs` are
/// taken. Directories that are neither a content directory nor lead to one
/// are skipped whole, as are hidden entries.
pub fn discover_content(
    root: &Path,
    content_dirs: &[PathBuf],
    is_content: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, BuildError> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if entry.file_name().to_string_lossy().starts_with('.') {
                return false;
            }
            if entry.file_type().is_dir() {
                let keep = content_dirs.iter().any(|dir| dir.starts_with(entry.path()));
                if !keep {
                    tracing::debug!("skipping directory {}", entry.path().display());
                }
                return keep;
            }
            true
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| BuildError::Discover {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let parent = entry.path().parent();
        let placed = parent == Some(root)
            || content_dirs.iter().any(|dir| parent == Some(dir.as_path()));
        if placed && is_content(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// `path` relative to `root`, `/`-separated.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
