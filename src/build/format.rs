//! Pluggable content format system.
//!
//! This module provides a registry of content formats that convert a page's
//! raw content to HTML. Markdown is converted with pulldown-cmark; HTML files
//! pass through untouched. The registry also decides which files count as
//! content when the builder walks the project.
//!
//! # Adding a New Format
//!
//! ```ignore
//! struct TextFormat;
//!
//! impl ContentFormat for TextFormat {
//!     fn name(&self) -> &'static str { "text" }
//!     fn extensions(&self) -> &[&'static str] { &["txt"] }
//!     fn render(&self, content: &str, ctx: &FormatContext) -> String {
//!         format!("<pre>{content}</pre>")
//!     }
//! }
//!
//! registry.register(TextFormat);
//! ```

use std::path::Path;

use pulldown_cmark::Options;

use crate::build::markdown::render_markdown;

/// Context available during format rendering.
pub struct FormatContext {
    /// pulldown-cmark options for markdown content.
    pub markdown_options: Options,
}

/// A content format that can render files to HTML.
pub trait ContentFormat: Send + Sync {
    /// The name of this format (e.g., "markdown", "html").
    fn name(&self) -> &'static str;

    /// File extensions this format handles (lowercase, without dot).
    fn extensions(&self) -> &[&'static str];

    /// Render content to HTML.
    fn render(&self, content: &str, ctx: &FormatContext) -> String;
}

/// Markdown format implementation.
pub struct MarkdownFormat;

impl ContentFormat for MarkdownFormat {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extensions(&self) -> &[&'static str] {
        &["md", "markdown"]
    }

    fn render(&self, content: &str, ctx: &FormatContext) -> String {
        render_markdown(content, ctx.markdown_options)
    }
}

/// HTML pages are already HTML.
pub struct HtmlFormat;

impl ContentFormat for HtmlFormat {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &[&'static str] {
        &["html", "htm"]
    }

    fn render(&self, content: &str, _ctx: &FormatContext) -> String {
        content.to_string()
    }
}

/// Registry of content formats.
///
/// The registry determines which format to use based on file extension
/// and provides access to format implementations for rendering.
pub struct FormatRegistry {
    formats: Vec<Box<dyn ContentFormat>>,
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Create a registry with the default formats (Markdown, HTML).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MarkdownFormat);
        registry.register(HtmlFormat);
        registry
    }

    /// Register a new format.
    ///
    /// Later registrations take precedence for overlapping extensions.
    pub fn register<F: ContentFormat + 'static>(&mut self, format: F) {
        self.formats.push(Box::new(format));
    }

    /// Find the format for a file extension.
    pub fn for_extension(&self, ext: &str) -> Option<&dyn ContentFormat> {
        let ext_lower = ext.to_lowercase();
        // Search in reverse so later registrations take precedence
        self.formats
            .iter()
            .rev()
            .find(|f| f.extensions().iter().any(|e| *e == ext_lower))
            .map(|f| f.as_ref())
    }

    /// Find the format for a file path based on its extension.
    pub fn for_path(&self, path: &Path) -> Option<&dyn ContentFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.for_extension(ext))
    }

    /// Check if a path is a page (has a registered format).
    pub fn is_content(&self, path: &Path) -> bool {
        self.for_path(path).is_some()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
