//! Document types for pipeline processing.

use crate::build::page::Page;

/// A page being processed through the pipeline.
///
/// 1. Initially: `content` = the page's raw content
/// 2. After markdown: `content` = HTML fragment
/// 3. After parallel: `content` = HTML with variant spans
/// 4. After template: `output_html` = final page HTML
#[derive(Debug)]
pub struct ProcessingDocument<'a> {
    /// The page being rendered
    pub page: &'a Page,

    /// Content being processed.
    pub content: String,

    /// Final HTML output after template rendering.
    ///
    /// None until the template stage populates it.
    pub output_html: Option<String>,
}

impl<'a> ProcessingDocument<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            content: page.raw_content.clone(),
            output_html: None,
        }
    }

    /// Path of the source file, for diagnostics.
    pub fn relative_path(&self) -> &str {
        &self.page.relative_path
    }
}
