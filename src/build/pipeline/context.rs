//! Pipeline context for sharing state across stages.

use pulldown_cmark::Options;

use crate::build::format::{FormatContext, FormatRegistry};
use crate::build::markdown::{MarkdownError, markdown_options};
use crate::build::render::{Composer, PageInfo};

/// Shared, read-only context for pipeline stages.
pub struct PipelineContext<'a> {
    /// Every page of the site, in site order, as templates see them
    pub pages: &'a [PageInfo<'a>],

    /// Content format registry for rendering different file types
    pub formats: &'a FormatRegistry,

    /// Template composer
    pub composer: &'a Composer,

    /// pulldown-cmark options for markdown content
    pub markdown_options: Options,
}

impl<'a> PipelineContext<'a> {
    /// Create a new pipeline context.
    ///
    /// Fails when a markdown extension name is unknown.
    pub fn new(
        pages: &'a [PageInfo<'a>],
        formats: &'a FormatRegistry,
        composer: &'a Composer,
        markdown_extensions: &[String],
    ) -> Result<Self, MarkdownError> {
        Ok(Self {
            pages,
            formats,
            composer,
            markdown_options: markdown_options(markdown_extensions)?,
        })
    }

    pub fn format_context(&self) -> FormatContext {
        FormatContext {
            markdown_options: self.markdown_options,
        }
    }
}
