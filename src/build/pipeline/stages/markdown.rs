//! Content rendering stage.
//!
//! Renders page content to HTML using the format that matches the file
//! extension (Markdown, HTML).

use std::path::Path;

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that renders content to HTML using the format registry.
///
/// Named "markdown" although HTML pages go through it as well.
pub struct MarkdownStage;

impl Stage for MarkdownStage {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let format_ctx = ctx.format_context();

        for doc in docs {
            let path = Path::new(doc.relative_path());
            let format = ctx.formats.for_path(path).ok_or_else(|| {
                PipelineError::stage(
                    "markdown",
                    format!(
                        "no format registered for extension: {}",
                        path.extension()
                            .and_then(|e| e.to_str())
                            .unwrap_or("(none)")
                    ),
                )
            })?;

            doc.content = format.render(&doc.content, &format_ctx);
        }

        Ok(())
    }
}
