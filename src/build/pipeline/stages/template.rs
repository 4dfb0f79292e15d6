//! Page template rendering stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that composes each page with its layout and the partials.
///
/// The content HTML becomes the layout's `content` block; the page, every
/// other page and the page config are available to the templates. After
/// this stage, `doc.output_html` contains the complete HTML page.
pub struct TemplateStage;

impl Stage for TemplateStage {
    fn name(&self) -> &'static str {
        "template"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let html = ctx.composer.compose(doc.page, ctx.pages, &doc.content)?;
            doc.output_html = Some(html);
        }

        Ok(())
    }
}
