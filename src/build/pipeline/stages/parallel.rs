//! Parallel content stage.

use crate::build::parallel;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that turns `@{first||second}@` snippets in the rendered HTML into
/// one tagged `<span>` per variant.
///
/// Runs after the markdown stage so that code blocks are already
/// `<code>` elements and are left alone.
pub struct ParallelStage;

impl Stage for ParallelStage {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            doc.content = parallel::rewrite(&doc.content);
        }

        Ok(())
    }
}
