//! File writing stage.
//!
//! Writes the final HTML output to the filesystem.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that writes rendered pages to their output path, creating any
/// necessary parent directories.
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &'static str {
        "write"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let html = doc.output_html.as_ref().ok_or_else(|| {
                PipelineError::stage(
                    "write",
                    format!(
                        "page '{}' has no output HTML (was template stage run?)",
                        doc.relative_path()
                    ),
                )
            })?;

            let output_path = doc.page.output_path();

            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            std::fs::write(&output_path, html).map_err(|source| PipelineError::Io {
                path: output_path.clone(),
                source,
            })?;

            tracing::info!("{} -> {}", doc.relative_path(), output_path.display());
        }

        Ok(())
    }
}
