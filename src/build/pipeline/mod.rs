//! Build pipeline for page processing.
//!
//! The pipeline transforms pages through a series of stages:
//! 1. Content rendering (markdown to HTML, HTML passes through)
//! 2. Parallel content (`@{a||b}@` to tagged spans)
//! 3. Template composition (layout, partials and content)
//! 4. File writing (output to disk)
//!
//! A build runs the first three as the render pipeline and only writes once
//! every page rendered, so a failing page leaves the previous output alone.

mod context;
mod document;
mod error;
mod stages;

pub use context::PipelineContext;
pub use document::ProcessingDocument;
pub use error::PipelineError;

use stages::{MarkdownStage, ParallelStage, TemplateStage, WriteStage};

/// A stage in the page processing pipeline.
///
/// Stages transform documents sequentially. Each stage receives all documents
/// and can modify them in place before passing to the next stage.
pub trait Stage: Send + Sync {
    /// Unique name for this stage (used in logs and errors).
    fn name(&self) -> &'static str;

    /// Process documents through this stage.
    ///
    /// The context is shared and read-only: the page set, the format
    /// registry and the composer do not change during a build.
    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// The page processing pipeline.
///
/// Stages run in insertion order, each over every document.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Stages that produce each page's final HTML without touching disk.
    pub fn render_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(MarkdownStage)
            .add_stage(ParallelStage)
            .add_stage(TemplateStage);
        pipeline
    }

    /// Writes rendered pages to their output paths.
    pub fn write_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(WriteStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run the pipeline on a set of documents.
    pub fn run(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            tracing::debug!("running stage '{}' on {} page(s)", stage.name(), docs.len());
            stage.process(docs, ctx)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::format::FormatRegistry;
    use crate::build::functions::FunctionRegistry;
    use crate::build::page::{Page, PageParser, PageSet};
    use crate::build::paths::PathResolver;
    use crate::build::render::{Composer, PageInfo};
    use crate::config::Config;

    fn page_set(out: &std::path::Path, files: &[(&str, &str)]) -> PageSet {
        let parser = PageParser::new(
            Config::new(),
            PathResolver::new(out.to_string_lossy()),
            "---",
        );
        PageSet::new(
            files
                .iter()
                .map(|(path, text)| parser.parse(path, text).unwrap())
                .collect(),
        )
    }

    fn run(pipeline: &Pipeline, pages: &PageSet) -> Vec<String> {
        let infos: Vec<PageInfo> = pages.iter().map(PageInfo::from).collect();
        let formats = FormatRegistry::with_defaults();
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::load(dir.path(), &[], FunctionRegistry::new()).unwrap();
        let ctx = PipelineContext::new(&infos, &formats, &composer, &[]).unwrap();

        let mut docs: Vec<ProcessingDocument> =
            pages.iter().map(ProcessingDocument::new).collect();
        pipeline.run(&mut docs, &ctx).unwrap();

        docs.into_iter()
            .map(|d| d.output_html.unwrap_or(d.content))
            .collect()
    }

    struct Shout;

    impl Stage for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn process(
            &self,
            docs: &mut [ProcessingDocument],
            _ctx: &PipelineContext,
        ) -> Result<(), PipelineError> {
            for doc in docs {
                doc.content = doc.content.to_uppercase();
            }
            Ok(())
        }
    }

    #[test]
    fn test_render_pipeline_does_not_write() {
        let out = tempfile::tempdir().unwrap();
        let pages = page_set(
            out.path(),
            &[
                ("posts/2020-09-03-hello.md", "Hello @{there||here}@!"),
                ("about.html", "<code>@{a||b}@</code>"),
            ],
        );

        let output = run(&Pipeline::render_pipeline(), &pages);

        assert_eq!(
            output,
            vec![
                "<p>Hello <span class=\"belbo_v1-s1\">there</span><span class=\"belbo_v2-s1\">here</span>!</p>\n",
                "<code>@{a||b}@</code>",
            ]
        );
        // nothing was written
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_writes_pages() {
        let out = tempfile::tempdir().unwrap();
        let pages = page_set(
            out.path(),
            &[("index.md", "# Home"), ("about.md", "About")],
        );

        let mut pipeline = Pipeline::render_pipeline();
        pipeline.add_stage(WriteStage);
        run(&pipeline, &pages);

        assert_eq!(
            std::fs::read_to_string(out.path().join("index.html")).unwrap(),
            "<h1>Home</h1>\n"
        );
        assert_eq!(
            std::fs::read_to_string(out.path().join("about/index.html")).unwrap(),
            "<p>About</p>\n"
        );
    }

    #[test]
    fn test_stage_sees_custom_order() {
        let out = tempfile::tempdir().unwrap();
        let pages = page_set(out.path(), &[("about.md", "hi")]);

        let mut pipeline = Pipeline::new();
        pipeline.add_stage(MarkdownStage).add_stage(Shout);

        let page: &Page = &pages[0];
        assert_eq!(page.raw_content, "hi");
        assert_eq!(run(&pipeline, &pages), vec!["<P>HI</P>\n"]);
    }
}
