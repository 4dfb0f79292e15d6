//! Default pipeline stages.
//!
//! 1. **MarkdownStage** - Render content to HTML with the format registry
//! 2. **ParallelStage** - Rewrite parallel content into variant spans
//! 3. **TemplateStage** - Compose the page with its layout and partials
//! 4. **WriteStage** - Write final HTML to the output directory

mod markdown;
mod parallel;
mod template;
mod write;

pub use markdown::MarkdownStage;
pub use parallel::ParallelStage;
pub use template::TemplateStage;
pub use write::WriteStage;
