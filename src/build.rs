mod assets;
mod builder;
pub mod format;
mod front_matter;
pub mod functions;
mod markdown;
mod page;
mod parallel;
mod paths;
pub mod pipeline;
mod render;

pub use builder::{BuildError, BuildResult, Builder, RenderedPage};
