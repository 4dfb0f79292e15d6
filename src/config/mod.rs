//! Configuration loading and types for belbo.
//!
//! This module handles all aspects of configuration:
//! - The dynamically-typed key/value mapping shared by the project config
//!   and page front matter, plus the typed view the builder uses (`types`)
//! - Loading the project config on top of the defaults (`load`)

mod load;
mod types;

use std::path::PathBuf;

pub use load::{CONFIG_FILE_NAME, base_path_from_config};
pub use types::{Config, DEFAULT_INDEX_FILE, SiteSettings};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),
}
