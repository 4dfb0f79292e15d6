//! Configuration loading from files.
//!
//! The project config is layered with the `config` crate: built-in defaults
//! first, then `.belbo.toml` when it exists.

use std::path::{Path, PathBuf};

use super::types::{
    DEFAULT_BUILD_DIR, DEFAULT_CONTENT_DIR, DEFAULT_FRONTMATTER_SEP, DEFAULT_INDEX_FILE,
    DEFAULT_MARKDOWN_EXTENSIONS, DEFAULT_STATIC_DIR, DEFAULT_TEMPLATES_DIR,
};
use super::{Config, ConfigError};

/// Name of the project config file.
pub const CONFIG_FILE_NAME: &str = ".belbo.toml";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

fn with_defaults() -> Result<Builder, ConfigError> {
    Ok(config::Config::builder()
        .set_default("root_path", ".")?
        .set_default("content_dir", vec![DEFAULT_CONTENT_DIR])?
        .set_default("templates_dir", DEFAULT_TEMPLATES_DIR)?
        .set_default("build_dir", DEFAULT_BUILD_DIR)?
        .set_default("static_dir", DEFAULT_STATIC_DIR)?
        .set_default("frontmatter_sep", DEFAULT_FRONTMATTER_SEP)?
        .set_default("index_file", DEFAULT_INDEX_FILE)?
        .set_default("partials", Vec::<String>::new())?
        .set_default("markdown_extensions", DEFAULT_MARKDOWN_EXTENSIONS.to_vec())?
        .set_default("local_server", true)?)
}

impl Config {
    /// The built-in defaults with no project file applied.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(with_defaults()?.build()?.try_deserialize::<Config>()?)
    }

    /// Load the config from the command line argument, defaulting to
    /// `.belbo.toml` in the current directory.
    ///
    /// Returns the config together with the absolute path it was looked up at.
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(CONFIG_FILE_NAME));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        let config = Self::load_from_file(&config_file)?;
        Ok((config, config_file))
    }

    /// Load the config from a file path, falling back to the defaults when
    /// the file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        if !path.exists() {
            tracing::warn!(
                "could not find a config file at {}, using default values",
                path.display()
            );
        }

        Ok(with_defaults()?
            .add_source(config::File::new(path_str, config::FileFormat::Toml).required(false))
            .build()?
            .try_deserialize::<Config>()?)
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
