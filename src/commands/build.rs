use std::path::{Path, PathBuf};

use crate::build::Builder;
use crate::config::{Config, base_path_from_config};

/// What the caller needs after a build.
pub struct BuiltSite {
    pub output_dir: PathBuf,
    /// Serve the output after a bare invocation
    pub local_server: bool,
}

pub fn run(config_file: Option<&Path>) -> Result<BuiltSite, anyhow::Error> {
    let (config, config_path) = Config::load_from_arg(config_file)?;
    let base_path = base_path_from_config(&config_path);

    let builder = Builder::new(config, &base_path);
    let result = builder.build()?;

    for page in &result.rendered {
        tracing::debug!(
            "{} ({} bytes) -> {} at {}",
            page.relative_path,
            page.html.len(),
            page.output_path.display(),
            page.url
        );
    }
    tracing::info!(
        "built site to {} ({} pages, {} static files)",
        result.output_dir.display(),
        result.pages,
        result.static_files
    );

    Ok(BuiltSite {
        output_dir: result.output_dir,
        local_server: builder.settings().local_server,
    })
}
