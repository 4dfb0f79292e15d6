//! Static asset copying.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Copy every file below `source` to the same relative path below
/// `destination`. A missing source directory copies nothing.
///
/// Returns the number of files copied.
pub fn copy_static(source: &Path, destination: &Path) -> Result<usize, AssetError> {
    if !source.is_dir() {
        tracing::debug!("no static directory at {}", source.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| AssetError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        // Entries always live below the walk root
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AssetError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                source: e,
            })?;
        }
        fs::copy(entry.path(), &target).map_err(|e| AssetError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            source: e,
        })?;
        copied += 1;
    }

    tracing::debug!(
        "copied {copied} static file(s) from {} to {}",
        source.display(),
        destination.display()
    );
    Ok(copied)
}
