//! Source/destination path resolution
//!
//! The trailing marker on the source path decides where the data lands on the
//! destination hosts, mirroring rsync's conventions:
//!
//! - `/a/b/*` syncs the directory contents into `/a/b/` on the destination
//!   (the glob is expanded by the remote shell),
//! - `/a/b/` likewise syncs into `/a/b/`,
//! - a plain directory `/a/b` is placed into its parent `/a`,
//! - a plain file `/a/b.txt` keeps its full path.
//!
//! Marker detection happens on the raw string before the path is made
//! absolute - normalization would silently strip a trailing slash and lose
//! the contents-vs-item distinction.

use crate::errors::SyncError;

/// Resolved rsync argument strings for one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    /// Argument passed to rsync as the source (may end in `/*`)
    pub source: String,
    /// Destination path used on every target host
    pub dest: String,
}

fn absolutize(path: &str) -> anyhow::Result<std::path::PathBuf> {
    let path = std::path::Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

async fn require_dir(path: &std::path::Path) -> Result<(), SyncError> {
    match tokio::fs::metadata(path).await {
        Ok(md) if md.is_dir() => Ok(()),
        _ => Err(SyncError::SourcePathInvalid {
            path: path.display().to_string(),
        }),
    }
}

/// Resolve the raw source path argument into the source and destination
/// strings handed to the copy primitive.
pub async fn resolve_sync_paths(raw: &str) -> anyhow::Result<SyncPaths> {
    let raw = raw.trim();
    if let Some(base) = raw.strip_suffix("/*") {
        // contents sync via glob: destination is the directory itself
        let base = absolutize(base)?;
        require_dir(&base).await?;
        return Ok(SyncPaths {
            source: format!("{}/*", base.display()),
            dest: format!("{}/", base.display()),
        });
    }
    if let Some(base) = raw.strip_suffix('/') {
        // contents sync: rsync source without the slash, destination with it
        let base = absolutize(base)?;
        require_dir(&base).await?;
        return Ok(SyncPaths {
            source: base.display().to_string(),
            dest: format!("{}/", base.display()),
        });
    }
    let path = absolutize(raw)?;
    let md = tokio::fs::metadata(&path)
        .await
        .map_err(|_| SyncError::SourcePathInvalid {
            path: path.display().to_string(),
        })?;
    if md.is_dir() {
        // the directory itself is placed into the destination's parent
        let parent = path.parent().ok_or_else(|| SyncError::SourcePathInvalid {
            path: path.display().to_string(),
        })?;
        Ok(SyncPaths {
            source: path.display().to_string(),
            dest: parent.display().to_string(),
        })
    } else if md.is_file() {
        Ok(SyncPaths {
            source: path.display().to_string(),
            dest: path.display().to_string(),
        })
    } else {
        Err(SyncError::SourcePathInvalid {
            path: path.display().to_string(),
        }
        .into())
    }
}
