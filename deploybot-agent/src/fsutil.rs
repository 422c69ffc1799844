//! Filesystem helpers used by task execution and the host endpoints

use deploybot_core::domain::host::DiskInfo;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes `content` to `path`, creating parent directories and truncating
/// any existing file
pub async fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Creates `path` and its parents if missing
pub async fn ensure_directory(path: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

/// Removes a directory tree, succeeding when it does not exist
pub async fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Packs the tree under `dir` into an in-memory tar archive, paths relative
/// to `dir`
pub async fn archive_dir(dir: &Path) -> io::Result<Vec<u8>> {
    let dir: PathBuf = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut builder = tar::Builder::new(Vec::new());
        builder.follow_symlinks(false);
        builder.append_dir_all(".", &dir)?;
        builder.into_inner()
    })
    .await
    .map_err(io::Error::other)?
}

/// Reports total and available space of the filesystem holding `path`
pub fn disk_info(path: &Path) -> io::Result<DiskInfo> {
    Ok(DiskInfo {
        total_size: fs2::total_space(path)?,
        avail_size: fs2::available_space(path)?,
        path: path.display().to_string(),
    })
}
