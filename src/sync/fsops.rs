// src/sync/fsops.rs

//! Async filesystem primitives used by the builder and the propagation
//! executor: existence check, recursive clobber copy, tolerant recursive
//! delete. All of them are plain `tokio::fs` compositions; nothing here knows
//! about mirror groups.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

/// Non-blocking existence check.
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Recursively copy `from` over `to` with clobber semantics: existing files
/// are overwritten, missing parent directories are created, extra files
/// already present under `to` are left alone (whole-file copies, not a
/// tree diff).
pub async fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::metadata(from).await?;

    if meta.is_dir() {
        fs::create_dir_all(to).await?;
        let mut entries = fs::read_dir(from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let src = entry.path();
            let dst = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                Box::pin(copy_recursive(&src, &dst)).await?;
            } else {
                fs::copy(&src, &dst).await?;
            }
        }
    } else {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(from, to).await?;
    }

    Ok(())
}

/// Recursively delete whatever is at `path`. Removing a path that does not
/// exist is not an error.
pub async fn remove(path: &Path) -> io::Result<()> {
    debug!(path = %path.display(), "removing path");

    let meta = match fs::metadata(path).await {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
