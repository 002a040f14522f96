use std::path::{Path, PathBuf};

/// Pack the contents of `dir` into an in-memory tar build context.
///
/// Entries are relative to `dir`, the same layout `tar -c .` run inside
/// the directory produces.
pub fn archive_dir(dir: &Path) -> Result<Vec<u8>, ContextError> {
    if !dir.is_dir() {
        return Err(ContextError::MissingDir(dir.to_path_buf()));
    }

    let mut archive = tar::Builder::new(Vec::new());
    archive.follow_symlinks(true);
    archive
        .append_dir_all(".", dir)
        .map_err(|e| ContextError::Archive {
            path: dir.to_path_buf(),
            source: e,
        })?;
    let bytes = archive.into_inner().map_err(|e| ContextError::Archive {
        path: dir.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(dir = %dir.display(), bytes = bytes.len(), "build context archived");
    Ok(bytes)
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("build directory {0} does not exist; generate it first")]
    MissingDir(PathBuf),
    #[error("failed to archive build context {path}")]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },
}
