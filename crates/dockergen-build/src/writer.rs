use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of writing one rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// File did not exist and was written
    New,
    /// File existed with different content and was overwritten
    Changed,
    /// File already held the same content; nothing written
    Unchanged,
    /// Rendered content was blank; nothing written
    Skipped,
}

impl FileStatus {
    /// Whether the file on disk was (re)written.
    pub fn wrote(self) -> bool {
        matches!(self, Self::New | Self::Changed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Changed => "CHANGED",
            Self::Unchanged => "UNCHANGED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Make sure `dir` exists and is a directory.
pub fn ensure_dir(dir: &Path) -> Result<(), WriteError> {
    if !dir.exists() {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder.create(dir).map_err(|e| WriteError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %dir.display(), "created output directory");
    }

    let meta = std::fs::metadata(dir).map_err(|e| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })?;
    if !meta.is_dir() {
        return Err(WriteError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// Write `content` to `path` unless the file already holds it.
///
/// Both sides are compared with surrounding whitespace trimmed. Written
/// files contain the trimmed content plus a single trailing newline.
pub fn write_if_changed(path: &Path, content: &str) -> Result<FileStatus, WriteError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(FileStatus::Skipped);
    }

    let status = if path.exists() {
        let existing = std::fs::read(path).map_err(|e| WriteError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if String::from_utf8_lossy(&existing).trim() == trimmed {
            return Ok(FileStatus::Unchanged);
        }
        FileStatus::Changed
    } else {
        FileStatus::New
    };

    std::fs::write(path, format!("{trimmed}\n")).map_err(|e| WriteError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(status)
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
