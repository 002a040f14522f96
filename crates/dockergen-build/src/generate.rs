use std::path::Path;

use dockergen_core::GeneratorConfig;

use crate::template::{TemplateError, TemplateSet};
use crate::writer::{self, FileStatus, WriteError};

/// Result for one file in a version directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file_name: String,
    pub status: FileStatus,
}

/// Result for one version directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub version: String,
    pub files: Vec<FileReport>,
}

impl VersionReport {
    /// Whether any file of this version was written.
    pub fn changed(&self) -> bool {
        self.files.iter().any(|f| f.status.wrote())
    }
}

/// Render and write every configured version under `root`, in config order.
///
/// Each version gets its own directory `root/<version>`. The first error
/// stops the run; versions already written stay on disk.
pub fn generate(
    root: &Path,
    templates: &TemplateSet,
    config: &GeneratorConfig,
) -> Result<Vec<VersionReport>, GenerateError> {
    config
        .versions
        .iter()
        .map(|version| generate_version(root, templates, config, version))
        .collect()
}

/// Render and write a single version.
pub fn generate_version(
    root: &Path,
    templates: &TemplateSet,
    config: &GeneratorConfig,
    version: &str,
) -> Result<VersionReport, GenerateError> {
    let rendered =
        templates
            .render_version(config, version)
            .map_err(|e| GenerateError::Render {
                version: version.to_owned(),
                source: e,
            })?;

    let dir = root.join(version);
    writer::ensure_dir(&dir).map_err(|e| GenerateError::Write {
        version: version.to_owned(),
        source: e,
    })?;

    let mut files = Vec::with_capacity(rendered.len());
    for file in rendered {
        let status = writer::write_if_changed(&dir.join(&file.file_name), &file.content)
            .map_err(|e| GenerateError::Write {
                version: version.to_owned(),
                source: e,
            })?;
        tracing::debug!(version, file = %file.file_name, %status, "processed template");
        files.push(FileReport {
            file_name: file.file_name,
            status,
        });
    }

    Ok(VersionReport {
        version: version.to_owned(),
        files,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to render templates for version {version}")]
    Render {
        version: String,
        source: TemplateError,
    },
    #[error("failed to write files for version {version}")]
    Write { version: String, source: WriteError },
}
