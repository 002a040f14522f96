//! Template rendering and file generation for dockergen.
//!
//! # Generation pipeline
//!
//! ```text
//! dockergen
//!   1. Templates ── templates/* compiled once (TemplateSet::load)
//!   2. Render    ── per version, context `it` = config + version + merged settings
//!   3. Write     ── <version>/<file>, only when the trimmed content differs
//! ```
//!
//! # Mapping-required templates
//!
//! Templates named `__*` have no fixed output name. The version's
//! `mappings` table (or the `default` bucket's table when the version has
//! none) names the file to write; without an entry the template is skipped.

pub mod generate;
pub mod template;
pub mod writer;

pub use generate::{FileReport, GenerateError, VersionReport, generate};
pub use template::{RenderedFile, TEMPLATES_DIR, TemplateError, TemplateSet};
pub use writer::FileStatus;
