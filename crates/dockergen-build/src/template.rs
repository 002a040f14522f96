use std::path::{Path, PathBuf};

use dockergen_core::GeneratorConfig;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

/// Directory holding the templates, relative to the project root.
pub const TEMPLATES_DIR: &str = "templates";

/// A template rendered for one version, not yet written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Template the content came from
    pub template: String,
    /// File name inside the version directory
    pub file_name: String,
    /// Rendered content, untrimmed
    pub content: String,
}

/// All templates of a project, compiled once and rendered per version.
///
/// Expressions use `{{= ... }}` and the context is reachable as `it`, so a
/// Dockerfile line reads `FROM base:{{= it.version }}`. Blocks keep the
/// usual `{% ... %}` form. Plain `{{ ... }}` is left alone, which keeps Go
/// templates in `docker inspect --format` lines intact.
pub struct TemplateSet {
    env: Environment<'static>,
    names: Vec<String>,
}

impl TemplateSet {
    /// Create an empty set with the generator syntax configured.
    pub fn new() -> Result<Self, TemplateError> {
        let syntax = SyntaxConfig::builder()
            .block_delimiters("{%", "%}")
            .variable_delimiters("{{=", "}}")
            .comment_delimiters("{#", "#}")
            .build()
            .map_err(|e| TemplateError::Syntax { source: e })?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        Ok(Self {
            env,
            names: Vec::new(),
        })
    }

    /// Load and compile every regular file in `dir`, ordered by file name.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let entries = std::fs::read_dir(dir).map_err(|e| TemplateError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TemplateError::ReadDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "skipping non-file in templates directory");
                continue;
            }
            let name = entry
                .file_name()
                .into_string()
                .map_err(|raw| TemplateError::InvalidName(PathBuf::from(raw)))?;
            files.push((name, path));
        }
        files.sort();

        let mut set = Self::new()?;
        for (name, path) in files {
            let source = std::fs::read_to_string(&path)
                .map_err(|e| TemplateError::Read { path, source: e })?;
            set.add(name, source)?;
        }

        tracing::debug!(dir = %dir.display(), templates = set.names.len(), "templates loaded");
        Ok(set)
    }

    /// Compile a template from source and add it to the set.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|e| TemplateError::Compile {
                name: name.clone(),
                source: e,
            })?;
        self.names.push(name);
        Ok(())
    }

    /// Template names, in rendering order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render every template for one version.
    ///
    /// Mapping-required templates without a mapping for this version are
    /// left out of the result. Nothing touches the filesystem.
    pub fn render_version(
        &self,
        config: &GeneratorConfig,
        version: &str,
    ) -> Result<Vec<RenderedFile>, TemplateError> {
        let it = minijinja::Value::from_serialize(config.render_context(version));
        let ctx = minijinja::context! { it => it };

        let mut rendered = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let Some(file_name) = config.output_name(version, name) else {
                tracing::debug!(template = %name, version, "no mapping, skipping template");
                continue;
            };

            let content = self
                .env
                .get_template(name)
                .and_then(|t| t.render(&ctx))
                .map_err(|e| TemplateError::Render {
                    name: name.clone(),
                    version: version.to_owned(),
                    source: e,
                })?;

            rendered.push(RenderedFile {
                template: name.clone(),
                file_name,
                content,
            });
        }
        Ok(rendered)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid template syntax configuration")]
    Syntax { source: minijinja::Error },
    #[error("failed to read templates directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read template {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template file name is not valid UTF-8: {0}")]
    InvalidName(PathBuf),
    #[error("failed to compile template '{name}'")]
    Compile {
        name: String,
        source: minijinja::Error,
    },
    #[error("failed to render template '{name}' for version {version}")]
    Render {
        name: String,
        version: String,
        source: minijinja::Error,
    },
}
