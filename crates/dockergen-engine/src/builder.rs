use std::path::Path;

use dockergen_core::GeneratorConfig;
use futures::StreamExt;

use crate::context::{self, ContextError};
use crate::endpoint::DaemonEndpoint;
use crate::engine::{BollardEngine, BuildChunk, BuildRequest, DockerEngine};
use crate::error::EngineError;

/// Settings fixed for a whole build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Image repository, e.g. `jolokia/java-jolokia`
    pub image: String,
    /// Disable the daemon's layer cache
    pub nocache: bool,
}

/// An image that was built and tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltImage {
    pub version: String,
    /// `<repo>:<version>`
    pub image: String,
    /// Extra tags applied after the build
    pub tags: Vec<String>,
}

/// Receives progress of a build run.
pub trait BuildOutput {
    /// A version's build is about to be submitted.
    fn version_started(&mut self, version: &str) -> std::io::Result<()>;
    /// Build log text from the daemon.
    fn log(&mut self, text: &str) -> std::io::Result<()>;
    /// Error reported inside the build log.
    fn error(&mut self, message: &str) -> std::io::Result<()>;
    /// `repo:tag` now points at the freshly built image.
    fn tagged(&mut self, repo: &str, tag: &str) -> std::io::Result<()>;
}

/// Builds and tags one image per version, strictly one after another.
pub struct ImageBuilder<E: DockerEngine = BollardEngine> {
    engine: E,
    settings: BuildSettings,
}

impl ImageBuilder<BollardEngine> {
    pub fn connect(endpoint: &DaemonEndpoint, settings: BuildSettings) -> Result<Self, BuildError> {
        let engine = BollardEngine::connect(endpoint).map_err(|e| BuildError::Connect { source: e })?;
        Ok(Self::with_engine(engine, settings))
    }
}

impl<E: DockerEngine> ImageBuilder<E> {
    pub fn with_engine(engine: E, settings: BuildSettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Build every configured version from its directory under `root`.
    ///
    /// The first daemon or tag error aborts the run; images built before it
    /// are kept. Errors reported inside a build log do not abort.
    pub async fn build_all<O: BuildOutput>(
        &self,
        root: &Path,
        config: &GeneratorConfig,
        output: &mut O,
    ) -> Result<Vec<BuiltImage>, BuildError> {
        let mut built = Vec::with_capacity(config.versions.len());
        for version in &config.versions {
            built.push(self.build_version(root, config, version, output).await?);
        }
        Ok(built)
    }

    /// Build and tag a single version.
    pub async fn build_version<O: BuildOutput>(
        &self,
        root: &Path,
        config: &GeneratorConfig,
        version: &str,
        output: &mut O,
    ) -> Result<BuiltImage, BuildError> {
        output
            .version_started(version)
            .map_err(|e| BuildError::Output { source: e })?;

        let context =
            context::archive_dir(&root.join(version)).map_err(|e| BuildError::Context {
                version: version.to_owned(),
                source: e,
            })?;

        let request = BuildRequest {
            image: format!("{}:{version}", self.settings.image),
            nocache: self.settings.nocache,
            quiet: true,
            force_rm: true,
        };
        tracing::info!(
            version,
            image = %request.image,
            context_bytes = context.len(),
            nocache = request.nocache,
            "submitting build"
        );

        let mut log = self.engine.build_image(&request, context);
        while let Some(chunk) = log.next().await {
            let chunk = chunk.map_err(|e| BuildError::Build {
                image: request.image.clone(),
                source: e,
            })?;
            tracing::debug!(?chunk, "build output");
            let written = match chunk {
                BuildChunk::Stream(text) => output.log(&text),
                BuildChunk::Error(message) => output.error(&message),
                BuildChunk::Other => Ok(()),
            };
            written.map_err(|e| BuildError::Output { source: e })?;
        }
        drop(log);

        let tags = config.tags(version);
        for tag in &tags {
            self.engine
                .tag_image(&request.image, &self.settings.image, tag)
                .await
                .map_err(|e| BuildError::Tag {
                    image: request.image.clone(),
                    tag: tag.clone(),
                    source: e,
                })?;
            output
                .tagged(&self.settings.image, tag)
                .map_err(|e| BuildError::Output { source: e })?;
        }

        tracing::info!(version, image = %request.image, tags = tags.len(), "image built");
        Ok(BuiltImage {
            version: version.to_owned(),
            image: request.image,
            tags,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to connect to container daemon")]
    Connect { source: EngineError },

    #[error("failed to prepare build context for version {version}")]
    Context {
        version: String,
        source: ContextError,
    },

    #[error("build of {image} failed")]
    Build { image: String, source: EngineError },

    #[error("failed to tag {image} as {tag}")]
    Tag {
        image: String,
        tag: String,
        source: EngineError,
    },

    #[error("failed to write build output")]
    Output { source: std::io::Error },
}
