use bollard::image::{BuildImageOptions, TagImageOptions};
use bollard::models::BuildInfo;
use bollard::{API_DEFAULT_VERSION, Docker};
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::endpoint::DaemonEndpoint;
use crate::error::EngineError;

/// Client request timeout. Builds have no deadline of their own.
const CLIENT_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Parameters of one image build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Full image reference, `<repo>:<version>`
    pub image: String,
    pub nocache: bool,
    /// Only report the resulting image id
    pub quiet: bool,
    /// Remove intermediate containers even when the build fails
    pub force_rm: bool,
}

/// One decoded line of the daemon's build log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildChunk {
    /// `stream` text, forwarded to stdout
    Stream(String),
    /// `errorDetail` message, forwarded to stderr
    Error(String),
    /// Anything else (status, aux, progress)
    Other,
}

impl BuildChunk {
    /// Decode one daemon message. `stream` and `errorDetail` are independent
    /// fields, so a message carrying both yields a stream chunk followed by
    /// an error chunk.
    pub fn from_info(info: BuildInfo) -> Vec<Self> {
        let mut chunks = Vec::with_capacity(2);
        if let Some(stream) = info.stream {
            chunks.push(Self::Stream(stream));
        }
        let message = match info.error_detail.and_then(|detail| detail.message) {
            Some(message) => Some(message),
            None => info.error,
        };
        if let Some(message) = message {
            chunks.push(Self::Error(message));
        }
        if chunks.is_empty() {
            chunks.push(Self::Other);
        }
        chunks
    }
}

/// Build log in daemon order; ends when the build is finished.
pub type BuildStream<'a> = BoxStream<'a, Result<BuildChunk, EngineError>>;

/// Abstraction over the container daemon for testability.
///
/// Production code uses [`BollardEngine`], tests use an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait DockerEngine: Send + Sync {
    /// Submit a tar build context and stream the build log.
    fn build_image(&self, request: &BuildRequest, context: Vec<u8>) -> BuildStream<'_>;

    /// Tag an existing image as `repo:tag`, replacing any previous holder.
    async fn tag_image(&self, image: &str, repo: &str, tag: &str) -> Result<(), EngineError>;
}

/// Docker Engine API client.
pub struct BollardEngine {
    docker: Docker,
}

impl BollardEngine {
    pub fn connect(endpoint: &DaemonEndpoint) -> Result<Self, EngineError> {
        let address = endpoint.address();
        let docker = match endpoint {
            DaemonEndpoint::Socket(path) => {
                let path = path
                    .to_str()
                    .ok_or_else(|| EngineError::InvalidSocketPath(path.clone()))?;
                Docker::connect_with_socket(path, CLIENT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
            DaemonEndpoint::Tcp { tls: Some(tls), .. } => Docker::connect_with_ssl(
                &address,
                &tls.key,
                &tls.cert,
                &tls.ca,
                CLIENT_TIMEOUT_SECS,
                API_DEFAULT_VERSION,
            ),
            DaemonEndpoint::Tcp { tls: None, .. } => {
                Docker::connect_with_http(&address, CLIENT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
        }
        .map_err(|e| EngineError::Connect {
            address: address.clone(),
            source: e,
        })?;

        tracing::info!(endpoint = %endpoint, "connected to container daemon");
        Ok(Self { docker })
    }
}

impl DockerEngine for BollardEngine {
    fn build_image(&self, request: &BuildRequest, context: Vec<u8>) -> BuildStream<'_> {
        let options = BuildImageOptions {
            dockerfile: "Dockerfile".to_owned(),
            t: request.image.clone(),
            q: request.quiet,
            nocache: request.nocache,
            rm: true,
            forcerm: request.force_rm,
            ..Default::default()
        };

        self.docker
            .build_image(options, None, Some(context.into()))
            .flat_map(|item| {
                let chunks = match item {
                    Ok(info) => BuildChunk::from_info(info).into_iter().map(Ok).collect(),
                    // error lines inside an otherwise healthy build stream
                    Err(bollard::errors::Error::DockerStreamError { error }) => {
                        vec![Ok(BuildChunk::Error(error))]
                    }
                    Err(e) => vec![Err(EngineError::from(e))],
                };
                futures::stream::iter(chunks)
            })
            .boxed()
    }

    async fn tag_image(&self, image: &str, repo: &str, tag: &str) -> Result<(), EngineError> {
        let options = TagImageOptions { repo, tag };
        self.docker
            .tag_image(image, Some(options))
            .await
            .map_err(EngineError::from)
    }
}
