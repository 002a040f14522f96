//! Container daemon access and sequential image builds for dockergen.
//!
//! # Build run
//!
//! ```text
//! dockergen --build
//!   for each version, in config order:
//!     1. Context ── tar of <version>/ (context::archive_dir)
//!     2. Build   ── POST /build, t=<image>:<version>, forcerm, q, nocache
//!     3. Log     ── `stream` lines to stdout, `errorDetail` to stderr
//!     4. Tag     ── <image>:<tag> for each tag of the version
//! ```
//!
//! A failed build or tag call ends the run. Nothing is retried.

pub mod builder;
pub mod context;
pub mod endpoint;
pub mod engine;
pub mod error;

pub use builder::{BuildError, BuildOutput, BuildSettings, BuiltImage, ImageBuilder};
pub use endpoint::{ConnectionOptions, DaemonEndpoint, EndpointError, TlsMaterial};
pub use engine::{BollardEngine, BuildChunk, BuildRequest, BuildStream, DockerEngine};
pub use error::EngineError;
