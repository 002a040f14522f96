use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to connect to container daemon at {address}")]
    Connect {
        address: String,
        source: bollard::errors::Error,
    },

    #[error("socket path is not valid UTF-8: {0}")]
    InvalidSocketPath(PathBuf),

    #[error("container daemon returned {status}: {message}")]
    Daemon { status: u16, message: String },

    #[error("container daemon request failed")]
    Api { source: bollard::errors::Error },
}

impl From<bollard::errors::Error> for EngineError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => Self::Daemon {
                status: status_code,
                message,
            },
            other => Self::Api { source: other },
        }
    }
}
