use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Plain-HTTP daemon port.
pub const DEFAULT_PORT: u16 = 2375;
/// Daemon port that implies TLS.
pub const TLS_PORT: u16 = 2376;
pub const DEFAULT_HOST: &str = "localhost";

/// Connection flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cert_path: Option<PathBuf>,
}

/// Client certificate material for a TLS daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsMaterial {
    /// `ca.pem`, `cert.pem` and `key.pem` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ca: dir.join("ca.pem"),
            cert: dir.join("cert.pem"),
            key: dir.join("key.pem"),
        }
    }
}

/// Where the container daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonEndpoint {
    Socket(PathBuf),
    Tcp {
        host: String,
        port: u16,
        tls: Option<TlsMaterial>,
    },
}

impl DaemonEndpoint {
    /// Resolve from options and the process environment.
    pub fn resolve(options: &ConnectionOptions) -> Result<Self, EndpointError> {
        Self::resolve_with(options, |key| std::env::var_os(key))
    }

    /// Resolve from options, reading environment variables through `env`.
    ///
    /// Priority:
    /// 1. `--host` (with `--port`, default 2375)
    /// 2. `DOCKER_HOST`: `tcp://host[:port]`, anything else is a socket path
    /// 3. `localhost:2375`
    ///
    /// A TCP endpoint on port 2376 uses TLS with material from `--cert-path`,
    /// `DOCKER_CERT_PATH` or `$HOME/.docker`, in that order.
    pub fn resolve_with<F>(options: &ConnectionOptions, env: F) -> Result<Self, EndpointError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        // set-but-empty variables count as unset
        let env = |key: &str| env(key).filter(|value| !value.is_empty());

        let (host, port) = if let Some(host) = &options.host {
            if host.is_empty() {
                return Err(EndpointError::EmptyHost);
            }
            let port = options
                .port
                // arch-lint: allow(no-silent-result-drop) reason="--port without a value means the plain daemon port"
                .unwrap_or(DEFAULT_PORT);
            (host.clone(), port)
        } else if let Some(docker_host) = env("DOCKER_HOST") {
            match docker_host.to_str().and_then(strip_tcp_scheme) {
                Some(rest) => split_host_port(rest)?,
                None => return Ok(Self::Socket(socket_path(docker_host))),
            }
        } else {
            (DEFAULT_HOST.to_owned(), DEFAULT_PORT)
        };

        let tls = if port == TLS_PORT {
            Some(TlsMaterial::in_dir(&cert_dir(options, &env)?))
        } else {
            None
        };

        Ok(Self::Tcp { host, port, tls })
    }

    /// Address in the form the client library expects.
    pub fn address(&self) -> String {
        match self {
            Self::Socket(path) => format!("unix://{}", path.display()),
            Self::Tcp { host, port, .. } => format!("tcp://{host}:{port}"),
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tcp { tls: Some(_), .. })
    }
}

impl fmt::Display for DaemonEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket(path) => write!(f, "{}", path.display()),
            Self::Tcp { host, port, tls } => {
                let scheme = if tls.is_some() { "https" } else { "http" };
                write!(f, "{scheme}://{host}:{port}")
            }
        }
    }
}

fn strip_tcp_scheme(value: &str) -> Option<&str> {
    const SCHEME: &str = "tcp://";
    value
        .get(..SCHEME.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(SCHEME))
        .map(|_| &value[SCHEME.len()..])
}

fn split_host_port(rest: &str) -> Result<(String, u16), EndpointError> {
    let rest = rest.trim_end_matches('/');
    let (host, port) = match rest.rsplit_once(':') {
        // a bare IPv6 literal without brackets has no port
        Some((host, port)) if !host.ends_with(':') && !port.contains(']') => {
            let port = port
                .parse::<u16>()
                .map_err(|e| EndpointError::InvalidPort {
                    value: port.to_owned(),
                    source: e,
                })?;
            (host, port)
        }
        _ => (rest, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(EndpointError::EmptyHost);
    }
    Ok((host.to_owned(), port))
}

fn socket_path(value: OsString) -> PathBuf {
    match value.to_str().and_then(|s| s.strip_prefix("unix://")) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(value),
    }
}

fn cert_dir<F>(options: &ConnectionOptions, env: &F) -> Result<PathBuf, EndpointError>
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(path) = &options.cert_path {
        return Ok(path.clone());
    }
    if let Some(path) = env("DOCKER_CERT_PATH") {
        return Ok(PathBuf::from(path));
    }
    env("HOME")
        .map(|home| PathBuf::from(home).join(".docker"))
        .ok_or(EndpointError::NoCertPath)
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("daemon host is empty")]
    EmptyHost,

    #[error("invalid daemon port '{value}'")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("TLS port selected but no certificate path: set --cert-path, DOCKER_CERT_PATH or HOME")]
    NoCertPath,
}
