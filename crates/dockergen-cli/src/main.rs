mod commands;

use std::path::PathBuf;

use clap::Parser;
use dockergen_core::{CONFIG_FILE, GeneratorConfig};
use dockergen_engine::ConnectionOptions;

/// Creates per-version Dockerfiles ("automated builds") from the files in
/// templates/, driven by config.json. With --build the images are built and
/// tagged as well, one version after another.
#[derive(Parser)]
#[command(
    name = "dockergen",
    about = "Generator for Docker builds across multiple versions"
)]
#[command(version)]
struct Cli {
    /// Build image(s) after generating
    #[arg(short, long)]
    build: bool,

    /// Docker hostname (default: DOCKER_HOST, then localhost)
    #[arg(short = 'd', long)]
    host: Option<String>,

    /// Docker port, used with --host (default: 2375)
    #[arg(short, long)]
    port: Option<u16>,

    /// Don't use the cache when building images
    #[arg(short, long)]
    nocache: bool,

    /// Directory holding ca.pem, cert.pem and key.pem for TLS on port 2376
    #[arg(long, value_name = "DIR")]
    cert_path: Option<PathBuf>,

    /// Image repository to build into (overrides "image" in config.json)
    #[arg(long)]
    image: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="unset or unparsable RUST_LOG falls back to the --verbose level"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let project_dir = PathBuf::from(".");
    let config = GeneratorConfig::load(&project_dir.join(CONFIG_FILE))?;

    commands::generate(&project_dir, &config)?;

    if cli.build {
        let args = commands::BuildArgs {
            connection: ConnectionOptions {
                host: cli.host,
                port: cli.port,
                cert_path: cli.cert_path,
            },
            image: cli.image,
            nocache: cli.nocache,
        };
        commands::build(&project_dir, &config, args).await?;
    }

    Ok(())
}
