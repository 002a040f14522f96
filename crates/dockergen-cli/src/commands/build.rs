use std::io::{Stderr, Stdout, Write};
use std::path::Path;

use console::style;
use dockergen_core::GeneratorConfig;
use dockergen_engine::{
    BuildOutput, BuildSettings, ConnectionOptions, DaemonEndpoint, ImageBuilder,
};

pub struct BuildArgs {
    pub connection: ConnectionOptions,
    pub image: Option<String>,
    pub nocache: bool,
}

/// Build and tag the image of every generated version.
pub async fn build(
    project_dir: &Path,
    config: &GeneratorConfig,
    args: BuildArgs,
) -> anyhow::Result<()> {
    println!();
    println!();
    println!("{}", style("Building Images").cyan());
    println!();

    let image = super::require_image(args.image.as_deref(), config)?;
    let endpoint = DaemonEndpoint::resolve(&args.connection)?;
    let builder = ImageBuilder::connect(
        &endpoint,
        BuildSettings {
            image,
            nocache: args.nocache,
        },
    )?;

    let mut output = ConsoleOutput {
        stdout: std::io::stdout(),
        stderr: std::io::stderr(),
    };
    let built = builder.build_all(project_dir, config, &mut output).await?;

    tracing::info!(images = built.len(), "all images built");
    Ok(())
}

/// Build log on stdout, log errors on stderr.
struct ConsoleOutput {
    stdout: Stdout,
    stderr: Stderr,
}

impl BuildOutput for ConsoleOutput {
    fn version_started(&mut self, version: &str) -> std::io::Result<()> {
        writeln!(self.stdout, "{}", style(version).magenta())
    }

    fn log(&mut self, text: &str) -> std::io::Result<()> {
        self.stdout.write_all(text.as_bytes())?;
        self.stdout.flush()
    }

    fn error(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.stderr, "{}", style("++++++++ ERROR +++++++++++").red())?;
        writeln!(self.stderr, "{message}")
    }

    fn tagged(&mut self, repo: &str, tag: &str) -> std::io::Result<()> {
        writeln!(self.stdout, "tagged {repo}:{tag}")
    }
}
