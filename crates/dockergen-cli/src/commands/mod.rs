mod build;
mod generate;

use dockergen_core::GeneratorConfig;

pub use build::{BuildArgs, build};
pub use generate::generate;

/// Image repository from the command line, else from config.json.
pub(crate) fn require_image(
    cli_image: Option<&str>,
    config: &GeneratorConfig,
) -> anyhow::Result<String> {
    cli_image
        .or(config.image.as_deref())
        .filter(|image| !image.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            anyhow::anyhow!("image name not set; pass --image or set \"image\" in config.json")
        })
}
