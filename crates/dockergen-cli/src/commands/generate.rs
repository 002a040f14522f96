use std::path::Path;

use console::style;
use dockergen_build::generate::generate_version;
use dockergen_build::{FileStatus, TEMPLATES_DIR, TemplateSet, VersionReport};
use dockergen_core::GeneratorConfig;

/// Render every version directory and report what changed.
pub fn generate(project_dir: &Path, config: &GeneratorConfig) -> anyhow::Result<()> {
    println!("{}", style("Creating Automated Builds").cyan());
    println!();

    let templates = TemplateSet::load(&project_dir.join(TEMPLATES_DIR))?;

    for version in &config.versions {
        println!("{}", style(version).green());
        let report = generate_version(project_dir, &templates, config, version)?;
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &VersionReport) {
    for file in &report.files {
        let label = match file.status {
            FileStatus::New => style(file.status.label()).yellow(),
            FileStatus::Changed => style(file.status.label()).green(),
            FileStatus::Skipped => style(file.status.label()).dim(),
            FileStatus::Unchanged => continue,
        };
        println!("       {}: {label}", file.file_name);
    }
    if !report.changed() {
        println!("       {}", style("UNCHANGED").yellow());
    }
}
