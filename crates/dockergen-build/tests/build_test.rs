use std::path::Path;

use dockergen_build::{FileStatus, TEMPLATES_DIR, TemplateSet, VersionReport, generate};
use dockergen_core::{CONFIG_FILE, GeneratorConfig};
use tempfile::TempDir;

/// Lay out a project with `config.json` and the given templates.
fn init_project(dir: &Path, config: &str, templates: &[(&str, &str)]) {
    std::fs::write(dir.join(CONFIG_FILE), config).unwrap();
    let templates_dir = dir.join(TEMPLATES_DIR);
    std::fs::create_dir_all(&templates_dir).unwrap();
    for (name, body) in templates {
        std::fs::write(templates_dir.join(name), body).unwrap();
    }
}

fn run(dir: &Path) -> Vec<VersionReport> {
    let config = GeneratorConfig::load(&dir.join(CONFIG_FILE)).unwrap();
    let templates = TemplateSet::load(&dir.join(TEMPLATES_DIR)).unwrap();
    generate(dir, &templates, &config).unwrap()
}

fn status_of(report: &VersionReport, file: &str) -> FileStatus {
    report
        .files
        .iter()
        .find(|f| f.file_name == file)
        .map(|f| f.status)
        .unwrap_or_else(|| panic!("no report for {file}"))
}

// ── End-to-end Generation Tests ──

#[test]
fn generates_one_directory_per_version() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["7", "8"] }"#,
        &[("Dockerfile", "FROM base:{{=it.version}}")],
    );

    let reports = run(tmp.path());

    assert_eq!(reports.len(), 2);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("7/Dockerfile")).unwrap(),
        "FROM base:7\n"
    );
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("8/Dockerfile")).unwrap(),
        "FROM base:8\n"
    );
    assert!(reports.iter().all(VersionReport::changed));
    assert_eq!(status_of(&reports[0], "Dockerfile"), FileStatus::New);
}

#[test]
fn rerun_without_changes_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["7", "8"] }"#,
        &[("Dockerfile", "FROM base:{{=it.version}}")],
    );
    run(tmp.path());
    let path = tmp.path().join("7/Dockerfile");
    let mtime_before = std::fs::metadata(&path).unwrap().modified().unwrap();

    let reports = run(tmp.path());

    assert!(reports.iter().all(|r| !r.changed()));
    assert_eq!(status_of(&reports[0], "Dockerfile"), FileStatus::Unchanged);
    assert_eq!(status_of(&reports[1], "Dockerfile"), FileStatus::Unchanged);
    let mtime_after = std::fs::metadata(&path).unwrap().modified().unwrap();
    assert_eq!(mtime_before, mtime_after);
}

#[test]
fn changing_one_version_only_touches_that_version() {
    let tmp = TempDir::new().unwrap();
    let template = [("Dockerfile", "FROM java:{{= it.config.jdk }}")];
    init_project(
        tmp.path(),
        r#"{ "versions": ["7", "8"],
             "config": { "7": { "jdk": "7u79" }, "8": { "jdk": "8u60" } } }"#,
        &template,
    );
    run(tmp.path());

    init_project(
        tmp.path(),
        r#"{ "versions": ["7", "8"],
             "config": { "7": { "jdk": "7u79" }, "8": { "jdk": "8u66" } } }"#,
        &template,
    );
    let reports = run(tmp.path());

    assert_eq!(status_of(&reports[0], "Dockerfile"), FileStatus::Unchanged);
    assert_eq!(status_of(&reports[1], "Dockerfile"), FileStatus::Changed);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("7/Dockerfile")).unwrap(),
        "FROM java:7u79\n"
    );
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("8/Dockerfile")).unwrap(),
        "FROM java:8u66\n"
    );
}

#[test]
fn blank_render_is_skipped_and_not_written() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["1"], "config": { "default": { "agent": false } } }"#,
        &[
            ("Dockerfile", "FROM x"),
            ("agent.properties", "{% if it.config.agent %}port=8778{% endif %}\n"),
        ],
    );

    let reports = run(tmp.path());

    assert_eq!(status_of(&reports[0], "agent.properties"), FileStatus::Skipped);
    assert!(!tmp.path().join("1/agent.properties").exists());
    assert!(tmp.path().join("1/Dockerfile").exists());
}

#[test]
fn unmapped_template_creates_no_file_and_no_error() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["1"] }"#,
        &[("Dockerfile", "FROM x"), ("__startup.sh", "echo hi")],
    );

    let reports = run(tmp.path());

    assert_eq!(reports[0].files.len(), 1);
    let entries: Vec<_> = std::fs::read_dir(tmp.path().join("1"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["Dockerfile"]);
}

#[test]
fn empty_mapping_skips_template() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["1"],
             "config": { "1": { "mappings": { "__run.sh": "" } } } }"#,
        &[("Dockerfile", "FROM x"), ("__run.sh", "echo hi")],
    );

    let reports = run(tmp.path());

    assert_eq!(reports[0].files.len(), 1);
    assert_eq!(status_of(&reports[0], "Dockerfile"), FileStatus::New);
    let entries: Vec<_> = std::fs::read_dir(tmp.path().join("1"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["Dockerfile"]);
}

#[test]
fn mapped_template_is_written_under_mapped_name() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["tomcat", "jetty"],
             "config": {
               "default": { "mappings": { "__startup.sh": "start.sh" } },
               "tomcat": { "mappings": { "__startup.sh": "catalina.sh" } }
             } }"#,
        &[("__startup.sh", "echo {{= it.version }}")],
    );

    run(tmp.path());

    assert_eq!(
        std::fs::read_to_string(tmp.path().join("tomcat/catalina.sh")).unwrap(),
        "echo tomcat\n"
    );
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("jetty/start.sh")).unwrap(),
        "echo jetty\n"
    );
}

#[test]
fn file_in_place_of_version_directory_fails() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["7"] }"#,
        &[("Dockerfile", "FROM x")],
    );
    std::fs::write(tmp.path().join("7"), "oops").unwrap();

    let config = GeneratorConfig::load(&tmp.path().join(CONFIG_FILE)).unwrap();
    let templates = TemplateSet::load(&tmp.path().join(TEMPLATES_DIR)).unwrap();
    let err = generate(tmp.path(), &templates, &config).unwrap_err();

    assert!(err.to_string().contains("version 7"), "got: {err}");
}

#[test]
fn empty_config_generates_nothing() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join(TEMPLATES_DIR)).unwrap();
    std::fs::write(tmp.path().join(TEMPLATES_DIR).join("Dockerfile"), "FROM x").unwrap();

    let reports = run(tmp.path());

    assert!(reports.is_empty());
}

// ── Template Loading Tests ──

#[test]
fn templates_load_sorted_and_skip_directories() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(TEMPLATES_DIR);
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    std::fs::write(dir.join("run.sh"), "a").unwrap();
    std::fs::write(dir.join("Dockerfile"), "b").unwrap();
    std::fs::write(dir.join("__jolokia.properties"), "c").unwrap();

    let templates = TemplateSet::load(&dir).unwrap();

    assert_eq!(
        templates.names(),
        ["Dockerfile", "__jolokia.properties", "run.sh"]
    );
}

#[test]
fn missing_templates_directory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = TemplateSet::load(&tmp.path().join(TEMPLATES_DIR));

    let err = result.err().expect("load should fail").to_string();
    assert!(err.contains("templates directory"), "got: {err}");
}

#[test]
fn render_error_aborts_generation() {
    let tmp = TempDir::new().unwrap();
    init_project(
        tmp.path(),
        r#"{ "versions": ["1"] }"#,
        &[("Dockerfile", "{{= it.version | no_such_filter }}")],
    );

    let config = GeneratorConfig::load(&tmp.path().join(CONFIG_FILE)).unwrap();
    let result = TemplateSet::load(&tmp.path().join(TEMPLATES_DIR))
        .map_err(|e| e.to_string())
        .and_then(|t| generate(tmp.path(), &t, &config).map_err(|e| e.to_string()));

    assert!(result.is_err());
    assert!(!tmp.path().join("1/Dockerfile").exists());
}
