use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.json";

/// Settings bucket whose values apply to every version.
pub const DEFAULT_BUCKET: &str = "default";

/// Templates whose name starts with this prefix only produce a file when a
/// `mappings` entry names the output file.
pub const MAPPING_PREFIX: &str = "__";

/// config.json configuration
///
/// ```json
/// {
///   // versions to generate, in build order
///   "versions": ["7", "8"],
///   "config": {
///     "default": { "mappings": { "__run.sh": "run.sh" } },
///     "8": { "tags": ["latest"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Versions to generate, in the order they are built
    #[serde(default)]
    pub versions: Vec<String>,
    /// Settings per version, plus the `default` bucket
    #[serde(default)]
    pub config: BTreeMap<String, VersionSettings>,
    /// Image repository used when building (e.g. `jolokia/java-jolokia`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Any other top-level keys, passed through to templates untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free-form settings for one version (or the default bucket).
///
/// `tags` and `mappings` have a fixed meaning; every other key is only
/// visible to templates as `it.config.<key>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionSettings(pub Map<String, Value>);

impl VersionSettings {
    /// Extra image tags applied after a successful build.
    pub fn tags(&self) -> Vec<String> {
        self.0
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            // arch-lint: allow(no-silent-result-drop) reason="a bucket without tags has no extra tags"
            .unwrap_or_default()
    }

    /// Template name to output file name table, if this bucket has one.
    pub fn mappings(&self) -> Option<&Map<String, Value>> {
        self.0.get("mappings").and_then(Value::as_object)
    }

    /// Shallow merge: keys from `over` replace keys from `self`.
    pub fn merged_with(&self, over: &VersionSettings) -> VersionSettings {
        let mut merged = self.0.clone();
        for (key, value) in &over.0 {
            merged.insert(key.clone(), value.clone());
        }
        VersionSettings(merged)
    }

    fn validate(&self, bucket: &str) -> crate::Result<()> {
        if let Some(tags) = self.0.get("tags") {
            let valid = tags
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !valid {
                return Err(crate::Error::InvalidSetting {
                    bucket: bucket.to_owned(),
                    key: "tags",
                    expected: "an array of strings",
                });
            }
        }

        if let Some(mappings) = self.0.get("mappings") {
            let valid = mappings
                .as_object()
                .is_some_and(|table| table.values().all(Value::is_string));
            if !valid {
                return Err(crate::Error::InvalidSetting {
                    bucket: bucket.to_owned(),
                    key: "mappings",
                    expected: "an object of template name to file name",
                });
            }
        }

        Ok(())
    }
}

impl GeneratorConfig {
    /// Load from the given file, or return an empty config if it does not exist.
    ///
    /// `//` and `/* */` comments are stripped before parsing.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using empty config");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| crate::Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        for (bucket, settings) in &config.config {
            settings.validate(bucket)?;
        }

        tracing::debug!(
            path = %path.display(),
            versions = config.versions.len(),
            "config loaded"
        );
        Ok(config)
    }

    fn parse(content: &str) -> serde_json::Result<Self> {
        let stripped = json_comments::StripComments::new(content.as_bytes());
        serde_json::from_reader(stripped)
    }

    /// The version's own settings, without defaults applied.
    pub fn settings(&self, version: &str) -> Option<&VersionSettings> {
        self.config.get(version)
    }

    /// Default settings overlaid with the version's own settings.
    pub fn merged_settings(&self, version: &str) -> VersionSettings {
        match (self.config.get(DEFAULT_BUCKET), self.config.get(version)) {
            (Some(defaults), Some(own)) => defaults.merged_with(own),
            (Some(defaults), None) => defaults.clone(),
            (None, Some(own)) => own.clone(),
            (None, None) => VersionSettings::default(),
        }
    }

    /// Tags configured for this version only; default-bucket tags are never used.
    pub fn tags(&self, version: &str) -> Vec<String> {
        self.settings(version)
            .map(VersionSettings::tags)
            // arch-lint: allow(no-silent-result-drop) reason="a version without its own settings has no extra tags"
            .unwrap_or_default()
    }

    /// Mapping table for a version: its own table if present, else the default one.
    pub fn mappings(&self, version: &str) -> Option<&Map<String, Value>> {
        self.settings(version)
            .and_then(VersionSettings::mappings)
            .or_else(|| {
                self.settings(DEFAULT_BUCKET)
                    .and_then(VersionSettings::mappings)
            })
    }

    /// Output file name for a template, or `None` when a mapping-required
    /// template has no mapping for this version. An empty mapping counts as
    /// no mapping.
    pub fn output_name(&self, version: &str, template: &str) -> Option<String> {
        if !template.starts_with(MAPPING_PREFIX) {
            return Some(template.to_owned());
        }
        self.mappings(version)?
            .get(template)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
    }

    /// Template context for one version, exposed to templates as `it`.
    ///
    /// The whole config is visible, with `config` replaced by the merged
    /// settings of this version and `version` set to its name.
    pub fn render_context(&self, version: &str) -> Value {
        let mut it = self.extra.clone();
        it.insert(
            "versions".to_owned(),
            Value::from(self.versions.clone()),
        );
        if let Some(image) = &self.image {
            it.insert("image".to_owned(), Value::String(image.clone()));
        }
        it.insert(
            "config".to_owned(),
            Value::Object(self.merged_settings(version).0),
        );
        it.insert("version".to_owned(), Value::String(version.to_owned()));
        Value::Object(it)
    }
}
