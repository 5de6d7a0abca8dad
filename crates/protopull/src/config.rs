//! Configuration for protopull.
//!
//! Built-in defaults mirror TensorFlow Serving's public API protos: the
//! `tensorflow` and `tensorflow_serving` repositories at tag `r2.8`, seeded
//! from `tensorflow_serving/apis/*.proto`. A `protopull.toml` in the current
//! directory (or the file given with `--config`) overrides them, and
//! command-line flags override the file.
//!
//! Example protopull.toml:
//! ```toml
//! tag = "r2.11"
//! destination = "proto"
//! external_roots = ["google", "validate"]
//!
//! [seeds]
//! source = "tensorflow_serving"
//! pattern = "tensorflow_serving/apis/*.proto"
//!
//! [[sources]]
//! name = "tensorflow"
//! git = "https://github.com/tensorflow/tensorflow.git"
//!
//! [[sources]]
//! name = "tensorflow_serving"
//! path = "/mnt/serving"        # use an existing tree instead of cloning
//! layout = "nested"
//! ```
//!
//! Top-level keys that are absent keep their defaults. A `[[sources]]` list,
//! when present, replaces the default list entirely. Relative paths are
//! relative to the current directory.

use protopull_closure::{DEFAULT_EXTERNAL_ROOTS, RootLayout};
use protopull_fetch::SourceSpec;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "protopull.toml";
pub const DEFAULT_TAG: &str = "r2.8";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How a source's import paths map onto its checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutConfig {
    #[default]
    Nested,
    Flat,
}

impl From<LayoutConfig> for RootLayout {
    fn from(layout: LayoutConfig) -> Self {
        match layout {
            LayoutConfig::Nested => RootLayout::Nested,
            LayoutConfig::Flat => RootLayout::Flat,
        }
    }
}

/// One source tree. Exactly one of `git` or `path` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Root name: the leading import segment this tree owns.
    pub name: String,
    pub git: Option<String>,
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl SourceConfig {
    fn git(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            git: Some(url.to_string()),
            path: None,
            layout: LayoutConfig::Nested,
        }
    }

    /// The acquisition request for this source.
    pub fn spec(&self) -> Result<SourceSpec, ConfigError> {
        match (&self.git, &self.path) {
            (Some(url), None) => Ok(SourceSpec::git(&self.name, url)),
            (None, Some(path)) => Ok(SourceSpec::local(&self.name, path)),
            _ => Err(ConfigError::Invalid(format!(
                "source `{}` must set exactly one of `git` or `path`",
                self.name
            ))),
        }
    }
}

/// Which files start the closure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Source tree searched for seeds.
    pub source: String,
    /// Glob matched against paths relative to that tree, at any depth.
    pub pattern: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            source: "tensorflow_serving".to_string(),
            pattern: "tensorflow_serving/apis/*.proto".to_string(),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtopullConfig {
    /// Version tag cloned for every git source.
    pub tag: String,
    /// Scratch directory holding git checkouts.
    pub working_dir: PathBuf,
    /// Flattened output directory.
    pub destination: PathBuf,
    /// Import namespaces satisfied by the protobuf toolchain itself.
    pub external_roots: Vec<String>,
    pub seeds: SeedConfig,
    pub sources: Vec<SourceConfig>,
}

impl Default for ProtopullConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            working_dir: PathBuf::from(".protos_working_dir"),
            destination: PathBuf::from("src/main/protos"),
            external_roots: DEFAULT_EXTERNAL_ROOTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            seeds: SeedConfig::default(),
            sources: vec![
                SourceConfig::git("tensorflow", "https://github.com/tensorflow/tensorflow.git"),
                SourceConfig::git(
                    "tensorflow_serving",
                    "https://github.com/tensorflow/serving.git",
                ),
            ],
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tag: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub destination: Option<PathBuf>,
}

impl ProtopullConfig {
    /// Load configuration without validating it.
    ///
    /// An explicit path must exist. Otherwise `protopull.toml` in `cwd` is
    /// used when present, and the built-in defaults when not. Validate after
    /// applying [`Overrides`], so a flag can replace a bad file value.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_toml(&content, &path)
    }

    /// Parse TOML text. `origin` is only used in messages.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(tag) = overrides.tag {
            self.tag = tag;
        }
        if let Some(dir) = overrides.working_dir {
            self.working_dir = dir;
        }
        if let Some(dest) = overrides.destination {
            self.destination = dest;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::Invalid("`tag` must not be empty".into()));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("at least one source is required".into()));
        }

        let mut names = BTreeSet::new();
        for source in &self.sources {
            if source.name.is_empty() || source.name.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "source name `{}` must be a single non-empty path segment",
                    source.name
                )));
            }
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "source `{}` is defined more than once",
                    source.name
                )));
            }
            source.spec()?;
            if self.external_roots.iter().any(|r| r == &source.name) {
                return Err(ConfigError::Invalid(format!(
                    "source `{}` is also listed in `external_roots`",
                    source.name
                )));
            }
        }

        if !names.contains(self.seeds.source.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "seed source `{}` is not one of the configured sources",
                self.seeds.source
            )));
        }
        if self.seeds.pattern.trim().is_empty() {
            return Err(ConfigError::Invalid("seed `pattern` must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<ProtopullConfig, ConfigError> {
        let config = ProtopullConfig::from_toml(text, Path::new("protopull.toml"))?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_match_tensorflow_serving_setup() {
        let config = ProtopullConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tag, "r2.8");
        assert_eq!(config.external_roots, vec!["google"]);
        assert_eq!(config.seeds.source, "tensorflow_serving");
        let names: Vec<_> = config.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["tensorflow", "tensorflow_serving"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse("tag = \"r2.11\"\n").unwrap();
        assert_eq!(config.tag, "r2.11");
        assert_eq!(config.destination, PathBuf::from("src/main/protos"));
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_sources_replace_defaults() {
        let config = parse(
            r#"
[seeds]
source = "api"
pattern = "api/*.proto"

[[sources]]
name = "api"
path = "/mnt/api"
layout = "flat"
"#,
        )
        .unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].layout, LayoutConfig::Flat);
        assert_eq!(
            config.sources[0].spec().unwrap(),
            SourceSpec::local("api", "/mnt/api")
        );
    }

    #[test]
    fn test_source_needs_exactly_one_origin() {
        let both = parse(
            r#"
[seeds]
source = "a"
[[sources]]
name = "a"
git = "https://example.invalid/a.git"
path = "/a"
"#,
        );
        assert!(matches!(both, Err(ConfigError::Invalid(_))));

        let neither = parse(
            r#"
[seeds]
source = "a"
[[sources]]
name = "a"
"#,
        );
        assert!(matches!(neither, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_spec_without_origin_is_error() {
        let source = SourceConfig {
            name: "a".into(),
            git: None,
            path: None,
            layout: LayoutConfig::Nested,
        };
        assert!(matches!(source.spec(), Err(ConfigError::Invalid(_))));
        let git = SourceConfig::git("a", "https://example.invalid/a.git");
        assert_eq!(
            git.spec().unwrap(),
            SourceSpec::git("a", "https://example.invalid/a.git")
        );
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let err = parse(
            r#"
[[sources]]
name = "tensorflow_serving"
path = "/a"
[[sources]]
name = "tensorflow_serving"
path = "/b"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_seed_source_must_exist() {
        let err = parse(
            r#"
[seeds]
source = "nope"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_source_cannot_be_external() {
        let err = parse("external_roots = [\"google\", \"tensorflow\"]\n").unwrap_err();
        assert!(err.to_string().contains("external_roots"));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = parse("tagg = \"r2.8\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let config = ProtopullConfig::default().apply(Overrides {
            tag: Some("r2.14".into()),
            working_dir: None,
            destination: Some(PathBuf::from("out")),
        });
        assert_eq!(config.tag, "r2.14");
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.working_dir, PathBuf::from(".protos_working_dir"));
    }

    #[test]
    fn test_load_project_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "tag = \"v9\"\n").unwrap();
        let config = ProtopullConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.tag, "v9");
    }

    #[test]
    fn test_override_repairs_file_value() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "tag = \"\"\n").unwrap();

        let loaded = ProtopullConfig::load(None, dir.path()).unwrap();
        assert!(matches!(loaded.validate(), Err(ConfigError::Invalid(_))));

        let config = loaded.apply(Overrides {
            tag: Some("r2.8".into()),
            ..Overrides::default()
        });
        config.validate().unwrap();
        assert_eq!(config.tag, "r2.8");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ProtopullConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, ProtopullConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("custom.toml");
        let err = ProtopullConfig::load(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
