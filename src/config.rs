use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::layout::SHARDS_DIR;
use crate::constants::records::{DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};
use crate::errors::BuildError;
use crate::source::SourceSpec;
use crate::types::{DatasetName, VersionId};

/// Inclusive character-count bounds applied to normalized text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Minimum normalized length in chars (inclusive).
    pub min_chars: usize,
    /// Maximum normalized length in chars (inclusive).
    pub max_chars: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Text cleaning switches applied before filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSpec {
    /// Trim every line and drop the ones left empty.
    pub strip_empty_lines: bool,
    /// Collapse all whitespace runs (newlines included) into single spaces.
    pub normalize_whitespace: bool,
}

impl Default for ProcessingSpec {
    fn default() -> Self {
        Self {
            strip_empty_lines: true,
            normalize_whitespace: true,
        }
    }
}

/// Where and how a version is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Root directory holding every dataset.
    pub base_dir: PathBuf,
    /// Dataset directory name under `base_dir`.
    pub dataset_name: DatasetName,
    /// Records per shard file. Must be positive.
    pub shard_size: i64,
}

/// Top-level build configuration, usually loaded from YAML.
///
/// ```yaml
/// version: v1.0.0
/// source:
///   kind: jsonl
///   path: corpus/wiki.jsonl
/// filters:
///   min_chars: 200
/// processing:
///   normalize_whitespace: true
/// output:
///   base_dir: data/versions
///   dataset_name: demo-wikitext
///   shard_size: 10000
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Version identifier; names the version directory.
    pub version: VersionId,
    /// Raw source description, echoed verbatim into metadata.
    pub source: Value,
    /// Length bounds for kept records.
    #[serde(default)]
    pub filters: FilterSpec,
    /// Cleaning switches.
    #[serde(default)]
    pub processing: ProcessingSpec,
    /// Output location and shard size.
    pub output: OutputSpec,
    /// Absolute path of the file this config was loaded from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl DatasetConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(raw: &str) -> Result<Self, BuildError> {
        let config: DatasetConfig = serde_yaml::from_str(raw)
            .map_err(|err| BuildError::Configuration(format!("invalid dataset config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse, and validate a YAML config file, recording its absolute path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(BuildError::io_at(path))?;
        let mut config = Self::from_yaml_str(&raw).map_err(|err| match err {
            BuildError::Configuration(msg) => {
                BuildError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        config.config_path = Some(std::path::absolute(path).map_err(BuildError::io_at(path))?);
        Ok(config)
    }

    /// Check every constraint the build relies on before any output is produced.
    pub fn validate(&self) -> Result<(), BuildError> {
        require_component("version", &self.version)?;
        require_component("output.dataset_name", &self.output.dataset_name)?;
        if self.output.base_dir.as_os_str().is_empty() {
            return Err(BuildError::Configuration(
                "output.base_dir must not be empty".into(),
            ));
        }
        if self.output.shard_size <= 0 {
            return Err(BuildError::Configuration(format!(
                "output.shard_size must be positive, got {}",
                self.output.shard_size
            )));
        }
        if self.filters.min_chars > self.filters.max_chars {
            return Err(BuildError::Configuration(format!(
                "filters.min_chars ({}) exceeds filters.max_chars ({})",
                self.filters.min_chars, self.filters.max_chars
            )));
        }
        if !self.source.is_object() {
            return Err(BuildError::Configuration(
                "source must be a mapping".into(),
            ));
        }
        self.source_spec()?;
        Ok(())
    }

    /// Typed view of the `source` section.
    pub fn source_spec(&self) -> Result<SourceSpec, BuildError> {
        SourceSpec::from_value(&self.source)
    }

    /// Validated shard size.
    pub fn shard_size(&self) -> Result<usize, BuildError> {
        usize::try_from(self.output.shard_size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                BuildError::Configuration(format!(
                    "output.shard_size must be positive, got {}",
                    self.output.shard_size
                ))
            })
    }

    /// `<base_dir>/<dataset_name>/<version>`.
    pub fn version_dir(&self) -> PathBuf {
        self.output
            .base_dir
            .join(&self.output.dataset_name)
            .join(&self.version)
    }

    /// `<base_dir>/<dataset_name>/<version>/shards`.
    pub fn shards_dir(&self) -> PathBuf {
        self.version_dir().join(SHARDS_DIR)
    }
}

fn require_component(key: &str, value: &str) -> Result<(), BuildError> {
    if value.trim().is_empty() {
        return Err(BuildError::Configuration(format!("{key} must not be empty")));
    }
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(BuildError::Configuration(format!(
            "{key} must be a single path component, got '{value}'"
        ))),
    }
}
