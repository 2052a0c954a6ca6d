use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DatasetConfig, FilterSpec, ProcessingSpec};
use crate::constants::layout::METADATA_JSON;
use crate::errors::BuildError;
use crate::types::{DatasetName, VersionId};
use crate::writer::write_file_atomic;

/// Counts gathered while a build runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Raw records pulled from the source.
    pub num_raw_examples: usize,
    /// Records that passed the filter.
    pub num_examples: usize,
    /// Shard files written.
    pub num_shards: usize,
    /// Sum of whitespace-delimited tokens over kept records.
    pub estimated_num_tokens: usize,
}

/// Summary document written once at the end of a build.
///
/// Field order is the persisted key order of `metadata.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Version label, e.g. `v1.0.0`.
    pub version: VersionId,
    /// Dataset directory name under the base directory.
    pub dataset_name: DatasetName,
    /// ISO-8601 UTC with microseconds and a trailing `Z`.
    pub created_at: String,
    /// Records read from the source.
    pub num_raw_examples: usize,
    /// Records kept after normalization and filtering.
    pub num_examples: usize,
    /// Shard files listed in the manifest.
    pub num_shards: usize,
    /// Whitespace-delimited word count over kept records.
    pub estimated_num_tokens: usize,
    /// `source` config section, verbatim.
    pub source: Value,
    /// Resolved length bounds.
    pub filters: FilterSpec,
    /// Resolved normalization options.
    pub processing: ProcessingSpec,
    /// Configured records per shard.
    pub shard_size: i64,
    /// Absolute path of the config file, when built from one.
    pub config_path: Option<PathBuf>,
}

impl VersionMetadata {
    /// Combine build counts with the echoed configuration.
    pub fn from_build(config: &DatasetConfig, stats: BuildStats, created_at: DateTime<Utc>) -> Self {
        Self {
            version: config.version.clone(),
            dataset_name: config.output.dataset_name.clone(),
            created_at: format_timestamp(created_at),
            num_raw_examples: stats.num_raw_examples,
            num_examples: stats.num_examples,
            num_shards: stats.num_shards,
            estimated_num_tokens: stats.estimated_num_tokens,
            source: config.source.clone(),
            filters: config.filters,
            processing: config.processing,
            shard_size: config.output.shard_size,
            config_path: config.config_path.clone(),
        }
    }

    /// Write `metadata.json` into `version_dir`.
    pub fn persist(&self, version_dir: &Path) -> Result<PathBuf, BuildError> {
        let path = version_dir.join(METADATA_JSON);
        write_file_atomic(&path, serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(path)
    }

    /// Read `metadata.json` from `version_dir`, failing with `NotFound` when absent.
    pub fn load(version_dir: &Path) -> Result<Self, BuildError> {
        let raw = read_metadata_file(version_dir)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Raw `metadata.json` contents, failing with `NotFound` when absent.
pub(crate) fn read_metadata_file(version_dir: &Path) -> Result<String, BuildError> {
    let path = version_dir.join(METADATA_JSON);
    if !path.is_file() {
        return Err(BuildError::NotFound { path });
    }
    fs::read_to_string(&path).map_err(BuildError::io_at(path))
}

/// `2025-02-23T10:04:05.123456Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
