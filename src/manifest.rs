//! Ordered shard descriptors for one dataset version.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::layout::{MANIFEST_JSON, MANIFEST_TXT, SHARD_EXTENSION, SHARD_PREFIX};
use crate::errors::BuildError;
use crate::hash::sha256_file;
use crate::types::{ContentHash, ShardFileName};
use crate::writer::{ShardWrite, write_file_atomic};

/// Shard file name for a zero-based shard index, e.g. `part-00042.jsonl`.
pub fn shard_file_name(index: usize) -> ShardFileName {
    format!("{SHARD_PREFIX}{index:05}.{SHARD_EXTENSION}")
}

/// Persisted description of one written shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Shard file name relative to `shards/`.
    #[serde(rename = "file")]
    pub file_name: ShardFileName,
    /// SHA-256 of the shard's exact bytes.
    #[serde(rename = "sha256")]
    pub content_hash: ContentHash,
    /// Records stored in the shard.
    #[serde(rename = "num_records")]
    pub record_count: usize,
}

impl ManifestEntry {
    /// Entry for a shard just written under `file_name`.
    pub fn new(file_name: impl Into<ShardFileName>, write: &ShardWrite) -> Self {
        Self {
            file_name: file_name.into(),
            content_hash: write.content_hash.clone(),
            record_count: write.record_count,
        }
    }

    /// `<file> sha256=<hash> num_records=<count>`
    pub fn text_line(&self) -> String {
        format!(
            "{} sha256={} num_records={}",
            self.file_name, self.content_hash, self.record_count
        )
    }

    /// Re-hash the shard under `shards_dir` and compare with the stored digest.
    pub fn verify(&self, shards_dir: &Path) -> Result<bool, BuildError> {
        let actual = sha256_file(&shards_dir.join(&self.file_name))?;
        Ok(actual == self.content_hash)
    }
}

/// Paths written by [`ManifestBuilder::persist`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestPaths {
    /// `manifest.txt`.
    pub text: PathBuf,
    /// `manifest.json`.
    pub json: PathBuf,
}

/// Accumulates entries in shard-write order and renders both manifest forms
/// from the same entry list.
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder {
    entries: Vec<ManifestEntry>,
}

impl ManifestBuilder {
    /// Empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the entry for the next shard.
    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    /// Entries in write order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of shards recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no shard has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of record counts across entries.
    pub fn total_records(&self) -> usize {
        self.entries.iter().map(|entry| entry.record_count).sum()
    }

    /// One line per entry, each terminated by `\n`.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.text_line());
            out.push('\n');
        }
        out
    }

    /// Pretty-printed JSON array of `{file, sha256, num_records}`.
    pub fn render_json(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Write `manifest.txt` and `manifest.json` into `version_dir`.
    pub fn persist(&self, version_dir: &Path) -> Result<ManifestPaths, BuildError> {
        let text = version_dir.join(MANIFEST_TXT);
        let json = version_dir.join(MANIFEST_JSON);
        write_file_atomic(&text, self.render_text().as_bytes())?;
        write_file_atomic(&json, self.render_json()?.as_bytes())?;
        Ok(ManifestPaths { text, json })
    }

    /// Consume the builder, keeping its entries.
    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }
}

/// Read `manifest.json` from a version directory.
pub fn load_manifest(version_dir: &Path) -> Result<Vec<ManifestEntry>, BuildError> {
    let path = version_dir.join(MANIFEST_JSON);
    let raw = fs::read_to_string(&path).map_err(BuildError::io_at(&path))?;
    Ok(serde_json::from_str(&raw)?)
}
