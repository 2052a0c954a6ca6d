//! Read-only inspection of a built version: metadata dump, a random sample,
//! and integrity verification against the manifest.

use std::fs;
use std::io::Write;
use std::path::Path;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::{Map, Value};

use crate::constants::inspect::{
    EMPTY_MANIFEST_MSG, EMPTY_SHARD_MSG, SAMPLE_PREVIEW_CHARS, TRUNCATION_MARKER,
};
use crate::constants::layout::SHARDS_DIR;
use crate::constants::records::DEFAULT_TEXT_FIELD;
use crate::errors::BuildError;
use crate::hash::sha256_file;
use crate::manifest::{ManifestEntry, load_manifest};
use crate::metadata::{VersionMetadata, read_metadata_file};
use crate::types::ShardFileName;

/// Record picked by [`inspect_version`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Shard the sample came from.
    pub shard: ShardFileName,
    /// Full text of the sampled record; `None` when the shard had no lines.
    pub text: Option<String>,
}

/// Print a version's metadata and one randomly chosen record.
///
/// `base_dir` is the dataset directory holding version directories. Fails with
/// `NotFound` before writing anything when `metadata.json` is absent. Returns
/// the sample, or `None` when the manifest lists no shards.
pub fn inspect_version<R, W>(
    base_dir: &Path,
    version: &str,
    rng: &mut R,
    out: &mut W,
) -> Result<Option<Sample>, BuildError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let version_dir = base_dir.join(version);
    let metadata: Map<String, Value> = serde_json::from_str(&read_metadata_file(&version_dir)?)?;
    let manifest = load_manifest(&version_dir)?;

    writeln!(out, "=== METADATA ===")?;
    for (key, value) in &metadata {
        writeln!(out, "{key}: {}", display_value(value))?;
    }

    let Some(entry) = manifest.choose(&mut *rng) else {
        writeln!(out, "\n{EMPTY_MANIFEST_MSG}")?;
        return Ok(None);
    };

    writeln!(out, "\n=== RANDOM SAMPLE ===")?;
    writeln!(out, "From shard: {}", entry.file_name)?;
    let shard_path = version_dir.join(SHARDS_DIR).join(&entry.file_name);
    let contents = fs::read_to_string(&shard_path).map_err(BuildError::io_at(&shard_path))?;
    let lines: Vec<&str> = contents.lines().collect();
    let Some(line) = lines.choose(&mut *rng) else {
        writeln!(out, "{EMPTY_SHARD_MSG}")?;
        return Ok(Some(Sample {
            shard: entry.file_name.clone(),
            text: None,
        }));
    };

    let record: Value = serde_json::from_str(line)?;
    let text = record
        .get(DEFAULT_TEXT_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    writeln!(out, "{}", preview(&text))?;
    Ok(Some(Sample {
        shard: entry.file_name.clone(),
        text: Some(text),
    }))
}

/// First `SAMPLE_PREVIEW_CHARS` chars of `text`, marked when truncated.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(SAMPLE_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{} {TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Result of re-hashing every shard listed in a version's manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Shards whose bytes were hashed.
    pub checked: usize,
    /// Shards whose digest differs from the manifest.
    pub mismatched: Vec<ShardFileName>,
    /// Shards listed in the manifest but absent on disk.
    pub missing: Vec<ShardFileName>,
    /// Manifest record counts sum to `num_examples` and entries match `num_shards`.
    pub counts_consistent: bool,
}

impl VerificationReport {
    /// True when every shard is present, matches its hash, and counts agree.
    pub fn is_ok(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty() && self.counts_consistent
    }
}

/// Check a built version directory against its manifest and metadata.
pub fn verify_version(version_dir: &Path) -> Result<VerificationReport, BuildError> {
    let metadata = VersionMetadata::load(version_dir)?;
    let manifest = load_manifest(version_dir)?;
    let shards_dir = version_dir.join(SHARDS_DIR);

    let mut report = VerificationReport::default();
    for entry in &manifest {
        let path = shards_dir.join(&entry.file_name);
        if !path.is_file() {
            report.missing.push(entry.file_name.clone());
            continue;
        }
        report.checked += 1;
        if sha256_file(&path)? != entry.content_hash {
            report.mismatched.push(entry.file_name.clone());
        }
    }
    let total: usize = manifest.iter().map(|entry: &ManifestEntry| entry.record_count).sum();
    report.counts_consistent =
        total == metadata.num_examples && manifest.len() == metadata.num_shards;
    Ok(report)
}
