#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runners shared by the binaries.
pub mod apps;
/// Build configuration types and YAML loading.
pub mod config;
/// Centralized constants for layout, defaults, and messages.
pub mod constants;
/// Raw and clean record types.
pub mod data;
/// Length-bound record filtering.
pub mod filter;
mod hash;
/// Version inspection, sampling, and integrity verification.
pub mod inspect;
/// Tracing subscriber setup for the command-line tools.
pub mod logging;
/// Shard manifest entries and rendering.
pub mod manifest;
/// Version metadata document.
pub mod metadata;
/// Build orchestration.
pub mod pipeline;
/// Order-preserving shard partitioning.
pub mod sharding;
/// Raw record source trait and built-in sources.
pub mod source;
/// Input transports used by sources (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;
/// Atomic shard and document writers.
pub mod writer;

mod errors;

pub use config::{DatasetConfig, FilterSpec, OutputSpec, ProcessingSpec};
pub use data::{CleanRecord, RawRecord};
pub use errors::BuildError;
pub use filter::accept;
pub use hash::{HashingWriter, sha256_file, sha256_hex};
pub use inspect::{Sample, VerificationReport, inspect_version, verify_version};
pub use manifest::{ManifestBuilder, ManifestEntry, load_manifest, shard_file_name};
pub use metadata::{BuildStats, VersionMetadata};
pub use pipeline::{BuildOutcome, BuildPipeline, build};
pub use sharding::{Shards, partition};
pub use source::{InMemorySource, JsonlSource, RawSource, SourceSpec, TextDirSource};
pub use types::{ContentHash, DatasetName, ShardFileName, SourceId, TextField, VersionId};
pub use utils::normalize_text;
pub use writer::{ShardWrite, write_shard};
