//! Raw record sources.
//!
//! A build pulls raw records exactly once, front to back. `RawSource` is that
//! pull-based capability; `SourceSpec` picks an implementation from the
//! `source` section of a dataset config.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::constants::records::DEFAULT_TEXT_FIELD;
use crate::data::RawRecord;
use crate::errors::BuildError;
use crate::types::{SourceId, TextField};

/// JSON-lines file source.
pub mod jsonl;
/// Fixed in-memory source.
pub mod memory;
/// Directory-of-text-files source.
pub mod text_dir;

pub use jsonl::JsonlSource;
pub use memory::InMemorySource;
pub use text_dir::TextDirSource;

/// Forward-only stream of raw records. Read failures end the build.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<RawRecord, BuildError>> + 'a>;

/// Producer of raw records for one build.
///
/// `records` is called once per build and iterated in order without reset.
pub trait RawSource {
    /// Stable identifier used in logs.
    fn id(&self) -> &str;

    /// Field of each raw record holding its text.
    fn text_field(&self) -> &str {
        DEFAULT_TEXT_FIELD
    }

    /// Open the record stream.
    fn records(&mut self) -> Result<RecordStream<'_>, BuildError>;

    /// Exact record count when known without iterating.
    fn reported_record_count(&self) -> Option<usize> {
        None
    }
}

fn default_text_field() -> TextField {
    DEFAULT_TEXT_FIELD.to_string()
}

/// Typed view of the `source` config section, selected by its `kind` key.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// One JSON value per line of `path`.
    Jsonl {
        path: PathBuf,
        #[serde(default = "default_text_field")]
        text_field: TextField,
    },
    /// Every `.txt` file below `root`, one record per file.
    TextDir {
        root: PathBuf,
        #[serde(default)]
        follow_symlinks: bool,
    },
    /// Records listed directly in the config.
    Inline {
        records: Vec<Value>,
        #[serde(default = "default_text_field")]
        text_field: TextField,
    },
}

impl SourceSpec {
    /// Parse the `source` section; unknown keys are ignored so the section can
    /// carry provenance notes that are only echoed into metadata.
    pub fn from_value(value: &Value) -> Result<Self, BuildError> {
        Self::deserialize(value)
            .map_err(|err| BuildError::Configuration(format!("invalid source section: {err}")))
    }

    /// Identifier for the source this spec describes.
    pub fn source_id(&self) -> SourceId {
        match self {
            SourceSpec::Jsonl { path, .. } => format!("jsonl:{}", path.display()),
            SourceSpec::TextDir { root, .. } => format!("text_dir:{}", root.display()),
            SourceSpec::Inline { .. } => "inline".to_string(),
        }
    }

    /// Build the source. Opening does not read any records yet.
    pub fn open(&self) -> Result<Box<dyn RawSource>, BuildError> {
        let source: Box<dyn RawSource> = match self {
            SourceSpec::Jsonl { path, text_field } => {
                Box::new(JsonlSource::new(path).with_text_field(text_field.clone()))
            }
            SourceSpec::TextDir {
                root,
                follow_symlinks,
            } => Box::new(TextDirSource::new(root).with_follow_symlinks(*follow_symlinks)),
            SourceSpec::Inline {
                records,
                text_field,
            } => Box::new(
                InMemorySource::new(
                    self.source_id(),
                    records.iter().cloned().map(RawRecord::new).collect(),
                )
                .with_text_field(text_field.clone()),
            ),
        };
        Ok(source)
    }
}
