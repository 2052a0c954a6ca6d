use crate::constants::records::DEFAULT_TEXT_FIELD;
use crate::data::RawRecord;
use crate::errors::BuildError;
use crate::source::{RawSource, RecordStream};
use crate::types::{SourceId, TextField};

/// Source backed by a fixed list of raw records.
///
/// Records are handed out once; a second `records` call yields nothing.
pub struct InMemorySource {
    id: SourceId,
    text_field: TextField,
    records: Vec<RawRecord>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<RawRecord>) -> Self {
        Self {
            id: id.into(),
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            records,
        }
    }

    /// Convenience constructor: one record per text under the default field.
    pub fn from_texts<I, S>(id: impl Into<SourceId>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, texts.into_iter().map(RawRecord::from_text).collect())
    }

    /// Read text from `field` instead of `text`.
    pub fn with_text_field(mut self, field: impl Into<TextField>) -> Self {
        self.text_field = field.into();
        self
    }
}

impl RawSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self) -> &str {
        &self.text_field
    }

    fn records(&mut self) -> Result<RecordStream<'_>, BuildError> {
        let records = std::mem::take(&mut self.records);
        Ok(Box::new(records.into_iter().map(Ok)))
    }

    fn reported_record_count(&self) -> Option<usize> {
        Some(self.records.len())
    }
}
