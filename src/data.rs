use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::records::DEFAULT_TEXT_FIELD;
use crate::utils::split_words;

/// Source-provided record before cleaning.
///
/// Raw records are opaque JSON values. Only the configured text field is read;
/// a non-object value, a missing field, or a non-string field all count as
/// "no text" rather than an error.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    value: Value,
}

impl RawRecord {
    /// Wrap an arbitrary JSON value.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Build a record holding `text` under the default text field.
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(DEFAULT_TEXT_FIELD.to_string(), Value::String(text.into()));
        Self::new(Value::Object(map))
    }

    /// A record with no readable content.
    pub fn malformed() -> Self {
        Self::new(Value::Null)
    }

    /// Text stored under `field`, if present and a string.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.value.get(field).and_then(Value::as_str)
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Normalized record that passed filtering; the unit persisted in shards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    /// Normalized text.
    pub text: String,
}

impl CleanRecord {
    /// Wrap already-normalized text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whitespace-delimited token count used for the build's token estimate.
    pub fn estimated_tokens(&self) -> usize {
        split_words(&self.text).count()
    }
}
