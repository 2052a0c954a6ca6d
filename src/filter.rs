//! Length-bound filtering of normalized records.

use crate::config::FilterSpec;

/// True when `text` is present and its char count lies within `bounds` (inclusive).
pub fn accept(text: Option<&str>, bounds: &FilterSpec) -> bool {
    let Some(text) = text else {
        return false;
    };
    let len = text.chars().count();
    bounds.min_chars <= len && len <= bounds.max_chars
}

impl FilterSpec {
    /// Filter `text` against these bounds. See [`accept`].
    pub fn accepts(&self, text: &str) -> bool {
        accept(Some(text), self)
    }
}
