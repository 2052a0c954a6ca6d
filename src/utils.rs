//! Text normalization applied to raw record text before filtering.

use crate::config::ProcessingSpec;

/// Clean raw text according to `options`.
///
/// Missing text normalizes to the empty string. Line stripping runs before
/// whitespace collapsing when both are enabled.
pub fn normalize_text(text: Option<&str>, options: &ProcessingSpec) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let mut cleaned = if options.strip_empty_lines {
        strip_empty_lines(text)
    } else {
        text.to_string()
    };
    if options.normalize_whitespace {
        cleaned = normalize_inline_whitespace(&cleaned);
    }
    cleaned
}

/// Trim every line and drop the lines left empty, rejoining with `\n`.
pub fn strip_empty_lines(text: &str) -> String {
    split_line_boundaries(text)
        .map(|line| line.trim_matches(is_text_whitespace))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    for word in split_words(text.as_ref()) {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(word);
    }
    normalized
}

/// Unicode whitespace plus the ASCII file, group, record and unit separators
/// (`\x1c`..=`\x1f`), which text corpora treat as word breaks too.
pub fn is_text_whitespace(ch: char) -> bool {
    ch.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&ch)
}

/// Non-empty runs of text between [`is_text_whitespace`] characters.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_text_whitespace).filter(|word| !word.is_empty())
}

/// Split on every line boundary: `\n`, `\r\n`, lone `\r`, vertical tab, form
/// feed, the ASCII file/group/record separators, NEL, and the Unicode line and
/// paragraph separators.
///
/// A trailing boundary does not produce a final empty line.
pub fn split_line_boundaries(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|(_, ch)| is_line_boundary(*ch)) {
            Some((idx, ch)) => {
                let line = &rest[..idx];
                let mut next = idx + ch.len_utf8();
                if ch == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{1C}'
            | '\u{1D}'
            | '\u{1E}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}
