use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::constants::records::DEFAULT_TEXT_FIELD;
use crate::constants::sources::MALFORMED_RECORD_MSG;
use crate::data::RawRecord;
use crate::errors::BuildError;
use crate::source::{RawSource, RecordStream};
use crate::types::{SourceId, TextField};

/// Source reading one JSON value per line of a UTF-8 file.
///
/// Blank lines are skipped. Lines that are not valid UTF-8 JSON are kept as
/// malformed records (empty text) so raw counts still cover them.
pub struct JsonlSource {
    id: SourceId,
    path: PathBuf,
    text_field: TextField,
}

impl JsonlSource {
    /// Source over the file at `path`; the file is opened by `records`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: format!("jsonl:{}", path.display()),
            path,
            text_field: DEFAULT_TEXT_FIELD.to_string(),
        }
    }

    /// Read text from `field` instead of `text`.
    pub fn with_text_field(mut self, field: impl Into<TextField>) -> Self {
        self.text_field = field.into();
        self
    }
}

impl RawSource for JsonlSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self) -> &str {
        &self.text_field
    }

    fn records(&mut self) -> Result<RecordStream<'_>, BuildError> {
        let file = File::open(&self.path).map_err(|err| BuildError::SourceUnavailable {
            source_id: self.id.clone(),
            reason: format!("cannot open '{}': {err}", self.path.display()),
        })?;
        Ok(Box::new(JsonlRecords {
            source_id: &self.id,
            path: &self.path,
            reader: BufReader::new(file),
            line_no: 0,
            buf: Vec::new(),
        }))
    }
}

struct JsonlRecords<'a> {
    source_id: &'a str,
    path: &'a Path,
    reader: BufReader<File>,
    line_no: usize,
    buf: Vec<u8>,
}

impl Iterator for JsonlRecords<'_> {
    type Item = Result<RawRecord, BuildError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    return Some(Err(BuildError::IoAt {
                        path: self.path.to_path_buf(),
                        source: err,
                    }));
                }
            }
            self.line_no += 1;
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let parsed = std::str::from_utf8(&self.buf)
                .map_err(|err| err.to_string())
                .and_then(|line| serde_json::from_str::<Value>(line).map_err(|err| err.to_string()));
            let record = match parsed {
                Ok(value) => RawRecord::new(value),
                Err(error) => {
                    warn!(
                        source_id = %self.source_id,
                        line = self.line_no,
                        error = %error,
                        "{MALFORMED_RECORD_MSG}"
                    );
                    RawRecord::malformed()
                }
            };
            return Some(Ok(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn collect_texts(source: &mut JsonlSource) -> Vec<Option<String>> {
        let field = source.text_field().to_string();
        source
            .records()
            .unwrap()
            .map(|record| record.unwrap().text(&field).map(str::to_string))
            .collect()
    }

    #[test]
    fn reads_lines_in_order_and_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        fs::write(
            &path,
            "{\"text\": \"first\"}\n\n   \n{\"text\": \"second\", \"id\": 2}\r\n{\"text\": \"third\"}",
        )
        .unwrap();

        let mut source = JsonlSource::new(&path);
        assert_eq!(
            collect_texts(&mut source),
            vec![
                Some("first".to_string()),
                Some("second".to_string()),
                Some("third".to_string())
            ]
        );
    }

    #[test]
    fn malformed_lines_become_records_without_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        let mut bytes = b"{\"text\": \"ok\"}\nnot json\n{\"other\": 1}\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        fs::write(&path, bytes).unwrap();

        let mut source = JsonlSource::new(&path);
        assert_eq!(
            collect_texts(&mut source),
            vec![Some("ok".to_string()), None, None, None]
        );
    }

    #[test]
    fn custom_text_field_is_honored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        fs::write(&path, "{\"body\": \"x\", \"text\": \"ignored\"}\n").unwrap();

        let mut source = JsonlSource::new(&path).with_text_field("body");
        assert_eq!(collect_texts(&mut source), vec![Some("x".to_string())]);
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempdir().unwrap();
        let mut source = JsonlSource::new(dir.path().join("absent.jsonl"));
        let err = source.records().err().expect("missing file should fail");
        assert!(matches!(err, BuildError::SourceUnavailable { .. }));
    }
}
