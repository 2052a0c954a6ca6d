use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::constants::sources::MALFORMED_RECORD_MSG;
use crate::data::RawRecord;
use crate::errors::BuildError;
use crate::source::{RawSource, RecordStream};
use crate::transport::fs::FileStream;
use crate::types::SourceId;

/// Source yielding one record per `.txt` file below a root, in path order.
///
/// Files that are not valid UTF-8 are kept as malformed records.
pub struct TextDirSource {
    id: SourceId,
    stream: FileStream,
}

impl TextDirSource {
    /// Source over `root`, not following symlinks.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let stream = FileStream::new(root);
        Self {
            id: format!("text_dir:{}", stream.root().display()),
            stream,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.stream = self.stream.with_follow_symlinks(follow_links);
        self
    }
}

impl RawSource for TextDirSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn records(&mut self) -> Result<RecordStream<'_>, BuildError> {
        if !self.stream.root().is_dir() {
            return Err(BuildError::SourceUnavailable {
                source_id: self.id.clone(),
                reason: format!("'{}' is not a directory", self.stream.root().display()),
            });
        }
        let files = self.stream.text_files()?;
        let source_id = &self.id;
        Ok(Box::new(files.into_iter().map(move |path| -> Result<RawRecord, BuildError> {
            let bytes = fs::read(&path).map_err(BuildError::io_at(&path))?;
            match String::from_utf8(bytes) {
                Ok(text) => Ok(RawRecord::from_text(text)),
                Err(err) => {
                    warn!(
                        source_id = %source_id,
                        path = %path.display(),
                        error = %err,
                        "{MALFORMED_RECORD_MSG}"
                    );
                    Ok(RawRecord::malformed())
                }
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn each_text_file_is_one_record_in_path_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("b.txt"), "second").unwrap();
        fs::write(root.join("a.txt"), "first").unwrap();
        fs::write(root.join("c.bin"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("d.txt"), [0xffu8, 0xfe]).unwrap();

        let mut source = TextDirSource::new(root);
        let texts: Vec<Option<String>> = source
            .records()
            .unwrap()
            .map(|record| record.unwrap().text("text").map(str::to_string))
            .collect();
        assert_eq!(
            texts,
            vec![Some("first".to_string()), Some("second".to_string()), None]
        );
    }

    #[test]
    fn missing_root_is_source_unavailable() {
        let temp = tempdir().unwrap();
        let mut source = TextDirSource::new(temp.path().join("absent"));
        assert!(matches!(
            source.records().err(),
            Some(BuildError::SourceUnavailable { .. })
        ));
    }
}
