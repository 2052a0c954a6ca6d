use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::BuildError;

/// Filesystem listing of text files under a root, in a stable order.
pub struct FileStream {
    root: PathBuf,
    follow_links: bool,
}

impl FileStream {
    /// Create a stream rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Directory being listed.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every `.txt` file below the root, sorted by path.
    ///
    /// Traversal errors (unreadable directories, symlink loops) fail the
    /// listing rather than silently shrinking the corpus.
    pub fn text_files(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                BuildError::IoAt {
                    path,
                    source: err.into(),
                }
            })?;
            if entry.file_type().is_file() && is_text_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// True if the path has a `.txt` extension (case-insensitive).
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}
