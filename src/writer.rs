//! Atomic shard and document persistence.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::layout::PARTIAL_SUFFIX;
use crate::data::CleanRecord;
use crate::errors::BuildError;
use crate::hash::HashingWriter;
use crate::types::ContentHash;

/// Outcome of a successful shard write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardWrite {
    /// SHA-256 over the exact bytes written.
    pub content_hash: ContentHash,
    /// Records serialized into the shard.
    pub record_count: usize,
    /// Size of the shard file.
    pub bytes: u64,
}

/// Write `records` to `path` as newline-delimited JSON and hash the bytes.
///
/// Each record becomes one compact JSON object followed by `\n`. The digest
/// covers exactly the file contents. Data goes to a sibling partial file that
/// is renamed over `path` only after a successful flush and sync; on failure
/// the partial file is removed and nothing exists at `path` that was not there
/// before.
pub fn write_shard<'a, I>(path: &Path, records: I) -> Result<ShardWrite, BuildError>
where
    I: IntoIterator<Item = &'a CleanRecord>,
{
    let (content_hash, (record_count, bytes)) = write_atomic(path, |out| {
        let mut count = 0usize;
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            out.write_all(b"\n")?;
            count += 1;
        }
        Ok((count, out.bytes_written()))
    })?;
    debug!(
        path = %path.display(),
        record_count,
        bytes,
        sha256 = %content_hash,
        "shard written"
    );
    Ok(ShardWrite {
        content_hash,
        record_count,
        bytes,
    })
}

/// Atomically replace `path` with `bytes`, returning their digest.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<ContentHash, BuildError> {
    let (digest, ()) = write_atomic(path, |out| {
        out.write_all(bytes)?;
        Ok(())
    })?;
    Ok(digest)
}

type Sink = HashingWriter<BufWriter<File>>;

fn write_atomic<T>(
    path: &Path,
    fill: impl FnOnce(&mut Sink) -> Result<T, BuildError>,
) -> Result<(ContentHash, T), BuildError> {
    let partial = partial_path(path);
    let result = (|| -> Result<(ContentHash, T), BuildError> {
        let file = File::create(&partial).map_err(BuildError::io_at(&partial))?;
        let mut out = HashingWriter::new(BufWriter::new(file));
        let value = fill(&mut out).map_err(|err| annotate(err, &partial))?;
        out.flush().map_err(BuildError::io_at(&partial))?;
        let (buffered, digest) = out.finish();
        let file = buffered.into_inner().map_err(|err| BuildError::IoAt {
            path: partial.clone(),
            source: err.into_error(),
        })?;
        file.sync_all().map_err(BuildError::io_at(&partial))?;
        fs::rename(&partial, path).map_err(BuildError::io_at(path))?;
        Ok((digest, value))
    })();
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn annotate(err: BuildError, path: &Path) -> BuildError {
    match err {
        BuildError::Io(source) => BuildError::IoAt {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}
