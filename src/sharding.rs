//! Order-preserving partitioning of records into fixed-size shards.

use crate::errors::BuildError;

/// Upper bound on records reserved up front for one shard; larger shards grow on demand.
const MAX_PREALLOCATED_RECORDS: usize = 1024;

/// Lazily group `records` into shards of `shard_size`.
///
/// Every shard holds exactly `shard_size` consecutive records except the last,
/// which holds the non-empty remainder. Empty input yields no shards. A zero
/// shard size fails before anything is pulled from `records`.
pub fn partition<I>(records: I, shard_size: usize) -> Result<Shards<I::IntoIter>, BuildError>
where
    I: IntoIterator,
{
    if shard_size == 0 {
        return Err(BuildError::Configuration(
            "shard size must be greater than zero".into(),
        ));
    }
    Ok(Shards {
        inner: records.into_iter(),
        shard_size,
        done: false,
    })
}

/// Iterator returned by [`partition`].
pub struct Shards<I> {
    inner: I,
    shard_size: usize,
    done: bool,
}

impl<I> Shards<I> {
    /// Upstream record iterator, for checking deferred upstream state between shards.
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.inner
    }
}

impl<I: Iterator> Iterator for Shards<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut current = Vec::with_capacity(self.shard_size.min(MAX_PREALLOCATED_RECORDS));
        for record in self.inner.by_ref() {
            current.push(record);
            if current.len() >= self.shard_size {
                return Some(current);
            }
        }
        self.done = true;
        if current.is_empty() { None } else { Some(current) }
    }
}
