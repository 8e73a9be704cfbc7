use std::num::NonZeroUsize;

use ::lru::LruCache;
use parking_lot::Mutex;

use super::meta::LogFileMeta;
use super::stat::{FileKey, FileStat};

pub const DEFAULT_CAPACITY: usize = 64;

/// Process-wide cache of [`LogFileMeta`] keyed by file identity.
///
/// Eviction is by insertion order: lookups use `peek` and never promote
/// an entry. One mutex guards the map and no I/O happens while it is
/// held; callers take a copy, probe the file, then put the result back.
#[derive(Debug)]
pub struct LogFileMetaCache {
    entries: Mutex<LruCache<FileKey, LogFileMeta>>,
}

impl LogFileMetaCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached metadata for the file, if it has not been modified since.
    /// A stale entry is evicted.
    pub fn get(&self, stat: Option<&FileStat>) -> Option<LogFileMeta> {
        let stat = stat?;
        let mut entries = self.entries.lock();
        match entries.peek(&stat.key) {
            Some(meta) if meta.check_file_not_modified(stat) => Some(meta.clone()),
            Some(_) => {
                entries.pop(&stat.key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace the metadata of a file. The oldest insertion is
    /// evicted once the capacity is exceeded.
    pub fn put(&self, stat: Option<&FileStat>, meta: Option<LogFileMeta>) {
        let (Some(stat), Some(meta)) = (stat, meta) else {
            return;
        };
        self.entries.lock().push(stat.key.clone(), meta);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for LogFileMetaCache {
    fn default() -> Self {
        Self::new()
    }
}
