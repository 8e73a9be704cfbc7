//! Search: turns one request into a record iterator over the resolved
//! files of the configured log family.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::LogFileMetaCache;
use crate::conf::SearchConfig;
use crate::filter::{FilterEngine, LevelMask};
use crate::parser::Level;

use super::error::SearchError;
use super::iterator::LogIterator;
use super::resolve::FileResolver;

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub start_time: i64,
    /// 0 means unbounded.
    pub end_time: i64,
    pub levels: Vec<Level>,
    pub patterns: Vec<String>,
}

impl SearchRequest {
    pub fn effective_end(&self) -> i64 {
        if self.end_time == 0 {
            i64::MAX
        } else {
            self.end_time
        }
    }
}

/// Everything a search needs besides the request itself.
#[derive(Clone)]
pub struct LogSearcher {
    log_file: PathBuf,
    cache: Arc<LogFileMetaCache>,
    config: SearchConfig,
}

impl LogSearcher {
    pub fn new(log_file: impl Into<PathBuf>, cache: Arc<LogFileMetaCache>, config: SearchConfig) -> Self {
        Self {
            log_file: log_file.into(),
            cache,
            config,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// Resolve the files, then compile the filter. Blocking.
    ///
    /// Files are resolved first so that a missing log path is reported
    /// before a bad pattern.
    pub fn open(&self, request: SearchRequest, cancel: &CancellationToken) -> Result<LogIterator, SearchError> {
        let end = request.effective_end();
        let files = FileResolver::new(&self.cache)
            .probe_lines(self.config.probe_lines)
            .resolve(&self.log_file, request.start_time, end, cancel)?;
        debug!(files = files.len(), "Resolved log files");

        let filter = FilterEngine::new(
            request.start_time,
            end,
            LevelMask::new(&request.levels),
            &request.patterns,
        )?;

        Ok(LogIterator::new(files, filter).stop_at_window_end(self.config.stop_at_window_end))
    }
}
