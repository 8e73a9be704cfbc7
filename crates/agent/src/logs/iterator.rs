//! Iterator: merges the resolved files into one stream of filtered
//! records, attaching unparseable lines to the record before them.

use std::fmt;
use std::io::BufRead;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::filter::{FilterEngine, Verdict};
use crate::parser::{parse_log_item, LogRecord, TIMESTAMP_LEN};

use super::error::SearchError;
use super::resolve::LogFile;
use super::source::read_line;

/// One pull of at most `limit` records.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<LogRecord>,
    /// No record is left after this batch.
    pub drained: bool,
}

pub struct LogIterator {
    filter: FilterEngine,
    pending: std::vec::IntoIter<LogFile>,
    reader: Option<Box<dyn BufRead + Send>>,
    line: Vec<u8>,
    previous: Option<LogRecord>,
    stop_at_window_end: bool,
    finished: bool,
}

impl fmt::Debug for LogIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogIterator")
            .field("pending", &self.pending.len())
            .field("reading", &self.reader.is_some())
            .field("stop_at_window_end", &self.stop_at_window_end)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl LogIterator {
    /// `files` must already be sorted by start time.
    pub fn new(files: Vec<LogFile>, filter: FilterEngine) -> Self {
        Self {
            filter,
            pending: files.into_iter(),
            reader: None,
            line: Vec::with_capacity(1024),
            previous: None,
            stop_at_window_end: true,
            finished: false,
        }
    }

    /// When disabled, a record past the window end is skipped instead of
    /// ending the search, for families whose files are not sorted by time.
    pub fn stop_at_window_end(mut self, stop: bool) -> Self {
        self.stop_at_window_end = stop;
        self
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    /// Next record that passes the filter, `Ok(None)` once exhausted.
    pub fn next(&mut self, cancel: &CancellationToken) -> Result<Option<LogRecord>, SearchError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            if self.reader.is_none() {
                match self.pending.next() {
                    Some(file) => {
                        trace!(path = %file.path().display(), "Reading log file");
                        self.reader = Some(file.into_reader());
                    }
                    None => {
                        self.finished = true;
                        return Ok(None);
                    }
                }
            }
            let Some(reader) = self.reader.as_mut() else {
                continue;
            };

            let Some(raw) = read_line(reader, &mut self.line)? else {
                // close the exhausted file before moving on
                self.reader = None;
                continue;
            };
            let line = raw.trim();

            if self.previous.is_none() && line.len() < TIMESTAMP_LEN {
                continue;
            }

            let record = match parse_log_item(line) {
                Ok(record) => {
                    self.previous = Some(record.clone());
                    record
                }
                Err(_) => match &self.previous {
                    Some(prev) => LogRecord {
                        time: prev.time,
                        level: prev.level,
                        message: line.to_string(),
                    },
                    None => continue,
                },
            };

            match self.filter.check(&record) {
                Verdict::Accept => return Ok(Some(record)),
                Verdict::Skip => {}
                Verdict::PastEnd if self.stop_at_window_end => {
                    self.finished = true;
                    self.reader = None;
                    return Ok(None);
                }
                Verdict::PastEnd => {}
            }
        }
    }

    /// Pull up to `limit` records.
    pub fn next_batch(&mut self, cancel: &CancellationToken, limit: usize) -> Result<Batch, SearchError> {
        let mut records = Vec::with_capacity(limit.min(1024));
        while records.len() < limit {
            match self.next(cancel)? {
                Some(record) => records.push(record),
                None => return Ok(Batch { records, drained: true }),
            }
        }
        Ok(Batch { records, drained: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LogFileMetaCache;
    use crate::filter::LevelMask;
    use crate::logs::resolve::FileResolver;
    use crate::parser::{parse_timestamp, Level};
    use std::fs;
    use std::path::Path;

    fn day(time: &str) -> i64 {
        parse_timestamp(&format!("2019/08/26 {} -04:00", time)).unwrap()
    }

    fn open(dir: &Path, begin: i64, end: i64, levels: &[Level], patterns: &[&str]) -> LogIterator {
        let cache = LogFileMetaCache::new();
        let files = FileResolver::new(&cache)
            .resolve(&dir.join("tidb.log"), begin, end, &CancellationToken::new())
            .unwrap();
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let filter = FilterEngine::new(begin, end, LevelMask::new(levels), &patterns).unwrap();
        LogIterator::new(files, filter)
    }

    fn drain(iter: &mut LogIterator) -> Vec<LogRecord> {
        let cancel = CancellationToken::new();
        let mut out = Vec::new();
        while let Some(record) = iter.next(&cancel).unwrap() {
            out.push(record);
        }
        out
    }

    #[test]
    fn test_continuation_lines_inherit_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tidb.log"),
            [
                "too short",
                "a leading line long enough but without any header",
                r#"[2019/08/26 06:19:16.011 -04:00] [DEBUG] [printer.go:41] ["Welcome to TiDB."]"#,
                "  This is an invalid log blablabla][  ",
                r#"[2019/08/26 06:19:17.011 -04:00] [TRACE] [printer.go:41] ["Welcome to TiDB."]"#,
            ]
            .join("\n"),
        )
        .unwrap();

        let records = drain(&mut open(dir.path(), 0, i64::MAX, &[], &[]));
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].time, day("06:19:16.011"));
        assert_eq!(records[1].level, Level::Debug);
        assert_eq!(records[1].message, "This is an invalid log blablabla][");
        assert_eq!(records[2].level, Level::Trace);
    }

    #[test]
    fn test_stops_at_window_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tidb.log"),
            [
                "[2019/08/26 06:19:13.011 -04:00] [INFO] one",
                "[2019/08/26 06:19:20.011 -04:00] [INFO] two",
                "[2019/08/26 06:19:14.011 -04:00] [INFO] late but in window",
            ]
            .join("\n"),
        )
        .unwrap();

        let mut iter = open(dir.path(), day("06:19:13.000"), day("06:19:15.000"), &[], &[]);
        let records = drain(&mut iter);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "one");
        // stays exhausted
        assert!(iter.next(&CancellationToken::new()).unwrap().is_none());

        let mut iter = open(dir.path(), day("06:19:13.000"), day("06:19:15.000"), &[], &[]).stop_at_window_end(false);
        let records = drain(&mut iter);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].message, "late but in window");
    }

    #[test]
    fn test_next_batch_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..5)
            .map(|i| format!("[2019/08/26 06:19:1{}.011 -04:00] [INFO] record {}", i, i))
            .collect();
        fs::write(dir.path().join("tidb.log"), lines.join("\n")).unwrap();

        let cancel = CancellationToken::new();
        let mut iter = open(dir.path(), 0, i64::MAX, &[], &[]);
        let first = iter.next_batch(&cancel, 2).unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(!first.drained);
        let second = iter.next_batch(&cancel, 3).unwrap();
        assert_eq!(second.records.len(), 3);
        assert!(!second.drained);
        let last = iter.next_batch(&cancel, 3).unwrap();
        assert!(last.records.is_empty());
        assert!(last.drained);
    }

    #[test]
    fn test_cancelled_iteration() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tidb.log"), "[2019/08/26 06:19:13.011 -04:00] [INFO] one\n").unwrap();
        let mut iter = open(dir.path(), 0, i64::MAX, &[], &[]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(iter.next(&cancel), Err(SearchError::Cancelled)));
    }

    #[test]
    fn test_level_and_pattern_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tidb.log"),
            [
                "[2019/08/26 06:19:13.011 -04:00] [INFO] partern test",
                "[2019/08/26 06:19:14.011 -04:00] [WARN] partern test txn",
                "[2019/08/26 06:19:15.011 -04:00] [INFO] partern test txn",
                "[2019/08/26 06:19:16.011 -04:00] [FATAL] partern test txn",
            ]
            .join("\n"),
        )
        .unwrap();

        let records = drain(&mut open(dir.path(), 0, i64::MAX, &[Level::Info], &[".*partern.*", "txn"]));
        // INFO passes the mask; the unknown level always passes
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time, day("06:19:15.011"));
        assert_eq!(records[1].level, Level::Unknown);
    }
}
