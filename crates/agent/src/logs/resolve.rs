//! Resolve: picks the log files of a rotation family that overlap a time
//! window, with start/end times served from the metadata cache.

use std::fs::{self, File};
use std::io::{BufRead, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::{FileStat, LogFileMeta, LogFileMetaCache};
use crate::parser::{parse_log_item, LogRecord};

use super::error::SearchError;
use super::reverse::read_last_lines;
use super::source::{line_reader, open_reader, read_line};

/// End time assumed for compressed files, which are never probed from
/// the tail.
pub const COMPRESSED_END_TIME: i64 = i64::MAX;

/// Lines tried from either end of a file before it is declared invalid.
pub const DEFAULT_PROBE_LINES: usize = 10;

const GZIP_SUFFIX: &str = ".gz";

/// An opened log file selected for a search.
///
/// The handle is positioned at offset 0. It is closed when the value is
/// dropped, or handed to the iterator through [`LogFile::into_reader`].
#[derive(Debug)]
pub struct LogFile {
    file: File,
    path: PathBuf,
    begin: i64,
    end: i64,
    compressed: bool,
}

impl LogFile {
    pub fn begin_time(&self) -> i64 {
        self.begin
    }

    pub fn end_time(&self) -> i64 {
        self.end
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn into_reader(self) -> Box<dyn BufRead + Send> {
        open_reader(self.file, self.compressed)
    }
}

/// First parseable record among the first `try_lines` lines.
///
/// Reaching the end of input first also makes the file invalid.
pub fn read_first_valid_log<R: BufRead + ?Sized>(
    reader: &mut R,
    try_lines: usize,
    cancel: &CancellationToken,
) -> Result<LogRecord, SearchError> {
    let mut buf = Vec::new();
    let mut tried = 0;
    while let Some(line) = read_line(reader, &mut buf)? {
        if let Ok(record) = parse_log_item(&line) {
            return Ok(record);
        }
        tried += 1;
        if tried >= try_lines {
            break;
        }
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
    }
    Err(SearchError::InvalidLogFile)
}

/// Last parseable record, scanning backwards from `size` until at least
/// `try_lines` lines have been tried.
pub fn read_last_valid_log<R: Read + Seek + ?Sized>(
    file: &mut R,
    size: u64,
    try_lines: usize,
    cancel: &CancellationToken,
) -> Result<LogRecord, SearchError> {
    let mut end_cursor = size;
    let mut tried = 0;
    loop {
        let (lines, consumed) = read_last_lines(file, end_cursor, cancel)?;
        if consumed == 0 {
            break;
        }
        end_cursor -= consumed as u64;

        if let Some(record) = lines.iter().rev().find_map(|l| parse_log_item(l).ok()) {
            return Ok(record);
        }
        tried += lines.len();
        if tried >= try_lines {
            break;
        }
    }
    Err(SearchError::InvalidLogFile)
}

/// `filepath.Ext`-style extension: the suffix from the last `.` of the
/// final path element, dot included, or "" when there is none.
fn extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) => &path[name_start + dot..],
        None => "",
    }
}

/// Selects the rotation family of one primary log path.
///
/// A file belongs to the family of `dir/tidb.log` when its path starts
/// with `dir/tidb` and ends with `.log` or `.log.gz`.
pub struct FileResolver<'a> {
    cache: &'a LogFileMetaCache,
    probe_lines: usize,
}

impl<'a> FileResolver<'a> {
    pub fn new(cache: &'a LogFileMetaCache) -> Self {
        Self {
            cache,
            probe_lines: DEFAULT_PROBE_LINES,
        }
    }

    pub fn probe_lines(mut self, lines: usize) -> Self {
        self.probe_lines = lines.max(1);
        self
    }

    /// Files of the family overlapping `[begin, end]`, sorted by start time.
    ///
    /// Unreadable or record-less files are skipped. Cancellation and
    /// panics abort the whole resolution.
    pub fn resolve(
        &self,
        log_file: &Path,
        begin: i64,
        end: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogFile>, SearchError> {
        if log_file.as_os_str().is_empty() {
            return Err(SearchError::EmptyPath);
        }

        let full = log_file.to_string_lossy();
        let ext = extension(&full);
        let prefix = &full[..full.len() - ext.len()];
        let compressed_ext = format!("{ext}{GZIP_SUFFIX}");

        let dir = log_file.parent().unwrap_or_else(|| Path::new(""));
        let listing = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

        let mut entries = fs::read_dir(listing)?
            .filter_map(Result::ok)
            .collect::<Vec<_>>();
        entries.sort_by_key(|e| e.file_name());

        let mut files = Vec::new();
        for entry in entries {
            let path = dir.join(entry.file_name());
            let name = path.to_string_lossy();
            if !name.starts_with(prefix) {
                continue;
            }
            let compressed = name.ends_with(&compressed_ext);
            if !compressed && !name.ends_with(ext) {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }

            match self.probe(&path, compressed, begin, end, cancel) {
                Ok(Some(file)) => files.push(file),
                Ok(None) => {}
                Err(e) if e.is_fatal_for_resolution() => return Err(e),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping log file"),
            }
        }

        files.sort_by_key(|f| f.begin);
        Ok(files)
    }

    /// Open one candidate and decide whether it overlaps the window.
    fn probe(
        &self,
        path: &Path,
        compressed: bool,
        begin: i64,
        end: i64,
        cancel: &CancellationToken,
    ) -> Result<Option<LogFile>, SearchError> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cannot open log file");
                return Ok(None);
            }
        };
        let metadata = file.metadata()?;
        let stat = FileStat::from_metadata(path, &metadata)?;

        let mut meta = self
            .cache
            .get(Some(&stat))
            .unwrap_or_else(|| LogFileMeta::new(&stat));
        if meta.is_invalid() {
            return Ok(None);
        }

        let times = self.fetch_times(&mut meta, &stat, &mut file, metadata.len(), compressed, cancel);
        self.cache.put(Some(&stat), Some(meta));
        let (file_begin, file_end) = times?;

        if file_begin > end || file_end < begin {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(0))?;
        Ok(Some(LogFile {
            file,
            path: path.to_path_buf(),
            begin: file_begin,
            end: file_end,
            compressed,
        }))
    }

    fn fetch_times(
        &self,
        meta: &mut LogFileMeta,
        stat: &FileStat,
        file: &mut File,
        size: u64,
        compressed: bool,
        cancel: &CancellationToken,
    ) -> Result<(i64, i64), SearchError> {
        let probe_lines = self.probe_lines;

        let begin = meta.get_start_time(
            Some(stat),
            Some(|| {
                let mut reader = line_reader(&mut *file, compressed);
                read_first_valid_log(&mut reader, probe_lines, cancel).map(|r| r.time)
            }),
        )?;

        if compressed {
            return Ok((begin, COMPRESSED_END_TIME));
        }

        let end = meta.get_end_time(
            Some(stat),
            Some(|| read_last_valid_log(&mut *file, size, probe_lines, cancel).map(|r| r.time)),
        )?;
        Ok((begin, end))
    }
}
