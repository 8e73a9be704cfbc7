use std::sync::atomic::{AtomicU64, Ordering};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

use crate::parser::LogRecord;
use super::level::LevelMask;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
}

/// Outcome of running a record through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Record is inside the window and matches every condition.
    Accept,
    /// Record is rejected; keep scanning.
    Skip,
    /// Record is past the end of the window.
    PastEnd,
}

#[derive(Debug, Default)]
pub struct FilterStats {
    pub records_scanned: AtomicU64,
    pub records_matched: AtomicU64,
    pub bytes_processed: AtomicU64,
}

/// Time window, level mask and message patterns of one search.
///
/// Patterns have AND semantics: a record passes only when every
/// pattern matches its message.
pub struct FilterEngine {
    begin: i64,
    end: i64,
    levels: LevelMask,
    matchers: Vec<RegexMatcher>,
    stats: FilterStats,
}

impl FilterEngine {
    pub fn new(begin: i64, end: i64, levels: LevelMask, patterns: &[String]) -> Result<Self, FilterError> {
        let matchers = patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            begin,
            end,
            levels,
            matchers,
            stats: FilterStats::default(),
        })
    }

    #[inline]
    pub fn check(&self, record: &LogRecord) -> Verdict {
        self.stats.records_scanned.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_processed.fetch_add(record.message.len() as u64, Ordering::Relaxed);

        if record.time > self.end {
            return Verdict::PastEnd;
        }
        if record.time < self.begin {
            return Verdict::Skip;
        }
        if !self.levels.allows(record.level) {
            return Verdict::Skip;
        }
        if !self.matches_all(record.message.as_bytes()) {
            return Verdict::Skip;
        }

        self.stats.records_matched.fetch_add(1, Ordering::Relaxed);
        Verdict::Accept
    }

    #[inline]
    fn matches_all(&self, message: &[u8]) -> bool {
        self.matchers
            .iter()
            .all(|m| m.is_match(message).unwrap_or(false))
    }

    pub fn stats(&self) -> (u64, u64, u64) {
        (
            self.stats.records_scanned.load(Ordering::Relaxed),
            self.stats.records_matched.load(Ordering::Relaxed),
            self.stats.bytes_processed.load(Ordering::Relaxed),
        )
    }
}

fn compile(pattern: &str) -> Result<RegexMatcher, FilterError> {
    RegexMatcherBuilder::new()
        .case_insensitive(false)
        .multi_line(false)
        .build(pattern)
        .map_err(|e| FilterError::InvalidRegex(e.to_string()))
}
