//! Model: log levels, parsed records and parse errors.

use std::fmt;
use thiserror::Error;

/// Severity carried in the second bracket of a unified log line.
///
/// The discriminants match the wire enum so that `1 << level as u32`
/// addresses the same bit on both sides of the RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Level {
    /// Level token was not recognised. Never filtered out by a level mask.
    #[default]
    Unknown = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Trace = 4,
    Critical = 5,
    Error = 6,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Unknown,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Trace,
        Level::Critical,
        Level::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Unknown => "UNKNOWN",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Trace => "TRACE",
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
        }
    }

    /// Bit of this level inside a level mask.
    #[inline]
    pub fn bit(&self) -> u64 {
        1u64 << (*self as u8)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record: time in Unix milliseconds, level and message.
///
/// Continuation lines (lines that do not parse but follow a parsed
/// record) are represented with the same struct, inheriting time and level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub time: i64,
    pub level: Level,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid log string: {0}")]
    InvalidRecord(String),
}
