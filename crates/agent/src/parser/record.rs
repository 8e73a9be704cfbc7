//! Record: splits one unified log line into `(time, level, message)`.
//!
//! ```text
//! [2019/08/26 06:19:13.011 -04:00] [INFO] [printer.go:41] ["Welcome to TiDB."]
//! [2019/08/21 01:43:01.460 -04:00] [INFO] [util.go:60] [PD] [release-version=v3.0.2]
//! [2019/08/26 07:20:23.815 -04:00] [INFO] [mod.rs:28] ["Release Version:   3.0.2"]
//! ```

use super::model::{LogRecord, ParseError};
use super::timestamp::{parse_level, parse_timestamp};

/// Locate the first `[` and the first `]` of `s`, left strictly before right.
#[inline]
fn bracket_pair(s: &str) -> Option<(usize, usize)> {
    let left = s.find('[')?;
    let right = s.find(']')?;
    if left > right {
        return None;
    }
    Some((left, right))
}

/// Parse a single log line.
///
/// The first bracket pair holds the timestamp, the next pair in the
/// remainder holds the level; whatever follows the level is the message,
/// trimmed of surrounding whitespace.
pub fn parse_log_item(s: &str) -> Result<LogRecord, ParseError> {
    let (time_left, time_right) =
        bracket_pair(s).ok_or_else(|| ParseError::InvalidRecord(s.to_string()))?;
    let time = parse_timestamp(&s[time_left + 1..time_right])?;

    let rest = &s[time_right + 1..];
    let (level_left, level_right) =
        bracket_pair(rest).ok_or_else(|| ParseError::InvalidRecord(s.to_string()))?;
    let level = parse_level(&rest[level_left + 1..level_right]);

    Ok(LogRecord {
        time,
        level,
        message: rest[level_right + 1..].trim().to_string(),
    })
}
