//! Unified log line parsing.
//!
//! - `model.rs`: [`Level`], [`LogRecord`] and [`ParseError`]
//! - `timestamp.rs`: header timestamp and level keyword parsing
//! - `record.rs`: bracketed `[time] [level] message` line parsing

pub mod model;
pub mod timestamp;
pub mod record;

pub use model::{Level, LogRecord, ParseError};
pub use record::parse_log_item;
pub use timestamp::{parse_level, parse_timestamp, TIMESTAMP_LEN};
