//! Logs module: locating, reading and filtering rotated log files.
//!
//! - `reverse.rs`: backwards line reading for end-time probes
//! - `source.rs`: plain / gzip line readers
//! - `resolve.rs`: rotation family discovery and time-window selection
//! - `iterator.rs`: merged, filtered record stream
//! - `search.rs`: request entry point

pub mod error;
pub mod iterator;
pub mod resolve;
pub mod reverse;
pub mod search;
pub mod source;

pub use error::SearchError;
pub use iterator::{Batch, LogIterator};
pub use resolve::{FileResolver, LogFile};
pub use search::{LogSearcher, SearchRequest};
