//! Error kinds of the log search path.

use thiserror::Error;

use crate::filter::FilterError;
use crate::parser::ParseError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("empty log file location configuration")]
    EmptyPath,
    #[error("file stat is required")]
    StatRequired,
    #[error("can't get file '{file}' {field}")]
    FetcherRequired { file: String, field: &'static str },
    /// The probed file holds no parseable record. Cached per mod-time.
    #[error("not a valid log file")]
    InvalidLogFile,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("search cancelled")]
    Cancelled,
    #[error("bad pattern: {0}")]
    BadRegex(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("search log panic, {0}")]
    Panic(String),
}

impl From<FilterError> for SearchError {
    fn from(e: FilterError) -> Self {
        match e {
            FilterError::InvalidRegex(msg) => SearchError::BadRegex(msg),
        }
    }
}

impl SearchError {
    /// Failures that end a whole search rather than one candidate file.
    pub fn is_fatal_for_resolution(&self) -> bool {
        matches!(self, SearchError::Cancelled | SearchError::Panic(_))
    }
}
