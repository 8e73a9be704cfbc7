//! Cache module: mod-time validated metadata of rotated log files.

pub mod lru;
pub mod meta;
pub mod stat;

pub use self::lru::{LogFileMetaCache, DEFAULT_CAPACITY};
pub use meta::LogFileMeta;
pub use stat::{FileKey, FileStat};
