//! Filter module: time window, level mask and regex pattern filtering.

pub mod engine;
pub mod level;

pub use engine::{FilterEngine, FilterError, Verdict};
pub use level::LevelMask;
