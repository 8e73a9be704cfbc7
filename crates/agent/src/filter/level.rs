//! Level: bitmask filter over [`Level`].

use crate::parser::Level;

/// Bit `i` is set iff level `i` was requested. Zero means no filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelMask(u64);

impl LevelMask {
    pub fn new(levels: &[Level]) -> Self {
        Self(levels.iter().fold(0, |mask, level| mask | level.bit()))
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// `Unknown` always passes: continuation and oddly tagged lines must
    /// not vanish just because a level filter is active.
    #[inline]
    pub fn allows(&self, level: Level) -> bool {
        level == Level::Unknown || self.is_empty() || self.0 & level.bit() != 0
    }
}
