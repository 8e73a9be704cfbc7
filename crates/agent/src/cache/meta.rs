//! Meta: cached start/end time of one log file, validated by mod-time.

use std::time::SystemTime;

use crate::logs::error::SearchError;
use super::stat::FileStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Start,
    End,
}

impl Field {
    fn as_str(&self) -> &'static str {
        match self {
            Field::Start => "start time",
            Field::End => "end time",
        }
    }
}

/// Metadata remembered about one log file at one modification time.
///
/// `start` and `end` are filled independently, the first time each one
/// is computed. `invalid` records that a probe at this mod-time found no
/// parseable record, so later probes can skip the I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileMeta {
    pub mod_time: SystemTime,
    start: Option<i64>,
    end: Option<i64>,
    invalid: bool,
}

impl LogFileMeta {
    pub fn new(stat: &FileStat) -> Self {
        Self {
            mod_time: stat.mod_time,
            start: None,
            end: None,
            invalid: false,
        }
    }

    pub fn check_file_not_modified(&self, stat: &FileStat) -> bool {
        self.mod_time == stat.mod_time
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    pub fn start_time(&self) -> Option<i64> {
        self.start
    }

    pub fn end_time(&self) -> Option<i64> {
        self.end
    }

    /// Start time of the file, from cache when the mod-time still matches,
    /// otherwise from `fetcher`.
    pub fn get_start_time<F>(&mut self, stat: Option<&FileStat>, fetcher: Option<F>) -> Result<i64, SearchError>
    where
        F: FnOnce() -> Result<i64, SearchError>,
    {
        self.get_or_fetch(stat, fetcher, Field::Start)
    }

    /// End time of the file, same contract as [`Self::get_start_time`].
    pub fn get_end_time<F>(&mut self, stat: Option<&FileStat>, fetcher: Option<F>) -> Result<i64, SearchError>
    where
        F: FnOnce() -> Result<i64, SearchError>,
    {
        self.get_or_fetch(stat, fetcher, Field::End)
    }

    fn get_or_fetch<F>(&mut self, stat: Option<&FileStat>, fetcher: Option<F>, field: Field) -> Result<i64, SearchError>
    where
        F: FnOnce() -> Result<i64, SearchError>,
    {
        let stat = stat.ok_or(SearchError::StatRequired)?;

        // File changed since the values were computed: forget all of them.
        if !self.check_file_not_modified(stat) {
            self.mod_time = stat.mod_time;
            self.start = None;
            self.end = None;
            self.invalid = false;
        }

        if let Some(cached) = self.slot(field) {
            return Ok(cached);
        }

        let fetcher = fetcher.ok_or_else(|| SearchError::FetcherRequired {
            file: stat.name.clone(),
            field: field.as_str(),
        })?;

        match fetcher() {
            Ok(value) => {
                *self.slot_mut(field) = Some(value);
                self.invalid = false;
                Ok(value)
            }
            Err(SearchError::InvalidLogFile) => {
                self.mark_invalid();
                Err(SearchError::InvalidLogFile)
            }
            Err(e) => Err(e),
        }
    }

    fn slot(&self, field: Field) -> Option<i64> {
        match field {
            Field::Start => self.start,
            Field::End => self.end,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<i64> {
        match field {
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
        }
    }
}
