//! Agent state: AgentState struct, shared state type alias.

use std::sync::Arc;

use crate::cache::LogFileMetaCache;
use crate::conf::AgentConfig;
use crate::logs::LogSearcher;

pub struct AgentState {
    pub config: AgentConfig,
    /// Start/end times of log files, shared by every search.
    pub meta_cache: Arc<LogFileMetaCache>,
}

impl AgentState {
    pub fn new(config: AgentConfig) -> Self {
        let meta_cache = Arc::new(LogFileMetaCache::with_capacity(config.search.meta_cache_capacity));
        Self { config, meta_cache }
    }

    pub fn searcher(&self) -> LogSearcher {
        LogSearcher::new(
            self.config.log_file.clone(),
            Arc::clone(&self.meta_cache),
            self.config.search.clone(),
        )
    }
}

pub type SharedState = Arc<AgentState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_capacity_follows_config() {
        let mut config = AgentConfig::default();
        config.search.meta_cache_capacity = 3;
        let state = AgentState::new(config);
        assert_eq!(state.meta_cache.capacity(), 3);
    }

    #[test]
    fn test_searchers_share_the_cache() {
        let state = AgentState::new(AgentConfig::default());
        let a = state.searcher();
        let b = state.searcher();
        assert_eq!(Arc::strong_count(&state.meta_cache), 3);
        drop((a, b));
        assert_eq!(Arc::strong_count(&state.meta_cache), 1);
    }
}
