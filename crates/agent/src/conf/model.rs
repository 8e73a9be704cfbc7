//! Model: AgentConfig and the log search tuning knobs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub bind_address: String,
    /// Primary log path, e.g. `/var/log/tidb/tidb.log`. Rotated siblings
    /// are found next to it.
    pub log_file: String,
    pub tls_cert_path: String,
    pub tls_key_path: String,
    pub tls_ca_path: String,
    pub max_concurrent_streams: usize,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Records per streamed response.
    pub batch_size: usize,
    pub meta_cache_capacity: usize,
    /// Lines tried from each end of a file before it is declared invalid.
    pub probe_lines: usize,
    /// End the search at the first record past the window end. Disable
    /// for log files that are not sorted by time.
    pub stop_at_window_end: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:50051".to_string(),
            log_file: String::new(),
            tls_cert_path: String::new(),
            tls_key_path: String::new(),
            tls_ca_path: String::new(),
            max_concurrent_streams: 100,
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            meta_cache_capacity: 64,
            probe_lines: 10,
            stop_at_window_end: true,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("search.batch_size must be > 0".to_string());
        }
        if self.meta_cache_capacity == 0 {
            return Err("search.meta_cache_capacity must be > 0".to_string());
        }
        if self.probe_lines == 0 {
            return Err("search.probe_lines must be > 0".to_string());
        }
        Ok(())
    }
}

impl AgentConfig {
    /// mTLS is on only when all three paths are set.
    pub fn tls_enabled(&self) -> bool {
        !self.tls_cert_path.is_empty() && !self.tls_key_path.is_empty() && !self.tls_ca_path.is_empty()
    }

    pub(crate) fn tls_partially_configured(&self) -> bool {
        let set = [&self.tls_cert_path, &self.tls_key_path, &self.tls_ca_path]
            .iter()
            .filter(|p| !p.is_empty())
            .count();
        set > 0 && set < 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── AgentConfig Defaults ─────────────────────────────────────

    #[test]
    fn test_agent_config_defaults() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.bind_address, "0.0.0.0:50051");
        assert!(cfg.log_file.is_empty());
        assert_eq!(cfg.max_concurrent_streams, 100);
        assert!(!cfg.tls_enabled());
    }

    #[test]
    fn test_search_config_defaults() {
        let s = SearchConfig::default();
        assert_eq!(s.batch_size, 1024);
        assert_eq!(s.meta_cache_capacity, 64);
        assert_eq!(s.probe_lines, 10);
        assert!(s.stop_at_window_end);
        assert!(s.validate().is_ok());
    }

    // ── SearchConfig Validation ──────────────────────────────────

    #[test]
    fn test_search_validate_rejects_zeroes() {
        let s = SearchConfig { batch_size: 0, ..Default::default() };
        assert!(s.validate().unwrap_err().contains("batch_size"));
        let s = SearchConfig { meta_cache_capacity: 0, ..Default::default() };
        assert!(s.validate().unwrap_err().contains("meta_cache_capacity"));
        let s = SearchConfig { probe_lines: 0, ..Default::default() };
        assert!(s.validate().unwrap_err().contains("probe_lines"));
    }

    // ── TLS switches ─────────────────────────────────────────────

    #[test]
    fn test_tls_enabled_needs_all_three_paths() {
        let mut cfg = AgentConfig {
            tls_cert_path: "a.crt".into(),
            tls_key_path: "a.key".into(),
            ..Default::default()
        };
        assert!(!cfg.tls_enabled());
        assert!(cfg.tls_partially_configured());
        cfg.tls_ca_path = "ca.crt".into();
        assert!(cfg.tls_enabled());
        assert!(!cfg.tls_partially_configured());
    }

    // ── TOML ─────────────────────────────────────────────────────

    #[test]
    fn test_toml_partial_uses_defaults() {
        let cfg: AgentConfig = toml::from_str(
            r#"
            log_file = "/var/log/tidb/tidb.log"

            [search]
            batch_size = 256
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log_file, "/var/log/tidb/tidb.log");
        assert_eq!(cfg.bind_address, "0.0.0.0:50051");
        assert_eq!(cfg.search.batch_size, 256);
        assert_eq!(cfg.search.probe_lines, 10);
    }
}
