//! Load: config loading from file and environment variables.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::model::{AgentConfig, SearchConfig};

pub const DEFAULT_CONFIG_FILE: &str = "/etc/diag-agent/agent.toml";

fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|s| s.parse().ok())
}

impl AgentConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path =
            std::env::var("DIAG_CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: AgentConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Environment variables override file config.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = var("DIAG_BIND_ADDRESS") {
            self.bind_address = bind;
        }
        if let Some(log_file) = var("DIAG_LOG_FILE") {
            self.log_file = log_file;
        }
        if let Some(cert) = var("DIAG_TLS_CERT") {
            self.tls_cert_path = cert;
        }
        if let Some(key) = var("DIAG_TLS_KEY") {
            self.tls_key_path = key;
        }
        if let Some(ca) = var("DIAG_TLS_CA") {
            self.tls_ca_path = ca;
        }
        if let Some(streams) = parsed(var("DIAG_MAX_STREAMS")) {
            self.max_concurrent_streams = streams;
        }
        self.search.apply_overrides(var);
    }

    /// Validate that configuration values are sane and TLS files exist
    /// when TLS is configured.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("bind_address must not be empty".to_string());
        }
        if self.max_concurrent_streams == 0 {
            return Err("max_concurrent_streams must be > 0".to_string());
        }
        self.search.validate()?;

        if self.tls_partially_configured() {
            return Err("tls_cert_path, tls_key_path and tls_ca_path must be set together".to_string());
        }
        if self.tls_enabled() {
            validate_file(&self.tls_cert_path, "TLS certificate")?;
            validate_file(&self.tls_key_path, "TLS key")?;
            validate_file(&self.tls_ca_path, "CA certificate")?;
        }
        Ok(())
    }
}

fn validate_file(path: &str, name: &str) -> Result<(), String> {
    if !Path::new(path).exists() {
        return Err(format!("{} not found at: {}", name, path));
    }
    Ok(())
}

impl SearchConfig {
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(size) = parsed(var("DIAG_SEARCH_BATCH_SIZE")) {
            self.batch_size = size;
        }
        if let Some(capacity) = parsed(var("DIAG_META_CACHE_CAPACITY")) {
            self.meta_cache_capacity = capacity;
        }
        if let Some(lines) = parsed(var("DIAG_PROBE_LINES")) {
            self.probe_lines = lines;
        }
        if let Some(stop) = parsed(var("DIAG_STOP_AT_WINDOW_END")) {
            self.stop_at_window_end = stop;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_validate_default_passes() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_bind_and_zero_streams() {
        let cfg = AgentConfig { bind_address: String::new(), ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = AgentConfig { max_concurrent_streams: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_partial_tls() {
        let cfg = AgentConfig { tls_cert_path: "agent.crt".into(), ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("together"));
    }

    #[test]
    fn test_validate_checks_tls_files_exist() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("agent.crt");
        let key = dir.path().join("agent.key");
        fs::write(&cert, "cert").unwrap();
        fs::write(&key, "key").unwrap();

        let cfg = AgentConfig {
            tls_cert_path: cert.display().to_string(),
            tls_key_path: key.display().to_string(),
            tls_ca_path: dir.path().join("missing-ca.crt").display().to_string(),
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().contains("CA certificate not found"));
    }

    #[test]
    fn test_validate_propagates_search_errors() {
        let mut cfg = AgentConfig::default();
        cfg.search.probe_lines = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        fs::write(
            &path,
            "bind_address = \"127.0.0.1:9000\"\nlog_file = \"/tmp/tidb.log\"\n[search]\nstop_at_window_end = false\n",
        )
        .unwrap();

        let cfg = AgentConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.bind_address, "127.0.0.1:9000");
        assert_eq!(cfg.log_file, "/tmp/tidb.log");
        assert!(!cfg.search.stop_at_window_end);
        assert_eq!(cfg.search.batch_size, 1024);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        fs::write(
            &path,
            "max_concurrent_streams = 4\n[search]\nbatch_size = 16\nprobe_lines = 3\nstop_at_window_end = true\n",
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("DIAG_MAX_STREAMS", "32"),
            ("DIAG_SEARCH_BATCH_SIZE", "256"),
            ("DIAG_META_CACHE_CAPACITY", "8"),
            ("DIAG_PROBE_LINES", "not-a-number"),
            ("DIAG_STOP_AT_WINDOW_END", "false"),
            ("DIAG_LOG_FILE", "/var/log/tidb.log"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AgentConfig::from_file(path.to_str().unwrap()).unwrap();
        cfg.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.max_concurrent_streams, 32);
        assert_eq!(cfg.search.batch_size, 256);
        assert_eq!(cfg.search.meta_cache_capacity, 8);
        // unparsable values leave the file value in place
        assert_eq!(cfg.search.probe_lines, 3);
        assert!(!cfg.search.stop_at_window_end);
        assert_eq!(cfg.log_file, "/var/log/tidb.log");
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        fs::write(&path, "bind_address = [").unwrap();
        assert!(AgentConfig::from_file(path.to_str().unwrap()).is_err());
    }
}
