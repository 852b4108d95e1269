//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `inksync.toml` in the working directory, or the file named by
//! `INKSYNC_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Where the device writes module descriptors and key configs.
    pub modules: ModulesConfig,
    /// Companion agent on the user's computer.
    pub pc: PcConfig,
    /// Egress client of `web_request` actions.
    pub web: WebConfig,
    pub engine: EngineConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Directory holding `module1.json` and `module2.json`.
    pub modules_dir: PathBuf,
    /// Directory holding one `{uuid}.json` key config per module.
    pub configs_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PcConfig {
    /// Base URL of the agent. Without one, PC primitives go to an
    /// in-memory virtual PC.
    pub agent_url: Option<String>,
    pub timeout_ms: u64,
    /// Primitives the virtual PC remembers.
    pub virtual_history: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub timeout_ms: u64,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the in-process event bus. Slow run-stream subscribers
    /// miss events beyond it.
    pub event_capacity: usize,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or a
    /// setting is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("INKSYNC_CONFIG").unwrap_or_else(|_| "inksync.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("INKSYNC_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("INKSYNC_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("INKSYNC_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("INKSYNC_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("INKSYNC_MODULES_DIR") {
            self.modules.modules_dir = val.into();
        }
        if let Some(val) = var("INKSYNC_CONFIGS_DIR") {
            self.modules.configs_dir = val.into();
        }
        if let Some(val) = var("INKSYNC_PC_AGENT_URL") {
            self.pc.agent_url = Some(val).filter(|url| !url.is_empty());
        }
        if let Some(val) = var("INKSYNC_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be non-zero".to_string(),
            ));
        }
        if self.pc.timeout_ms == 0 || self.web.timeout_ms == 0 {
            return Err(ConfigError::Validation("timeouts must be non-zero".to_string()));
        }
        if self.engine.event_capacity == 0 {
            return Err(ConfigError::Validation(
                "engine.event_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn pc_timeout(&self) -> Duration {
        Duration::from_millis(self.pc.timeout_ms)
    }

    #[must_use]
    pub fn web_timeout(&self) -> Duration {
        Duration::from_millis(self.web.timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:inksync.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "inksyncd=info,inksync=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            modules_dir: PathBuf::from("data/modules"),
            configs_dir: PathBuf::from("data/configs"),
        }
    }
}

impl Default for PcConfig {
    fn default() -> Self {
        Self {
            agent_url: None,
            timeout_ms: 5_000,
            virtual_history: 1024,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { event_capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.database.url, "sqlite:inksync.db?mode=rwc");
        assert!(config.pc.agent_url.is_none());
        assert_eq!(config.engine.event_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.web.timeout_ms, 10_000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'
            max_connections = 2

            [logging]
            filter = 'debug'

            [modules]
            modules_dir = '/srv/modules'
            configs_dir = '/srv/configs'

            [pc]
            agent_url = 'http://10.0.0.5:8765'
            timeout_ms = 800

            [web]
            timeout_ms = 3000
            user_agent = 'desk'

            [engine]
            event_capacity = 32
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.modules.configs_dir, PathBuf::from("/srv/configs"));
        assert_eq!(config.pc.agent_url.as_deref(), Some("http://10.0.0.5:8765"));
        assert_eq!(config.pc_timeout(), Duration::from_millis(800));
        assert_eq!(config.web.user_agent.as_deref(), Some("desk"));
        assert_eq!(config.engine.event_capacity, 32);
    }

    #[test]
    fn should_reject_mistyped_values() {
        let result: Result<Config, _> = toml::from_str("[server]\nport = 'eighty'");
        assert!(result.is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_let_env_override_file_values() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("INKSYNC_BIND", "127.0.0.1:4000"),
            ("INKSYNC_DATABASE_URL", "sqlite::memory:"),
            ("INKSYNC_PC_AGENT_URL", "http://pc:8765"),
            ("INKSYNC_LOG", "debug"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.pc.agent_url.as_deref(), Some("http://pc:8765"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_prefer_rust_log_over_inksync_log() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("INKSYNC_LOG", "debug"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_clear_agent_with_empty_env_value() {
        let mut config = Config::default();
        config.pc.agent_url = Some("http://pc:8765".to_string());
        config.apply_env_overrides(env(&[("INKSYNC_PC_AGENT_URL", "")]));
        assert!(config.pc.agent_url.is_none());
    }

    #[test]
    fn should_ignore_unparseable_port_override() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("INKSYNC_PORT", "http")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_out_of_range_settings() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pc.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.event_capacity = 0;
        assert!(config.validate().is_err());
    }
}
