//! Configuration types for the cBackup shell client.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Client configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheduler connection settings
    pub scheduler: SchedulerSettings,
    /// Timeout settings
    pub timeouts: TimeoutSettings,
}

impl ClientConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the raw settings and produce the immutable session
    /// configuration used for connecting.
    ///
    /// Every missing or out-of-range value is a configuration error; nothing
    /// here touches the network. The host falls back to the container
    /// service name or loopback when unset (see [`SchedulerSettings::default_host`]).
    pub fn resolve(&self) -> Result<SessionConfig> {
        let host = match self.scheduler.host.trim() {
            "" => SchedulerSettings::default_host(),
            host => host.to_string(),
        };
        if self.scheduler.port == 0 {
            return Err(Error::Config(
                "scheduler.port is not configured".to_string(),
            ));
        }
        if self.scheduler.username.trim().is_empty() {
            return Err(Error::Config(
                "scheduler.username is not configured".to_string(),
            ));
        }
        if self.scheduler.password.is_empty() {
            return Err(Error::Config(
                "scheduler.password is not configured".to_string(),
            ));
        }
        self.timeouts.validate()?;

        Ok(SessionConfig {
            host,
            port: self.scheduler.port,
            username: self.scheduler.username.clone(),
            password: self.scheduler.password.clone(),
            connect_timeout: Duration::from_secs(self.timeouts.connect_secs),
            greeting_timeout: Duration::from_secs(self.timeouts.greeting_secs),
            command_timeout: Duration::from_secs(self.timeouts.command_secs),
        })
    }
}

/// Scheduler connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Scheduler host; empty means "use the environment default"
    pub host: String,
    /// Scheduler shell port (0 = not configured)
    pub port: u16,
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl SchedulerSettings {
    /// Default scheduler host for the current environment.
    ///
    /// Inside a container the scheduler runs as the `worker` service;
    /// everywhere else it is expected on loopback.
    pub fn default_host() -> String {
        let containerized = std::env::var("DOCKER_CONTAINER")
            .map(|v| v == "true")
            .unwrap_or(false)
            || std::env::var("container").map(|v| v == "docker").unwrap_or(false);
        if containerized {
            "worker".to_string()
        } else {
            "127.0.0.1".to_string()
        }
    }
}

// Credentials stay out of log output.
impl std::fmt::Debug for SchedulerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Timeout settings, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// TCP connect + SSH handshake budget
    pub connect_secs: u64,
    /// Wait for the login greeting prompt
    pub greeting_secs: u64,
    /// Wait for a command's complete response frame
    pub command_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            greeting_secs: 15,
            command_secs: 30,
        }
    }
}

impl TimeoutSettings {
    /// Validate timeout values.
    pub fn validate(&self) -> Result<()> {
        if self.connect_secs == 0 || self.greeting_secs == 0 || self.command_secs == 0 {
            return Err(Error::Config("timeouts must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Resolved, validated connection parameters for one logical session.
///
/// Constructed by [`ClientConfig::resolve`] and immutable thereafter. Cloning
/// is cheap and safe; the value is read-only after construction.
#[derive(Clone)]
pub struct SessionConfig {
    /// Scheduler host
    pub host: String,
    /// Scheduler shell port
    pub port: u16,
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
    /// TCP connect + SSH handshake budget
    pub connect_timeout: Duration,
    /// Wait for the login greeting prompt
    pub greeting_timeout: Duration,
    /// Wait for a command's complete response frame
    pub command_timeout: Duration,
}

impl SessionConfig {
    /// The `host:port` endpoint string, for log and error context.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("greeting_timeout", &self.greeting_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ClientConfig {
        ClientConfig {
            scheduler: SchedulerSettings {
                host: "worker".to_string(),
                port: 8437,
                username: "cbadmin".to_string(),
                password: "secret".to_string(),
            },
            timeouts: TimeoutSettings::default(),
        }
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = TimeoutSettings::default();
        assert_eq!(timeouts.connect_secs, 5);
        assert_eq!(timeouts.greeting_secs, 15);
        assert_eq!(timeouts.command_secs, 30);
    }

    #[test]
    fn test_resolve_valid_config() {
        let config = valid_config();
        let session = config.resolve().unwrap();
        assert_eq!(session.host, "worker");
        assert_eq!(session.port, 8437);
        assert_eq!(session.username, "cbadmin");
        assert_eq!(session.connect_timeout, Duration::from_secs(5));
        assert_eq!(session.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_port_is_config_error() {
        let mut config = valid_config();
        config.scheduler.port = 0;
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("scheduler.port"));
    }

    #[test]
    fn test_missing_username_is_config_error() {
        let mut config = valid_config();
        config.scheduler.username = String::new();
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("scheduler.username"));
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let mut config = valid_config();
        config.scheduler.password = String::new();
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("scheduler.password"));
    }

    #[test]
    fn test_empty_host_falls_back_to_default() {
        let mut config = valid_config();
        config.scheduler.host = "  ".to_string();
        let session = config.resolve().unwrap();
        // Exact value depends on the environment; it must never stay blank.
        assert!(!session.host.trim().is_empty());
    }

    #[test]
    fn test_zero_timeout_is_config_error() {
        let mut config = valid_config();
        config.timeouts.command_secs = 0;
        assert!(matches!(config.resolve(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
scheduler:
  host: worker
  port: 8437
  username: cbadmin
  password: secret

timeouts:
  connect_secs: 10
  greeting_secs: 20
  command_secs: 60
"#;
        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.scheduler.host, "worker");
        assert_eq!(config.scheduler.port, 8437);
        assert_eq!(config.timeouts.connect_secs, 10);
        assert_eq!(config.timeouts.command_secs, 60);
    }

    #[test]
    fn test_parse_yaml_partial_uses_defaults() {
        let yaml = r#"
scheduler:
  port: 8437
  username: cbadmin
  password: secret
"#;
        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.scheduler.host, "");
        assert_eq!(config.timeouts.greeting_secs, 15);
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = ClientConfig::from_yaml("scheduler: [not, a, map]");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = valid_config();
        let debug = format!("{:?}", config.scheduler);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));

        let session = config.resolve().unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_endpoint_format() {
        let session = valid_config().resolve().unwrap();
        assert_eq!(session.endpoint(), "worker:8437");
    }
}
