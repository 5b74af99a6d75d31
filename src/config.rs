// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration management for hostcheck

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HostcheckError, Result};

/// Main configuration structure for hostcheck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instance name, used in log and report headers
    pub name: String,

    /// Version of the configuration format
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory containing suite files
    #[serde(default = "default_suite_dir")]
    pub suite_dir: PathBuf,

    /// Fallback inventory file, used when neither the --inventory flag
    /// nor the inventory environment variable is set
    pub inventory_file: Option<PathBuf>,

    /// Connection settings for host probes
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for running probe commands on hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Per-probe command timeout in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// ssh connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Extra `-o` options passed to ssh
    #[serde(default)]
    pub ssh_options: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            ssh_options: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "hostcheck".to_string(),
            version: default_version(),
            suite_dir: default_suite_dir(),
            inventory_file: None,
            connection: ConnectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HostcheckError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(HostcheckError::InvalidConfig {
                message: "Instance name cannot be empty".to_string(),
            });
        }

        if self.connection.command_timeout_secs == 0 {
            return Err(HostcheckError::InvalidConfig {
                message: "command_timeout_secs must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

// Default value functions

fn default_version() -> String {
    "1.0".to_string()
}

fn default_suite_dir() -> PathBuf {
    PathBuf::from("suites")
}

fn default_command_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.name, "hostcheck");
        assert_eq!(config.version, "1.0");
        assert_eq!(config.suite_dir, PathBuf::from("suites"));
        assert_eq!(config.connection.command_timeout_secs, 30);
        assert!(config.inventory_file.is_none());
    }

    #[test]
    fn test_config_validation_empty_name() {
        let mut config = Config::default();
        config.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.connection.command_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_content = r#"
            name = "acceptance"
            version = "1.0"
            suite_dir = "/etc/hostcheck/suites"
            inventory_file = "/etc/hostcheck/inventory"

            [connection]
            command_timeout_secs = 15
            connect_timeout_secs = 5
            ssh_options = ["StrictHostKeyChecking=no"]

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.name, "acceptance");
        assert_eq!(config.suite_dir, PathBuf::from("/etc/hostcheck/suites"));
        assert_eq!(
            config.inventory_file,
            Some(PathBuf::from("/etc/hostcheck/inventory"))
        );
        assert_eq!(config.connection.command_timeout_secs, 15);
        assert_eq!(config.connection.ssh_options.len(), 1);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/hostcheck.toml").unwrap_err();
        assert!(matches!(err, HostcheckError::ConfigNotFound { .. }));
    }
}
