// SPDX-License-Identifier: AGPL-3.0-or-later
//! Suite file parser
//!
//! Suites are TOML files with a list of tagged `[[checks]]` tables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HostcheckError, Result};

/// A suite of checks run against every host of a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    /// Unique identifier for the suite
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Version of the suite
    #[serde(default = "default_version")]
    pub version: String,

    /// Inventory group the suite targets
    #[serde(default = "default_hosts")]
    pub hosts: String,

    /// Checks to run on each host
    pub checks: Vec<Check>,
}

/// A single read-only host state check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Check {
    /// Assert on a path's existence, ownership and mode
    File {
        /// Optional label for reports
        #[serde(default)]
        name: Option<String>,
        /// Path on the host
        path: String,
        /// Whether the path must exist
        #[serde(default = "default_true")]
        exists: bool,
        /// Expected owning user
        #[serde(default)]
        owner: Option<String>,
        /// Expected owning group
        #[serde(default)]
        group: Option<String>,
        /// Expected octal mode, e.g. "644"
        #[serde(default)]
        mode: Option<String>,
    },

    /// Assert on an RPM package's installation status
    Package {
        #[serde(default)]
        name: Option<String>,
        /// Package name as known to rpm
        package: String,
        /// Whether the package must be installed
        #[serde(default = "default_true")]
        installed: bool,
    },

    /// Assert on a running process by command name
    Process {
        #[serde(default)]
        name: Option<String>,
        /// Command name as reported by ps
        comm: String,
        /// Whether a matching process must be running
        #[serde(default = "default_true")]
        running: bool,
        /// User that must own at least one matching process
        #[serde(default)]
        user: Option<String>,
    },
}

impl Check {
    /// Label used in reports: the explicit name, or a derived one
    pub fn label(&self) -> String {
        match self {
            Check::File { name, path, .. } => name
                .clone()
                .unwrap_or_else(|| format!("file:{}", path)),
            Check::Package { name, package, .. } => name
                .clone()
                .unwrap_or_else(|| format!("package:{}", package)),
            Check::Process { name, comm, .. } => name
                .clone()
                .unwrap_or_else(|| format!("process:{}", comm)),
        }
    }
}

impl Suite {
    /// Parse a suite from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HostcheckError::SuiteNotFound {
                name: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let suite: Suite =
            toml::from_str(&contents).map_err(|e| HostcheckError::SuiteParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(suite)
    }

    /// The built-in acceptance suite for a provisioned WildFly host:
    /// `/etc/hosts` owned root:root, headless OpenJDK 8 installed.
    pub fn builtin() -> Self {
        Suite {
            name: "ee-worker".to_string(),
            description: "Acceptance checks for a provisioned WildFly application server host"
                .to_string(),
            version: default_version(),
            hosts: default_hosts(),
            checks: vec![
                Check::File {
                    name: Some("hosts-file".to_string()),
                    path: "/etc/hosts".to_string(),
                    exists: true,
                    owner: Some("root".to_string()),
                    group: Some("root".to_string()),
                    mode: None,
                },
                Check::Package {
                    name: Some("wildfly-jdk".to_string()),
                    package: "java-1.8.0-openjdk-headless".to_string(),
                    installed: true,
                },
            ],
        }
    }

    /// Validate the suite definition
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(HostcheckError::InvalidConfig {
                message: "Suite name cannot be empty".to_string(),
            });
        }

        if self.checks.is_empty() {
            return Err(HostcheckError::InvalidConfig {
                message: format!("Suite '{}' has no checks defined", self.name),
            });
        }

        for check in &self.checks {
            self.validate_check(check)?;
        }

        Ok(())
    }

    fn validate_check(&self, check: &Check) -> Result<()> {
        match check {
            Check::File {
                exists,
                owner,
                group,
                mode,
                path,
                ..
            } => {
                if !exists && (owner.is_some() || group.is_some() || mode.is_some()) {
                    return Err(HostcheckError::InvalidConfig {
                        message: format!(
                            "Check for '{}' asserts attributes on a file required to be absent",
                            path
                        ),
                    });
                }
                if let Some(mode) = mode {
                    let octal = mode.len() >= 3
                        && mode.len() <= 4
                        && mode.chars().all(|c| ('0'..='7').contains(&c));
                    if !octal {
                        return Err(HostcheckError::InvalidConfig {
                            message: format!("Invalid octal mode '{}' for '{}'", mode, path),
                        });
                    }
                }
            }
            Check::Package { package, .. } => {
                if package.is_empty() {
                    return Err(HostcheckError::InvalidConfig {
                        message: "Package check with empty package name".to_string(),
                    });
                }
            }
            Check::Process { comm, running, user, .. } => {
                if comm.is_empty() {
                    return Err(HostcheckError::InvalidConfig {
                        message: "Process check with empty command name".to_string(),
                    });
                }
                if !running && user.is_some() {
                    return Err(HostcheckError::InvalidConfig {
                        message: format!(
                            "Check for '{}' asserts a user on a process required to be absent",
                            comm
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

// Default value functions

fn default_version() -> String {
    "1.0".to_string()
}

fn default_hosts() -> String {
    "all".to_string()
}

fn default_true() -> bool {
    true
}
