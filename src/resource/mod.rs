// SPDX-License-Identifier: AGPL-3.0-or-later
//! Read-only resource queries against hosts
//!
//! Each resource (file, package, process) is a queryable projection of host
//! state, backed by a probe command run on the target: `sh -c` locally, ssh
//! in batch mode remotely. Probes never mutate anything.

pub mod file;
pub mod package;
pub mod process;

pub use file::FileStat;
pub use package::PackageStatus;
pub use process::ProcessStatus;

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{HostcheckError, Result};
use crate::inventory::{Connection, Host};

/// Runs probe commands on hosts
pub struct Probe {
    config: ConnectionConfig,
}

/// Captured output of a completed probe command
#[derive(Debug)]
pub struct ProbeOutput {
    /// Exit status of the probe
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Probe {
    /// Create a probe runner from connection settings
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Run a probe command on a host
    ///
    /// A non-zero exit status is data for the caller (e.g. `rpm -q` on an
    /// absent package). Transport-level problems are query errors: spawn
    /// failure, timeout, signal termination, ssh exit 255, and exit 127
    /// (probe command missing on the host).
    pub async fn run(&self, host: &Host, command: &str) -> Result<ProbeOutput> {
        debug!(host = %host.name, command = %command, "Running probe");

        let mut probe = match host.connection {
            Connection::Local => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(command);
                cmd
            }
            Connection::Ssh => {
                let mut cmd = Command::new("ssh");
                cmd.arg("-o").arg("BatchMode=yes");
                cmd.arg("-o")
                    .arg(format!("ConnectTimeout={}", self.config.connect_timeout_secs));
                for option in &self.config.ssh_options {
                    cmd.arg("-o").arg(option);
                }
                if let Some(port) = host.port {
                    cmd.arg("-p").arg(port.to_string());
                }
                if let Some(user) = &host.user {
                    cmd.arg("-l").arg(user);
                }
                cmd.arg(&host.address).arg(command);
                cmd
            }
        };

        probe.stdin(Stdio::null());
        probe.stdout(Stdio::piped());
        probe.stderr(Stdio::piped());
        // A timed-out probe must not leave the child running when its
        // wait future is dropped.
        probe.kill_on_drop(true);

        let duration = Duration::from_secs(self.config.command_timeout_secs);
        let child = probe.spawn().map_err(|e| HostcheckError::QueryFailed {
            host: host.name.clone(),
            message: format!("Failed to spawn probe: {}", e),
        })?;

        let output = match timeout(duration, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(HostcheckError::QueryFailed {
                    host: host.name.clone(),
                    message: format!("Failed to run probe: {}", e),
                })
            }
            Err(_) => {
                return Err(HostcheckError::QueryFailed {
                    host: host.name.clone(),
                    message: format!(
                        "Probe timed out after {} seconds",
                        self.config.command_timeout_secs
                    ),
                })
            }
        };

        let status = output.status.code().ok_or_else(|| HostcheckError::QueryFailed {
            host: host.name.clone(),
            message: "Probe terminated by signal".to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if status == 127 {
            return Err(HostcheckError::QueryFailed {
                host: host.name.clone(),
                message: format!("Probe command not available on host: {}", stderr.trim()),
            });
        }

        if host.connection == Connection::Ssh && status == 255 {
            return Err(HostcheckError::QueryFailed {
                host: host.name.clone(),
                message: format!("ssh transport failure: {}", stderr.trim()),
            });
        }

        Ok(ProbeOutput {
            status,
            stdout,
            stderr,
        })
    }
}

/// Quote a string for safe interpolation into a `sh` command line
pub(crate) fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_host() -> Host {
        Host {
            name: "localhost".to_string(),
            address: "localhost".to_string(),
            user: None,
            port: None,
            connection: Connection::Local,
        }
    }

    #[test]
    fn test_sh_quote_plain() {
        assert_eq!(sh_quote("/etc/hosts"), "'/etc/hosts'");
    }

    #[test]
    fn test_sh_quote_embedded_quote() {
        assert_eq!(sh_quote("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn test_probe_captures_stdout() {
        let probe = Probe::new(ConnectionConfig::default());
        let output = probe.run(&local_host(), "echo probe-output").await.unwrap();
        assert_eq!(output.status, 0);
        assert!(output.stdout.contains("probe-output"));
    }

    #[tokio::test]
    async fn test_probe_nonzero_status_is_data() {
        let probe = Probe::new(ConnectionConfig::default());
        let output = probe.run(&local_host(), "exit 3").await.unwrap();
        assert_eq!(output.status, 3);
    }

    #[tokio::test]
    async fn test_probe_missing_command_is_query_error() {
        let probe = Probe::new(ConnectionConfig::default());
        let err = probe
            .run(&local_host(), "definitely-not-a-command-7f3a")
            .await
            .unwrap_err();
        assert!(matches!(err, HostcheckError::QueryFailed { .. }));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let config = ConnectionConfig {
            command_timeout_secs: 1,
            ..ConnectionConfig::default()
        };
        let probe = Probe::new(config);
        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("marker");
        let command = format!("sleep 2 && touch '{}'", marker.display());

        let err = probe.run(&local_host(), &command).await.unwrap_err();
        match err {
            HostcheckError::QueryFailed { message, .. } => {
                assert!(message.contains("timed out"));
            }
            other => panic!("Expected QueryFailed, got {:?}", other),
        }

        // The timed-out child must be killed, not left to finish
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!marker.exists());
    }
}
