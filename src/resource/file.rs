// SPDX-License-Identifier: AGPL-3.0-or-later
//! File resource: existence, ownership and mode of a path on a host

use crate::error::{HostcheckError, Result};
use crate::inventory::Host;

use super::{sh_quote, Probe};

/// Observed state of a path on a host
#[derive(Debug, Clone, PartialEq)]
pub struct FileStat {
    pub exists: bool,
    /// Owning user name, present when the file exists
    pub owner: Option<String>,
    /// Owning group name, present when the file exists
    pub group: Option<String>,
    /// Octal mode without leading zeros, e.g. `644`
    pub mode: Option<String>,
}

impl FileStat {
    fn missing() -> Self {
        Self {
            exists: false,
            owner: None,
            group: None,
            mode: None,
        }
    }
}

/// Query the state of `path` on `host`
pub async fn stat(probe: &Probe, host: &Host, path: &str) -> Result<FileStat> {
    let command = format!("stat -c '%U:%G:%a' -- {}", sh_quote(path));
    let output = probe.run(host, &command).await?;

    if output.status != 0 {
        // GNU and busybox stat both mention the missing path this way;
        // anything else (e.g. permission denied) is a query error.
        if output.stderr.contains("No such file or directory") {
            return Ok(FileStat::missing());
        }
        return Err(HostcheckError::QueryFailed {
            host: host.name.clone(),
            message: format!("stat failed for '{}': {}", path, output.stderr.trim()),
        });
    }

    parse_stat_line(output.stdout.trim()).ok_or_else(|| HostcheckError::QueryFailed {
        host: host.name.clone(),
        message: format!("Unparseable stat output for '{}': {}", path, output.stdout.trim()),
    })
}

fn parse_stat_line(line: &str) -> Option<FileStat> {
    let mut parts = line.splitn(3, ':');
    let owner = parts.next()?.to_string();
    let group = parts.next()?.to_string();
    let mode = parts.next()?.to_string();

    if owner.is_empty() || group.is_empty() || mode.is_empty() {
        return None;
    }

    Some(FileStat {
        exists: true,
        owner: Some(owner),
        group: Some(group),
        mode: Some(mode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::inventory::Connection;
    use std::fs;
    use tempfile::tempdir;

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
    fn test_parse_stat_line() {
        let stat = parse_stat_line("root:root:644").unwrap();
        assert!(stat.exists);
        assert_eq!(stat.owner.as_deref(), Some("root"));
        assert_eq!(stat.group.as_deref(), Some("root"));
        assert_eq!(stat.mode.as_deref(), Some("644"));
    }

    #[test]
    fn test_parse_stat_line_malformed() {
        assert!(parse_stat_line("root:root").is_none());
        assert!(parse_stat_line("").is_none());
        assert!(parse_stat_line("::644").is_none());
    }

    #[tokio::test]
    async fn test_stat_existing_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("present");
        fs::write(&path, "content").unwrap();

        let probe = Probe::new(ConnectionConfig::default());
        let stat = stat(&probe, &local_host(), path.to_str().unwrap())
            .await
            .unwrap();
        assert!(stat.exists);
        assert!(stat.owner.is_some());
        assert!(stat.group.is_some());
    }

    #[tokio::test]
    async fn test_stat_missing_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("absent");

        let probe = Probe::new(ConnectionConfig::default());
        let stat = stat(&probe, &local_host(), path.to_str().unwrap())
            .await
            .unwrap();
        assert!(!stat.exists);
        assert!(stat.owner.is_none());
    }

    #[tokio::test]
    async fn test_stat_path_with_spaces() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("with space");
        fs::write(&path, "content").unwrap();

        let probe = Probe::new(ConnectionConfig::default());
        let stat = stat(&probe, &local_host(), path.to_str().unwrap())
            .await
            .unwrap();
        assert!(stat.exists);
    }
}
