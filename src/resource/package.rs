// SPDX-License-Identifier: AGPL-3.0-or-later
//! Package resource: RPM installation status on a host

use crate::error::{HostcheckError, Result};
use crate::inventory::Host;

use super::{sh_quote, Probe, ProbeOutput};

/// Observed installation state of a package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageStatus {
    pub installed: bool,
    /// `version-release` of the installed package
    pub version: Option<String>,
}

/// Query the RPM database on `host` for `name`
pub async fn query(probe: &Probe, host: &Host, name: &str) -> Result<PackageStatus> {
    let command = format!(
        "rpm -q --queryformat '%{{VERSION}}-%{{RELEASE}}' -- {}",
        sh_quote(name)
    );
    let output = probe.run(host, &command).await?;
    interpret(&output, &host.name, name)
}

fn interpret(output: &ProbeOutput, host: &str, name: &str) -> Result<PackageStatus> {
    match output.status {
        0 => {
            let version = output.stdout.trim();
            Ok(PackageStatus {
                installed: true,
                version: (!version.is_empty()).then(|| version.to_string()),
            })
        }
        // rpm -q exits 1 for "package X is not installed"
        1 => Ok(PackageStatus {
            installed: false,
            version: None,
        }),
        status => Err(HostcheckError::QueryFailed {
            host: host.to_string(),
            message: format!(
                "rpm -q '{}' exited with status {}: {}",
                name,
                status,
                output.stderr.trim()
            ),
        }),
    }
}
