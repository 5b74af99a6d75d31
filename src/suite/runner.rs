// SPDX-License-Identifier: AGPL-3.0-or-later
//! Suite runner
//!
//! Runs every (check, host) pair exactly once, collecting independent
//! assertion failures without stopping the run. Query problems are reported
//! separately from failed assertions.

use serde::Serialize;
use tracing::{debug, error, info};

use super::{Check, Suite};
use crate::config::ConnectionConfig;
use crate::error::HostcheckError;
use crate::inventory::Host;
use crate::resource::{self, Probe};

/// Runs suites against resolved hosts
pub struct SuiteRunner {
    probe: Probe,
    /// Whether to skip probes and only report what would be checked
    dry_run: bool,
}

/// Outcome of one check on one host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
    /// Every asserted condition holds
    Passed,
    /// At least one asserted condition does not hold
    Failed { failures: Vec<String> },
    /// The underlying query could not be performed
    Errored { message: String },
}

/// Result of one (check, host) pair
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Inventory name of the host
    pub host: String,
    /// Check label
    pub check: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Duration of the check
    pub duration_ms: u64,
}

/// Result of running a complete suite
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    /// Name of the suite
    pub suite: String,
    /// True iff no check failed or errored
    pub success: bool,
    /// Number of hosts the suite ran against
    pub hosts: usize,
    /// Results for each (check, host) pair
    pub results: Vec<CheckResult>,
    pub checks_passed: usize,
    pub checks_failed: usize,
    pub checks_errored: usize,
    /// Total duration
    pub total_duration_ms: u64,
}

impl SuiteReport {
    /// Render the report as pretty-printed JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl SuiteRunner {
    /// Create a runner
    pub fn new(connection: ConnectionConfig, dry_run: bool) -> Self {
        Self {
            probe: Probe::new(connection),
            dry_run,
        }
    }

    /// Run a suite against the given hosts
    ///
    /// Every (check, host) pair runs exactly once; a failure or query error
    /// never stops the remaining pairs. Zero hosts yields an empty,
    /// successful report.
    pub async fn run(&self, suite: &Suite, hosts: &[Host]) -> SuiteReport {
        let start_time = std::time::Instant::now();
        let mut results = Vec::new();
        let mut checks_passed = 0usize;
        let mut checks_failed = 0usize;
        let mut checks_errored = 0usize;

        info!(
            suite = %suite.name,
            checks = suite.checks.len(),
            hosts = hosts.len(),
            "Starting suite run"
        );

        for host in hosts {
            for check in &suite.checks {
                let label = check.label();
                debug!(host = %host.name, check = %label, "Running check");

                let check_start = std::time::Instant::now();
                let outcome = if self.dry_run {
                    info!(host = %host.name, check = %label, "[DRY RUN] Would run check");
                    Outcome::Passed
                } else {
                    self.run_check(host, check).await
                };
                let duration_ms = check_start.elapsed().as_millis() as u64;

                match &outcome {
                    Outcome::Passed => checks_passed += 1,
                    Outcome::Failed { failures } => {
                        checks_failed += 1;
                        error!(
                            host = %host.name,
                            check = %label,
                            failures = failures.len(),
                            "Check failed"
                        );
                    }
                    Outcome::Errored { message } => {
                        checks_errored += 1;
                        error!(
                            host = %host.name,
                            check = %label,
                            error = %message,
                            "Check could not be performed"
                        );
                    }
                }

                results.push(CheckResult {
                    host: host.name.clone(),
                    check: label,
                    outcome,
                    duration_ms,
                });
            }
        }

        let total_duration_ms = start_time.elapsed().as_millis() as u64;
        let success = checks_failed == 0 && checks_errored == 0;

        info!(
            suite = %suite.name,
            success = success,
            duration_ms = total_duration_ms,
            passed = checks_passed,
            failed = checks_failed,
            errored = checks_errored,
            "Suite run completed"
        );

        SuiteReport {
            suite: suite.name.clone(),
            success,
            hosts: hosts.len(),
            results,
            checks_passed,
            checks_failed,
            checks_errored,
            total_duration_ms,
        }
    }

    /// Run a single check on a single host
    async fn run_check(&self, host: &Host, check: &Check) -> Outcome {
        let result = match check {
            Check::File {
                path,
                exists,
                owner,
                group,
                mode,
                ..
            } => {
                self.check_file(host, path, *exists, owner.as_deref(), group.as_deref(), mode.as_deref())
                    .await
            }
            Check::Package {
                package, installed, ..
            } => self.check_package(host, package, *installed).await,
            Check::Process {
                comm, running, user, ..
            } => self.check_process(host, comm, *running, user.as_deref()).await,
        };

        match result {
            Ok(failures) if failures.is_empty() => Outcome::Passed,
            Ok(failures) => Outcome::Failed { failures },
            Err(e) => Outcome::Errored {
                message: e.to_string(),
            },
        }
    }

    async fn check_file(
        &self,
        host: &Host,
        path: &str,
        exists: bool,
        owner: Option<&str>,
        group: Option<&str>,
        mode: Option<&str>,
    ) -> Result<Vec<String>, HostcheckError> {
        let stat = resource::file::stat(&self.probe, host, path).await?;
        let mut failures = Vec::new();

        if !exists {
            if stat.exists {
                failures.push(format!("{}: file exists but is required to be absent", path));
            }
            return Ok(failures);
        }

        if !stat.exists {
            failures.push(format!("{}: file does not exist", path));
            // Remaining conditions are independent in intent; report them
            // as unverifiable rather than dropping them silently.
            if let Some(owner) = owner {
                failures.push(format!("{}: owner '{}' not verifiable, file missing", path, owner));
            }
            if let Some(group) = group {
                failures.push(format!("{}: group '{}' not verifiable, file missing", path, group));
            }
            if let Some(mode) = mode {
                failures.push(format!("{}: mode '{}' not verifiable, file missing", path, mode));
            }
            return Ok(failures);
        }

        if let (Some(expected), Some(found)) = (owner, stat.owner.as_deref()) {
            if expected != found {
                failures.push(format!(
                    "{}: expected owner '{}', found '{}'",
                    path, expected, found
                ));
            }
        }

        if let (Some(expected), Some(found)) = (group, stat.group.as_deref()) {
            if expected != found {
                failures.push(format!(
                    "{}: expected group '{}', found '{}'",
                    path, expected, found
                ));
            }
        }

        if let (Some(expected), Some(found)) = (mode, stat.mode.as_deref()) {
            if !modes_equal(expected, found) {
                failures.push(format!(
                    "{}: expected mode '{}', found '{}'",
                    path, expected, found
                ));
            }
        }

        Ok(failures)
    }

    async fn check_package(
        &self,
        host: &Host,
        package: &str,
        installed: bool,
    ) -> Result<Vec<String>, HostcheckError> {
        let status = resource::package::query(&self.probe, host, package).await?;
        let mut failures = Vec::new();

        if installed && !status.installed {
            failures.push(format!("package '{}' is not installed", package));
        } else if !installed && status.installed {
            failures.push(format!(
                "package '{}' is installed but is required to be absent",
                package
            ));
        }

        Ok(failures)
    }

    async fn check_process(
        &self,
        host: &Host,
        comm: &str,
        running: bool,
        user: Option<&str>,
    ) -> Result<Vec<String>, HostcheckError> {
        let status = resource::process::query(&self.probe, host, comm).await?;
        let mut failures = Vec::new();

        if running && !status.running {
            failures.push(format!("process '{}' is not running", comm));
            if let Some(user) = user {
                failures.push(format!(
                    "process '{}': user '{}' not verifiable, process missing",
                    comm, user
                ));
            }
            return Ok(failures);
        }

        if !running && status.running {
            failures.push(format!(
                "process '{}' is running but is required to be absent",
                comm
            ));
            return Ok(failures);
        }

        if let Some(expected) = user {
            if status.running && !status.users.iter().any(|u| u == expected) {
                failures.push(format!(
                    "process '{}': no instance owned by '{}' (owners: {})",
                    comm,
                    expected,
                    status.users.join(", ")
                ));
            }
        }

        Ok(failures)
    }
}

/// Compare an asserted octal mode against stat output
///
/// stat %a prints without leading zeros, so "0644" must match "644" and
/// "000" must match "0".
fn modes_equal(expected: &str, found: &str) -> bool {
    match (
        u32::from_str_radix(expected, 8),
        u32::from_str_radix(found, 8),
    ) {
        (Ok(e), Ok(f)) => e == f,
        _ => expected == found,
    }
}
