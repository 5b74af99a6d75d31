// SPDX-License-Identifier: AGPL-3.0-or-later
//! Process resource: running state of a command on a host

use crate::error::Result;
use crate::inventory::Host;

use super::{sh_quote, Probe, ProbeOutput};

/// Observed state of processes matching a command name
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStatus {
    pub running: bool,
    /// Users owning at least one matching process
    pub users: Vec<String>,
}

/// Query `host` for processes whose command name is `comm`
pub async fn query(probe: &Probe, host: &Host, comm: &str) -> Result<ProcessStatus> {
    let command = format!("ps -o user= -C {}", sh_quote(comm));
    let output = probe.run(host, &command).await?;
    Ok(interpret(&output))
}

fn interpret(output: &ProbeOutput) -> ProcessStatus {
    // ps -C exits 1 when nothing matches
    if output.status != 0 {
        return ProcessStatus {
            running: false,
            users: Vec::new(),
        };
    }

    let mut users: Vec<String> = Vec::new();
    for line in output.stdout.lines() {
        let user = line.trim();
        if !user.is_empty() && !users.iter().any(|u| u == user) {
            users.push(user.to_string());
        }
    }

    ProcessStatus {
        running: !users.is_empty(),
        users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(status: i32, stdout: &str) -> ProbeOutput {
        ProbeOutput {
            status,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_interpret_running() {
        let status = interpret(&output(0, "root\nroot\nwildfly\n"));
        assert!(status.running);
        assert_eq!(status.users, vec!["root", "wildfly"]);
    }

    #[test]
    fn test_interpret_not_running() {
        let status = interpret(&output(1, ""));
        assert!(!status.running);
        assert!(status.users.is_empty());
    }

    #[test]
    fn test_interpret_blank_output() {
        let status = interpret(&output(0, "\n  \n"));
        assert!(!status.running);
    }
}
