// SPDX-License-Identifier: AGPL-3.0-or-later
//! Suite parsing and execution module
//!
//! A suite is a named list of read-only checks run against every host of a
//! target group. The built-in default suite covers a provisioned WildFly
//! application server host.

mod parser;
mod runner;

pub use parser::{Check, Suite};
pub use runner::{CheckResult, Outcome, SuiteReport, SuiteRunner};

use std::path::Path;

use crate::error::Result;

/// Load a suite from a file
pub fn load_suite<P: AsRef<Path>>(path: P) -> Result<Suite> {
    parser::Suite::from_file(path)
}

/// List all available suites in a directory
///
/// # Arguments
///
/// * `dir` - Directory containing suite files
///
/// # Returns
///
/// A sorted vector of suite names
pub fn list_suites<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut suites = Vec::new();

    if !dir.exists() {
        return Ok(suites);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext == "toml" {
                    if let Some(stem) = path.file_stem() {
                        suites.push(stem.to_string_lossy().to_string());
                    }
                }
            }
        }
    }

    suites.sort();
    Ok(suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_list_suites_empty_dir() {
        let temp_dir = tempdir().unwrap();
        let suites = list_suites(temp_dir.path()).unwrap();
        assert!(suites.is_empty());
    }

    #[test]
    fn test_list_suites_with_files() {
        let temp_dir = tempdir().unwrap();

        fs::write(temp_dir.path().join("ee-worker.toml"), "").unwrap();
        fs::write(temp_dir.path().join("web.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap(); // Should be ignored

        let suites = list_suites(temp_dir.path()).unwrap();
        assert_eq!(suites, vec!["ee-worker", "web"]);
    }

    #[test]
    fn test_list_suites_nonexistent_dir() {
        let suites = list_suites("/nonexistent/path").unwrap();
        assert!(suites.is_empty());
    }
}
