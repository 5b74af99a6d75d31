// SPDX-License-Identifier: AGPL-3.0-or-later
//! hostcheck: acceptance checks for provisioned hosts
//!
//! Resolves target hosts from an Ansible-style inventory (named by the
//! `HOSTCHECK_INVENTORY_FILE` environment variable) and runs read-only state
//! checks against each one: file existence and ownership, RPM package
//! installation, running processes. The process exits 0 iff every assertion
//! on every (check, host) pair holds.
//!
//! # Features
//!
//! * **Inventory resolution:** Ansible INI dialect with groups, children and
//!   host variables; group "all" is the union of every host
//! * **Suite files:** checks are data, defined in TOML; a built-in suite
//!   covers a provisioned WildFly application server host
//! * **Probe transport:** `sh -c` locally, batch-mode ssh remotely; query
//!   problems are reported separately from failed assertions

pub mod config;
pub mod error;
pub mod inventory;
pub mod resource;
pub mod suite;

pub use config::Config;
pub use error::{HostcheckError, Result};
