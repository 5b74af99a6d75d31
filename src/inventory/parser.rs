// SPDX-License-Identifier: AGPL-3.0-or-later
//! Ansible-style INI inventory parser
//!
//! Supports `[group]` sections, `[group:children]` references and host
//! variables (`ansible_host`, `ansible_user`, `ansible_port`,
//! `ansible_connection`). `[group:vars]` sections are accepted and skipped.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use super::{Connection, Host};
use crate::error::{HostcheckError, Result};

/// Group name that resolves to every host in the file
pub const ALL_GROUP: &str = "all";

/// Implicit group for hosts listed before any section header
const UNGROUPED: &str = "ungrouped";

/// A host line as written in the inventory
#[derive(Debug, Clone)]
struct HostEntry {
    name: String,
    vars: HashMap<String, String>,
}

/// A parsed inventory
#[derive(Debug, Default)]
pub struct Inventory {
    /// Hosts in file order, deduplicated by name
    entries: Vec<HostEntry>,
    /// Direct members per group, by host name
    groups: BTreeMap<String, Vec<String>>,
    /// Child groups per group
    children: BTreeMap<String, Vec<String>>,
}

/// What the current section header collects
enum Section {
    Hosts(String),
    Children(String),
    Vars(String),
}

impl Inventory {
    /// Parse an inventory from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HostcheckError::InventoryNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|message| HostcheckError::InventoryParse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse inventory contents
    fn parse(contents: &str) -> std::result::Result<Self, String> {
        let mut inventory = Inventory::default();
        let mut section = Section::Hosts(UNGROUPED.to_string());

        for (number, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                section = parse_section_header(line)
                    .map_err(|m| format!("line {}: {}", number + 1, m))?;
                match &section {
                    Section::Hosts(name) | Section::Vars(name) => {
                        // A vars section defines its group even when no host
                        // section for it exists.
                        inventory.groups.entry(name.clone()).or_default();
                    }
                    Section::Children(name) => {
                        inventory.children.entry(name.clone()).or_default();
                    }
                }
                continue;
            }

            match &section {
                Section::Hosts(group) => {
                    let entry = parse_host_line(line)
                        .map_err(|m| format!("line {}: {}", number + 1, m))?;
                    inventory.add_host(group.clone(), entry);
                }
                Section::Children(group) => {
                    if line.split_whitespace().count() != 1 {
                        return Err(format!(
                            "line {}: expected a single group name, got '{}'",
                            number + 1,
                            line
                        ));
                    }
                    let group = group.clone();
                    inventory
                        .children
                        .entry(group)
                        .or_default()
                        .push(line.to_string());
                }
                Section::Vars(_) => {}
            }
        }

        Ok(inventory)
    }

    fn add_host(&mut self, group: String, entry: HostEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => existing.vars.extend(entry.vars),
            None => self.entries.push(entry.clone()),
        }

        let members = self.groups.entry(group).or_default();
        if !members.contains(&entry.name) {
            members.push(entry.name);
        }
    }

    /// Resolve a group to its hosts
    ///
    /// `"all"` yields every host in file order. Other group names resolve
    /// direct members plus `:children` groups, recursively. Asking for a
    /// group the file never defines is an error; an empty defined group
    /// resolves to an empty set.
    pub fn get_hosts(&self, group: &str) -> Result<Vec<Host>> {
        if group == ALL_GROUP {
            return Ok(self.entries.iter().map(host_from_entry).collect());
        }

        let mut names = Vec::new();
        let mut visited = BTreeSet::new();
        self.collect_group(group, &mut names, &mut visited)?;

        // Every collected name was registered through add_host, so filtering
        // the entry list covers them all, in file order.
        Ok(self
            .entries
            .iter()
            .filter(|e| names.contains(&e.name))
            .map(host_from_entry)
            .collect())
    }

    fn collect_group(
        &self,
        group: &str,
        names: &mut Vec<String>,
        visited: &mut BTreeSet<String>,
    ) -> Result<()> {
        if !visited.insert(group.to_string()) {
            return Ok(());
        }

        let direct = self.groups.get(group);
        let nested = self.children.get(group);

        if direct.is_none() && nested.is_none() {
            return Err(HostcheckError::UnknownGroup {
                group: group.to_string(),
            });
        }

        if let Some(members) = direct {
            for name in members {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }

        if let Some(groups) = nested {
            for child in groups {
                self.collect_group(child, names, visited)?;
            }
        }

        Ok(())
    }

}

fn parse_section_header(line: &str) -> std::result::Result<Section, String> {
    if !line.ends_with(']') {
        return Err(format!("malformed section header '{}'", line));
    }

    let inner = &line[1..line.len() - 1];
    if inner.is_empty() {
        return Err("empty section header".to_string());
    }

    match inner.split_once(':') {
        None => Ok(Section::Hosts(inner.to_string())),
        Some((name, "children")) => Ok(Section::Children(name.to_string())),
        Some((name, "vars")) => Ok(Section::Vars(name.to_string())),
        Some((_, suffix)) => Err(format!("unsupported section suffix ':{}'", suffix)),
    }
}

fn parse_host_line(line: &str) -> std::result::Result<HostEntry, String> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or("empty host line")?.to_string();

    let mut vars = HashMap::new();
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{}'", token))?;
        if key == "ansible_port" && value.parse::<u16>().is_err() {
            return Err(format!("invalid ansible_port '{}'", value));
        }
        vars.insert(key.to_string(), value.to_string());
    }

    Ok(HostEntry { name, vars })
}

fn host_from_entry(entry: &HostEntry) -> Host {
    let address = entry
        .vars
        .get("ansible_host")
        .cloned()
        .unwrap_or_else(|| entry.name.clone());

    let connection = match entry.vars.get("ansible_connection").map(String::as_str) {
        Some("local") => Connection::Local,
        Some(_) => Connection::Ssh,
        // Implicit localhost behaves like Ansible's: no ssh round-trip.
        None if is_loopback(&address) => Connection::Local,
        None => Connection::Ssh,
    };

    Host {
        name: entry.name.clone(),
        address,
        user: entry.vars.get("ansible_user").cloned(),
        port: entry
            .vars
            .get("ansible_port")
            .and_then(|p| p.parse().ok()),
        connection,
    }
}

fn is_loopback(address: &str) -> bool {
    matches!(address, "localhost" | "127.0.0.1" | "::1")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# molecule-style inventory
ungrouped-host

[workers]
worker1 ansible_host=10.0.0.1 ansible_user=deploy
worker2 ansible_host=10.0.0.2 ansible_port=2222

[masters]
master1 ansible_host=10.0.1.1

[cluster:children]
workers
masters

[workers:vars]
java_version=1.8.0
"#;

    #[test]
    fn test_parse_all_hosts() {
        let inventory = Inventory::parse(SAMPLE).unwrap();
        let hosts = inventory.get_hosts(ALL_GROUP).unwrap();
        let names: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["ungrouped-host", "worker1", "worker2", "master1"]);
    }

    #[test]
    fn test_host_vars() {
        let inventory = Inventory::parse(SAMPLE).unwrap();
        let hosts = inventory.get_hosts("workers").unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].address, "10.0.0.1");
        assert_eq!(hosts[0].user.as_deref(), Some("deploy"));
        assert_eq!(hosts[1].port, Some(2222));
        assert_eq!(hosts[0].connection, Connection::Ssh);
    }

    #[test]
    fn test_children_resolution() {
        let inventory = Inventory::parse(SAMPLE).unwrap();
        let hosts = inventory.get_hosts("cluster").unwrap();
        let names: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["worker1", "worker2", "master1"]);
    }

    #[test]
    fn test_ungrouped() {
        let inventory = Inventory::parse(SAMPLE).unwrap();
        let hosts = inventory.get_hosts("ungrouped").unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].name, "ungrouped-host");
    }

    #[test]
    fn test_unknown_group() {
        let inventory = Inventory::parse(SAMPLE).unwrap();
        let err = inventory.get_hosts("typo").unwrap_err();
        assert!(matches!(err, HostcheckError::UnknownGroup { .. }));
    }

    #[test]
    fn test_empty_group_resolves_empty() {
        let inventory = Inventory::parse("[idle]\n").unwrap();
        let hosts = inventory.get_hosts("idle").unwrap();
        assert!(hosts.is_empty());
    }

    #[test]
    fn test_vars_section_defines_group() {
        let inventory = Inventory::parse("[workers:vars]\njava_version=1.8.0\n").unwrap();
        let hosts = inventory.get_hosts("workers").unwrap();
        assert!(hosts.is_empty());
    }

    #[test]
    fn test_empty_inventory_all() {
        let inventory = Inventory::parse("# nothing here\n").unwrap();
        let hosts = inventory.get_hosts(ALL_GROUP).unwrap();
        assert!(hosts.is_empty());
    }

    #[test]
    fn test_duplicate_host_merges_vars() {
        let contents = "[a]\nhost1 ansible_host=10.0.0.1\n[b]\nhost1 ansible_user=deploy\n";
        let inventory = Inventory::parse(contents).unwrap();
        let hosts = inventory.get_hosts(ALL_GROUP).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, "10.0.0.1");
        assert_eq!(hosts[0].user.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_localhost_is_local() {
        let inventory = Inventory::parse("localhost\n").unwrap();
        let hosts = inventory.get_hosts(ALL_GROUP).unwrap();
        assert_eq!(hosts[0].connection, Connection::Local);
    }

    #[test]
    fn test_explicit_local_connection() {
        let inventory = Inventory::parse("build1 ansible_connection=local\n").unwrap();
        let hosts = inventory.get_hosts(ALL_GROUP).unwrap();
        assert_eq!(hosts[0].connection, Connection::Local);
    }

    #[test]
    fn test_malformed_section_header() {
        let err = Inventory::parse("[workers\nworker1\n").unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn test_malformed_host_var() {
        let err = Inventory::parse("worker1 ansible_host\n").unwrap_err();
        assert!(err.contains("key=value"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Inventory::parse("worker1 ansible_port=nope\n").unwrap_err();
        assert!(err.contains("ansible_port"));
    }

}
