// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for hostcheck

use thiserror::Error;

/// Result type alias for hostcheck operations
pub type Result<T> = std::result::Result<T, HostcheckError>;

/// Errors that can occur during hostcheck operations
#[derive(Error, Debug)]
pub enum HostcheckError {
    /// Inventory location not supplied by any source
    #[error("No inventory given: set {var} or pass --inventory")]
    InventoryNotConfigured { var: String },

    /// Inventory file not found
    #[error("Inventory file not found: {path}")]
    InventoryNotFound { path: String },

    /// Inventory parsing error
    #[error("Failed to parse inventory '{path}': {message}")]
    InventoryParse { path: String, message: String },

    /// Requested host group is not defined in the inventory
    #[error("Host group not defined in inventory: {group}")]
    UnknownGroup { group: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Suite file not found
    #[error("Suite not found: {name}")]
    SuiteNotFound { name: String },

    /// Suite parsing error
    #[error("Failed to parse suite '{path}': {message}")]
    SuiteParse { path: String, message: String },

    /// A resource query could not be performed against a host
    #[error("Query failed on host '{host}': {message}")]
    QueryFailed { host: String, message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
