// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider configuration.
//!
//! Loaded from a YAML file:
//!
//! ```yaml
//! gridmaster: infoblox.example.com
//! username: admin
//! password: secret          # or OCTOBLOX_PASSWORD
//! verify: true
//! api_version: "2.12"       # optional, negotiated when absent
//! dns_view: default         # optional
//! create_zones: false
//! default_ttl: 28800
//! alias_types: [A, AAAA]
//! zone_create_fields:
//!   ns_group: default
//! ```

use crate::constants::{
    DEFAULT_ALIAS_TYPES, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RETRY_MAX_ELAPSED_SECS,
    DEFAULT_ZONE_TTL_SECS, PASSWORD_ENV_VAR,
};
use crate::dns_errors::{DnsError, Result};
use crate::record_types::RecordType;
use crate::wapi::types::Fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Settings for one Infoblox provider instance.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Grid master host name, or a full `https://host[:port]` URL
    pub gridmaster: String,
    pub username: String,
    /// Falls back to `OCTOBLOX_PASSWORD` when absent
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Verify the grid's TLS certificate
    #[serde(default = "default_verify")]
    pub verify: bool,
    /// Pin a WAPI version instead of negotiating the highest one
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub dns_view: Option<String>,
    /// Create missing zones on apply
    #[serde(default)]
    pub create_zones: bool,
    /// TTL assumed for zones created on apply
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,
    /// Record types an ALIAS fans out to, in priority order
    #[serde(default = "default_alias_types")]
    pub alias_types: Vec<RecordType>,
    /// Extra fields merged into every zone creation request
    #[serde(default)]
    pub zone_create_fields: Fields,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total time spent retrying one idempotent request; 0 disables retries
    #[serde(default = "default_retry_max_elapsed_secs")]
    pub retry_max_elapsed_secs: u64,
}

fn default_verify() -> bool {
    true
}

fn default_ttl() -> u32 {
    DEFAULT_ZONE_TTL_SECS
}

fn default_alias_types() -> Vec<RecordType> {
    DEFAULT_ALIAS_TYPES
        .iter()
        .filter_map(|name| name.parse().ok())
        .collect()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_retry_max_elapsed_secs() -> u64 {
    DEFAULT_RETRY_MAX_ELAPSED_SECS
}

impl ProviderConfig {
    /// Minimal configuration with every optional setting at its default.
    #[must_use]
    pub fn new(gridmaster: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            gridmaster: gridmaster.into(),
            username: username.into(),
            password: None,
            verify: default_verify(),
            api_version: None,
            dns_view: None,
            create_zones: false,
            default_ttl: default_ttl(),
            alias_types: default_alias_types(),
            zone_create_fields: Fields::new(),
            timeout_secs: default_timeout_secs(),
            retry_max_elapsed_secs: default_retry_max_elapsed_secs(),
        }
    }

    /// Parse and validate a YAML configuration document.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the YAML does not parse or fails [`Self::validate`].
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| DnsError::Configuration(format!("invalid provider config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            DnsError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Check the settings that cannot be checked by deserialization alone.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an empty grid master or user name, an empty alias
    /// type list, duplicated alias types, or ALIAS used as its own alias type.
    pub fn validate(&self) -> Result<()> {
        if self.gridmaster.trim().is_empty() {
            return Err(DnsError::Configuration("gridmaster must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(DnsError::Configuration("username must not be empty".into()));
        }
        if self.alias_types.is_empty() {
            return Err(DnsError::Configuration(
                "alias_types must name at least one record type".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for alias_type in &self.alias_types {
            if *alias_type == RecordType::Alias {
                return Err(DnsError::Configuration(
                    "alias_types cannot contain ALIAS".into(),
                ));
            }
            if !seen.insert(*alias_type) {
                return Err(DnsError::Configuration(format!(
                    "alias_types lists {alias_type} more than once"
                )));
            }
        }
        Ok(())
    }

    /// Password from the file, else from `OCTOBLOX_PASSWORD`, else empty.
    #[must_use]
    pub fn resolved_password(&self) -> String {
        self.password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV_VAR).ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn retry_max_elapsed(&self) -> Duration {
        Duration::from_secs(self.retry_max_elapsed_secs)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("gridmaster", &self.gridmaster)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("verify", &self.verify)
            .field("api_version", &self.api_version)
            .field("dns_view", &self.dns_view)
            .field("create_zones", &self.create_zones)
            .field("default_ttl", &self.default_ttl)
            .field("alias_types", &self.alias_types)
            .field("zone_create_fields", &self.zone_create_fields)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_max_elapsed_secs", &self.retry_max_elapsed_secs)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
