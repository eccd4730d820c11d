// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types exchanged with the WAPI.

use crate::constants::DEFAULT_WAPI_VERSION;
use crate::record_types::RecordType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// JSON object sent as a request body or received as entity fields.
pub type Fields = Map<String, Value>;

/// Opaque reference the grid assigns to every object (`record:a/ZG5z...:www.example.com/default`).
///
/// Only ever compared for equality and echoed back in `PUT`/`DELETE` paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WapiRef(String);

impl WapiRef {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WapiRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record entity as returned by a `record:<type>` read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntity {
    #[serde(rename = "_ref")]
    pub reference: WapiRef,
    /// Owner FQDN, without trailing dot
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_ttl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Type-specific fields (`ipv4addr`, `mail_exchanger`, ...) and anything else returned
    #[serde(flatten)]
    pub fields: Fields,
}

/// One page of a paged read (`_return_as_object=1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub result: Vec<RemoteEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_id: Option<String>,
}

/// What to ask for when reading a page of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Opening request of a paged read
    First {
        /// Zone identifier entities must belong to
        zone: String,
        /// Extra fields to return on top of the defaults
        return_fields: Vec<String>,
    },
    /// Continuation of a paged read
    Next { page_id: String },
}

/// An authoritative zone as returned by a `zone_auth` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAuth {
    #[serde(rename = "_ref")]
    pub reference: WapiRef,
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soa_default_ttl: Option<u32>,
}

/// Answer to `GET ?_schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub supported_versions: Vec<String>,
    #[serde(default)]
    pub supported_objects: Vec<String>,
}

/// API version and record types usable against one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub api_version: String,
    pub record_types: BTreeSet<RecordType>,
}

impl Capabilities {
    /// Pick the API version and the supported record types from a schema answer.
    ///
    /// A configured version wins. Otherwise the highest advertised version is used,
    /// compared numerically per dotted component, falling back to
    /// [`DEFAULT_WAPI_VERSION`] when the grid advertises none. Record types are the
    /// advertised `record:*` objects the engine knows how to map.
    #[must_use]
    pub fn negotiate(schema: &Schema, configured_version: Option<&str>) -> Self {
        let api_version = configured_version
            .map(str::to_string)
            .or_else(|| {
                schema
                    .supported_versions
                    .iter()
                    .max_by_key(|v| version_key(v))
                    .cloned()
            })
            .unwrap_or_else(|| DEFAULT_WAPI_VERSION.to_string());

        let record_types = schema
            .supported_objects
            .iter()
            .filter_map(|object| RecordType::from_wapi_object(object))
            .collect();

        Self {
            api_version,
            record_types,
        }
    }

    #[must_use]
    pub fn supports(&self, record_type: RecordType) -> bool {
        self.record_types.contains(&record_type)
    }
}

/// `2.12.3` → `[2, 12, 3]`; non-numeric components sort lowest.
fn version_key(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
