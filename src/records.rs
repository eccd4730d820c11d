// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical DNS record model.
//!
//! A [`CanonicalRecord`] is one record in DNS terms: owner name, type, TTL and a set
//! of values. The grid stores one entity per value instead, so records read from it
//! keep the backing entities in [`CanonicalRecord::sources`].

use crate::constants::ALIAS_DESYNC_MARKER;
use crate::dns_errors::{RecordError, Result};
use crate::record_types::{FieldLayout, RecordType};
use crate::wapi::types::{Fields, WapiRef};
use crate::zone_id::normalize_zone_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One value of a record: a plain string (`192.168.0.1`) or named fields (MX, SRV, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Text(String),
    Fields(BTreeMap<String, Value>),
}

impl RecordValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Fields(_) => None,
        }
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A grid entity backing a record value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntity {
    #[serde(rename = "_ref")]
    pub reference: WapiRef,
    /// The type's remote fields as stored on the grid
    #[serde(flatten)]
    pub fields: Fields,
}

/// A DNS record identified by owner name and type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Owner name relative to the zone; empty for the apex
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub ttl: u32,
    pub values: Vec<RecordValue>,
    /// Backing entities, positionally aligned with `values` except for ALIAS
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceEntity>,
}

impl CanonicalRecord {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        values: Vec<RecordValue>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            values,
            sources: Vec::new(),
        }
    }

    /// References of every backing entity.
    pub fn refs(&self) -> impl Iterator<Item = &WapiRef> {
        self.sources.iter().map(|source| &source.reference)
    }

    /// The value of a single-cardinality record.
    #[must_use]
    pub fn value(&self) -> Option<&RecordValue> {
        self.values.first()
    }

    /// Whether this ALIAS was read with entities that do not match the configured types.
    #[must_use]
    pub fn is_desynchronized(&self) -> bool {
        self.record_type == RecordType::Alias
            && self
                .value()
                .and_then(RecordValue::as_text)
                .is_some_and(|text| text.ends_with(ALIAS_DESYNC_MARKER))
    }

    /// Check the values against the type's layout.
    ///
    /// Values must be present, scalar types take strings and structured types take
    /// maps carrying every field. Lenient mode lets single-cardinality types carry
    /// extra values; only the first is used.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordData` describing the first problem found.
    pub fn validate(&self, lenient: bool) -> Result<()> {
        let spec = self.record_type.spec();
        if self.values.is_empty() {
            return Err(self.invalid("record has no values"));
        }
        if spec.is_single() && self.values.len() > 1 && !lenient {
            return Err(self.invalid(&format!(
                "{} takes a single value, got {}",
                self.record_type,
                self.values.len()
            )));
        }

        for value in &self.values {
            match (&spec.layout, value) {
                (FieldLayout::Scalar(_), RecordValue::Text(text)) => {
                    if text.is_empty() {
                        return Err(self.invalid("value is empty"));
                    }
                }
                (FieldLayout::Structured(mappings), RecordValue::Fields(fields)) => {
                    if let Some(missing) = mappings
                        .iter()
                        .find(|m| !fields.contains_key(m.canonical))
                    {
                        return Err(self.invalid(&format!("missing field '{}'", missing.canonical)));
                    }
                }
                (FieldLayout::Scalar(_), RecordValue::Fields(_)) => {
                    return Err(self.invalid("expected a plain value, got fields"));
                }
                (FieldLayout::Structured(_), RecordValue::Text(_)) => {
                    return Err(self.invalid("expected fields, got a plain value"));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn invalid(&self, reason: &str) -> crate::dns_errors::DnsError {
        RecordError::InvalidRecordData {
            name: self.name.clone(),
            record_type: self.record_type.to_string(),
            reason: reason.to_string(),
        }
        .into()
    }
}

/// A zone and the records read into or planned for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    /// Normalized name: lowercase with a trailing dot
    pub name: String,
    records: Vec<CanonicalRecord>,
}

impl Zone {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_zone_name(name),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    #[must_use]
    pub fn find(&self, name: &str, record_type: RecordType) -> Option<&CanonicalRecord> {
        self.records
            .iter()
            .find(|r| r.name == name && r.record_type == record_type)
    }

    /// Owner name relative to this zone: `www.unit.tests` → `www`, `unit.tests` → ``.
    ///
    /// Names outside the zone are returned without a trailing dot.
    #[must_use]
    pub fn hostname_from_fqdn(&self, fqdn: &str) -> String {
        let fqdn = normalize_zone_name(fqdn);
        if fqdn == self.name {
            return String::new();
        }
        match fqdn.strip_suffix(&self.name).and_then(|h| h.strip_suffix('.')) {
            Some(hostname) => hostname.to_string(),
            None => fqdn.trim_end_matches('.').to_string(),
        }
    }

    /// Fully qualified owner name without trailing dot, as the grid expects it.
    #[must_use]
    pub fn fqdn_for(&self, hostname: &str) -> String {
        let zone = self.name.trim_end_matches('.');
        if hostname.is_empty() {
            zone.to_string()
        } else {
            format!("{hostname}.{zone}")
        }
    }

    /// Add a record after validating it.
    ///
    /// # Errors
    ///
    /// - `DuplicateRecord` when the zone already holds this name and type
    /// - `CnameCoexistence` when a CNAME would share its name with another record
    ///   (skipped in lenient mode)
    /// - `InvalidRecordData` from [`CanonicalRecord::validate`]
    pub fn add_record(&mut self, record: CanonicalRecord, lenient: bool) -> Result<()> {
        record.validate(lenient)?;

        if self.find(&record.name, record.record_type).is_some() {
            return Err(RecordError::DuplicateRecord {
                name: record.name,
                record_type: record.record_type.to_string(),
            }
            .into());
        }

        if !lenient {
            let shares_name_with_cname = self.records.iter().any(|r| {
                r.name == record.name
                    && (r.record_type == RecordType::Cname
                        || record.record_type == RecordType::Cname)
            });
            if shares_name_with_cname {
                return Err(RecordError::CnameCoexistence { name: record.name }.into());
            }
        }

        self.records.push(record);
        Ok(())
    }
}

/// One planned change handed to the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Change {
    Create {
        new: CanonicalRecord,
    },
    Update {
        existing: CanonicalRecord,
        new: CanonicalRecord,
    },
    Delete {
        existing: CanonicalRecord,
    },
}

impl Change {
    /// The record the change is about: the new state when there is one.
    #[must_use]
    pub fn record(&self) -> &CanonicalRecord {
        match self {
            Self::Create { new } | Self::Update { new, .. } => new,
            Self::Delete { existing } => existing,
        }
    }

    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
