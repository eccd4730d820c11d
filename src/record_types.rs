// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record type table: how each supported DNS record type maps onto WAPI entities.
//!
//! Infoblox stores one entity per record value (`record:a`, `record:mx`, ...), each
//! with its own field layout. The table below is the single place that knows those
//! layouts. Every consumer matches exhaustively on [`RecordType`], so adding a type
//! fails to compile until every site handles it.
//!
//! | Type  | Cardinality | Canonical → remote fields                                        |
//! |-------|-------------|------------------------------------------------------------------|
//! | A     | Multi       | `ipv4addr`                                                       |
//! | AAAA  | Multi       | `ipv6addr`                                                       |
//! | ALIAS | Single      | `target_name`, discriminated by `target_type`                    |
//! | CAA   | Multi       | flags/`ca_flag`, tag/`ca_tag`, value/`ca_value`                  |
//! | CNAME | Single      | `canonical`                                                      |
//! | MX    | Multi       | preference, exchange/`mail_exchanger`                            |
//! | NAPTR | Multi       | order, preference, flags, service/`services`, regexp, replacement|
//! | NS    | Multi       | `nameserver` (no TTL override)                                   |
//! | PTR   | Single      | `ptrdname`                                                       |
//! | SRV   | Multi       | priority, weight, port, target                                   |
//! | TXT   | Multi       | `text`                                                           |

use crate::constants::RECORD_OBJECT_PREFIX;
use crate::dns_errors::{RecordError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record types the engine can reconcile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum RecordType {
    A,
    Aaaa,
    Alias,
    Caa,
    Cname,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Srv,
    Txt,
}

/// Whether a record holds exactly one value or a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multi,
}

/// One canonical field and the WAPI field it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Field name in the canonical record value
    pub canonical: &'static str,
    /// Field name on the WAPI entity
    pub remote: &'static str,
    /// Holds an FQDN: trailing dot canonically, bare on the grid
    pub dotted: bool,
}

/// Shape of a record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// The value is a single string stored in one remote field
    Scalar(FieldMapping),
    /// The value is a map of named fields
    Structured(&'static [FieldMapping]),
}

/// Static description of how one record type is stored remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub record_type: RecordType,
    pub cardinality: Cardinality,
    pub layout: FieldLayout,
    /// Remote field distinguishing the entities that emulate one record
    pub discriminator: Option<&'static str>,
    /// Entities carry `ttl`/`use_ttl`
    pub uses_ttl_override: bool,
}

const fn scalar(remote: &'static str, dotted: bool) -> FieldLayout {
    FieldLayout::Scalar(FieldMapping {
        canonical: "value",
        remote,
        dotted,
    })
}

const fn field(canonical: &'static str, remote: &'static str, dotted: bool) -> FieldMapping {
    FieldMapping {
        canonical,
        remote,
        dotted,
    }
}

const CAA_FIELDS: &[FieldMapping] = &[
    field("flags", "ca_flag", false),
    field("tag", "ca_tag", false),
    field("value", "ca_value", false),
];

const MX_FIELDS: &[FieldMapping] = &[
    field("preference", "preference", false),
    field("exchange", "mail_exchanger", true),
];

const NAPTR_FIELDS: &[FieldMapping] = &[
    field("order", "order", false),
    field("preference", "preference", false),
    field("flags", "flags", false),
    field("service", "services", false),
    field("regexp", "regexp", false),
    field("replacement", "replacement", true),
];

const SRV_FIELDS: &[FieldMapping] = &[
    field("priority", "priority", false),
    field("weight", "weight", false),
    field("port", "port", false),
    field("target", "target", true),
];

const A_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::A,
    cardinality: Cardinality::Multi,
    layout: scalar("ipv4addr", false),
    discriminator: None,
    uses_ttl_override: true,
};

const AAAA_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Aaaa,
    cardinality: Cardinality::Multi,
    layout: scalar("ipv6addr", false),
    discriminator: None,
    uses_ttl_override: true,
};

const ALIAS_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Alias,
    cardinality: Cardinality::Single,
    layout: scalar("target_name", true),
    discriminator: Some("target_type"),
    uses_ttl_override: true,
};

const CAA_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Caa,
    cardinality: Cardinality::Multi,
    layout: FieldLayout::Structured(CAA_FIELDS),
    discriminator: None,
    uses_ttl_override: true,
};

const CNAME_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Cname,
    cardinality: Cardinality::Single,
    layout: scalar("canonical", true),
    discriminator: None,
    uses_ttl_override: true,
};

const MX_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Mx,
    cardinality: Cardinality::Multi,
    layout: FieldLayout::Structured(MX_FIELDS),
    discriminator: None,
    uses_ttl_override: true,
};

const NAPTR_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Naptr,
    cardinality: Cardinality::Multi,
    layout: FieldLayout::Structured(NAPTR_FIELDS),
    discriminator: None,
    uses_ttl_override: true,
};

const NS_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Ns,
    cardinality: Cardinality::Multi,
    layout: scalar("nameserver", true),
    discriminator: None,
    uses_ttl_override: false,
};

const PTR_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Ptr,
    cardinality: Cardinality::Single,
    layout: scalar("ptrdname", true),
    discriminator: None,
    uses_ttl_override: true,
};

const SRV_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Srv,
    cardinality: Cardinality::Multi,
    layout: FieldLayout::Structured(SRV_FIELDS),
    discriminator: None,
    uses_ttl_override: true,
};

const TXT_SPEC: TypeSpec = TypeSpec {
    record_type: RecordType::Txt,
    cardinality: Cardinality::Multi,
    layout: scalar("text", false),
    discriminator: None,
    uses_ttl_override: true,
};

impl RecordType {
    /// Every supported type, in the order records are populated.
    pub const ALL: [RecordType; 11] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Alias,
        RecordType::Caa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Naptr,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// Upper-case DNS name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Alias => "ALIAS",
            Self::Caa => "CAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Naptr => "NAPTR",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        }
    }

    /// WAPI object type for entities of this type, e.g. `record:aaaa`.
    #[must_use]
    pub fn wapi_object(self) -> String {
        format!("{RECORD_OBJECT_PREFIX}{}", self.as_str().to_ascii_lowercase())
    }

    /// Parse a WAPI object type (`record:a`) back into a record type.
    ///
    /// Returns `None` for non-record objects and record objects outside the table.
    #[must_use]
    pub fn from_wapi_object(object: &str) -> Option<Self> {
        object
            .strip_prefix(RECORD_OBJECT_PREFIX)
            .and_then(|name| name.parse().ok())
    }

    /// Static layout of this type.
    #[must_use]
    pub fn spec(self) -> &'static TypeSpec {
        match self {
            Self::A => &A_SPEC,
            Self::Aaaa => &AAAA_SPEC,
            Self::Alias => &ALIAS_SPEC,
            Self::Caa => &CAA_SPEC,
            Self::Cname => &CNAME_SPEC,
            Self::Mx => &MX_SPEC,
            Self::Naptr => &NAPTR_SPEC,
            Self::Ns => &NS_SPEC,
            Self::Ptr => &PTR_SPEC,
            Self::Srv => &SRV_SPEC,
            Self::Txt => &TXT_SPEC,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RecordError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| RecordError::UnsupportedType {
                record_type: s.to_string(),
            })
    }
}

impl TryFrom<String> for RecordType {
    type Error = RecordError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl TypeSpec {
    /// Field mappings in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldMapping] {
        match &self.layout {
            FieldLayout::Scalar(mapping) => std::slice::from_ref(mapping),
            FieldLayout::Structured(mappings) => mappings,
        }
    }

    /// Remote field names to request when reading entities of this type.
    ///
    /// Includes the discriminator for emulated types.
    #[must_use]
    pub fn remote_field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.fields().iter().map(|f| f.remote).collect();
        if let Some(discriminator) = self.discriminator {
            names.push(discriminator);
        }
        names
    }

    /// Whether `remote_field` holds an FQDN.
    #[must_use]
    pub fn is_dotted(&self, remote_field: &str) -> bool {
        self.fields()
            .iter()
            .any(|f| f.dotted && f.remote == remote_field)
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.cardinality == Cardinality::Single
    }
}

/// Look up the layout for a type given by name.
///
/// # Errors
///
/// Returns `UnsupportedType` for names outside the table.
pub fn spec_for(type_name: &str) -> Result<&'static TypeSpec> {
    let record_type: RecordType = type_name.parse()?;
    Ok(record_type.spec())
}

/// Whether `remote_field` of `record_type` holds an FQDN.
#[must_use]
pub fn is_dotted(record_type: RecordType, remote_field: &str) -> bool {
    record_type.spec().is_dotted(remote_field)
}

/// Remote field names for `record_type`, used to build retrieval field lists.
#[must_use]
pub fn field_names(record_type: RecordType) -> Vec<&'static str> {
    record_type.spec().remote_field_names()
}

#[cfg(test)]
#[path = "record_types_tests.rs"]
mod record_types_tests;
