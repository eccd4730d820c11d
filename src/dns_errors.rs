// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for octoblox.
//!
//! This module provides specialized error types for:
//! - Zone resolution and provisioning (malformed reverse zones, missing zones)
//! - Record typing and validation (unsupported types, invalid record data)
//! - WAPI reads and writes against the Infoblox grid
//! - Provider configuration
//!
//! All of them compose into [`DnsError`], the error type returned by the engine.

use thiserror::Error;

/// Errors that can occur while resolving, looking up or creating a zone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// Reverse zone name whose labels do not map onto an address prefix
    ///
    /// Returned for `in-addr.arpa.` zones with non-octet labels or more than four of
    /// them, and for `ip6.arpa.` zones with non-nibble labels or more than 32 of them.
    #[error("Malformed zone name '{zone}': {reason}")]
    MalformedZoneName {
        /// The zone name as supplied
        zone: String,
        /// Why the name was rejected
        reason: String,
    },

    /// Zone does not exist on the grid and creation is disabled
    #[error("Zone '{zone}' does not exist in Infoblox (identifier '{identifier}')")]
    ZoneNotFound {
        /// The canonical zone name
        zone: String,
        /// The WAPI identifier the lookup used
        identifier: String,
    },

    /// Creating a missing zone failed
    #[error("Failed to create zone '{zone}': {reason}")]
    ZoneCreationFailed {
        /// The canonical zone name
        zone: String,
        /// HTTP status code the grid answered with, when a response was received
        status_code: Option<u16>,
        /// Specific reason for the failure
        reason: String,
    },
}

/// Errors about the records handed to or built by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Record type outside the supported table, or not offered by the grid
    #[error("Unsupported record type '{record_type}'")]
    UnsupportedType {
        /// The type name that was rejected
        record_type: String,
    },

    /// Record data that cannot be turned into WAPI entities
    #[error("Invalid record data for '{name}' ({record_type}): {reason}")]
    InvalidRecordData {
        /// Owner name of the record
        name: String,
        /// Record type
        record_type: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A second record with the same owner name and type was added to a zone
    #[error("Duplicate {record_type} record for '{name}'")]
    DuplicateRecord {
        /// Owner name of the record
        name: String,
        /// Record type
        record_type: String,
    },

    /// A CNAME shares its owner name with other records
    #[error("CNAME at '{name}' cannot coexist with other records")]
    CnameCoexistence {
        /// Owner name of the record
        name: String,
    },
}

/// Errors returned by the Infoblox grid or the HTTP transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// A read (schema, zone lookup, record page) failed
    #[error("WAPI read of {object} failed: {reason}")]
    RemoteReadError {
        /// WAPI object or path that was read
        object: String,
        /// HTTP status code, when a response was received
        status_code: Option<u16>,
        /// Response body or transport error
        reason: String,
    },

    /// A write (create, modify, delete) failed
    #[error("WAPI {operation} of {object} failed: {reason}")]
    RemoteWriteError {
        /// `create`, `modify` or `delete`
        operation: String,
        /// WAPI object type or reference that was written
        object: String,
        /// HTTP status code, when a response was received
        status_code: Option<u16>,
        /// Response body or transport error
        reason: String,
    },

    /// The grid answered with something that could not be decoded
    #[error("Unexpected WAPI response for {object}: {reason}")]
    UnexpectedResponse {
        /// WAPI object or path that was requested
        object: String,
        /// Decoding failure
        reason: String,
    },
}

/// Composite error type that encompasses all engine errors.
///
/// This is the primary error type returned by octoblox operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// Zone-related error (malformed name, not found, creation failure)
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// Record-related error (unsupported type, invalid data)
    #[error(transparent)]
    Record(#[from] RecordError),

    /// WAPI read or write failure
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Invalid provider configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// HTTP client could not be built
    #[error("HTTP transport error: {0}")]
    Transport(String),
}

impl DnsError {
    /// Returns true if this error is transient and re-running the operation may succeed.
    ///
    /// Only remote failures and zone creation failures without a status code
    /// (connection problems) or with a 429/5xx status are transient; everything else
    /// needs a configuration or data fix.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Remote(
                RemoteError::RemoteReadError { status_code, .. }
                | RemoteError::RemoteWriteError { status_code, .. },
            )
            | Self::Zone(ZoneError::ZoneCreationFailed { status_code, .. }) => {
                status_code.is_none_or(|code| code == 429 || code >= 500)
            }
            Self::Zone(ZoneError::MalformedZoneName { .. } | ZoneError::ZoneNotFound { .. })
            | Self::Record(_)
            | Self::Remote(RemoteError::UnexpectedResponse { .. })
            | Self::Configuration(_)
            | Self::Transport(_) => false,
        }
    }

    /// HTTP status code of the grid response behind this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote(
                RemoteError::RemoteReadError { status_code, .. }
                | RemoteError::RemoteWriteError { status_code, .. },
            )
            | Self::Zone(ZoneError::ZoneCreationFailed { status_code, .. }) => *status_code,
            _ => None,
        }
    }

    /// Returns a short machine-readable reason for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Zone(ZoneError::MalformedZoneName { .. }) => "MalformedZoneName",
            Self::Zone(ZoneError::ZoneNotFound { .. }) => "ZoneNotFound",
            Self::Zone(ZoneError::ZoneCreationFailed { .. }) => "ZoneCreationFailed",

            Self::Record(RecordError::UnsupportedType { .. }) => "UnsupportedType",
            Self::Record(RecordError::InvalidRecordData { .. }) => "InvalidRecordData",
            Self::Record(RecordError::DuplicateRecord { .. }) => "DuplicateRecord",
            Self::Record(RecordError::CnameCoexistence { .. }) => "CnameCoexistence",

            Self::Remote(RemoteError::RemoteReadError { .. }) => "RemoteReadError",
            Self::Remote(RemoteError::RemoteWriteError { .. }) => "RemoteWriteError",
            Self::Remote(RemoteError::UnexpectedResponse { .. }) => "UnexpectedResponse",

            Self::Configuration(_) => "InvalidConfiguration",
            Self::Transport(_) => "TransportError",
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = DnsError> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
