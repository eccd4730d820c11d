// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for octoblox.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// WAPI Constants
// ============================================================================

/// WAPI version used for the initial schema request when none is configured
pub const DEFAULT_WAPI_VERSION: &str = "1.0";

/// URL path segment under which the WAPI is served on the grid master
pub const WAPI_PATH_PREFIX: &str = "wapi";

/// Object type prefix for record entities (`record:a`, `record:mx`, ...)
pub const RECORD_OBJECT_PREFIX: &str = "record:";

/// Object type for authoritative zones
pub const ZONE_AUTH_OBJECT: &str = "zone_auth";

/// Maximum number of results requested per page
pub const WAPI_PAGE_SIZE: u32 = 1000;

/// Remote field holding the owner name of an entity
pub const NAME_FIELD: &str = "name";

/// Remote field holding an explicit per-entity TTL
pub const TTL_FIELD: &str = "ttl";

/// Remote field flagging that `ttl` overrides the zone default
pub const USE_TTL_FIELD: &str = "use_ttl";

/// Remote field scoping requests to a DNS view
pub const VIEW_FIELD: &str = "view";

/// Zone metadata field holding the SOA default TTL
pub const SOA_DEFAULT_TTL_FIELD: &str = "soa_default_ttl";

// ============================================================================
// DNS Constants
// ============================================================================

/// Default zone TTL when the grid does not report one (8 hours, the WAPI default)
pub const DEFAULT_ZONE_TTL_SECS: u32 = 28_800;

/// Suffix of IPv4 reverse zones
pub const IPV4_REVERSE_SUFFIX: &str = "in-addr.arpa.";

/// Suffix of IPv6 reverse zones
pub const IPV6_REVERSE_SUFFIX: &str = "ip6.arpa.";

/// Number of octets in an IPv4 address
pub const IPV4_OCTETS: usize = 4;

/// Number of nibbles in an IPv6 address
pub const IPV6_NIBBLES: usize = 32;

/// Bits covered by one reverse-zone octet label
pub const BITS_PER_OCTET: usize = 8;

/// Bits covered by one reverse-zone nibble label
pub const BITS_PER_NIBBLE: usize = 4;

// ============================================================================
// ALIAS Emulation Constants
// ============================================================================

/// Record types an ALIAS is emulated with unless configured otherwise
pub const DEFAULT_ALIAS_TYPES: &[&str] = &["A", "AAAA"];

/// Marker appended to an ALIAS value whose backing entities are out of sync
pub const ALIAS_DESYNC_MARKER: &str = "+desync";

// ============================================================================
// HTTP Transport Constants
// ============================================================================

/// Default request timeout for WAPI calls
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default upper bound on time spent retrying one idempotent request
pub const DEFAULT_RETRY_MAX_ELAPSED_SECS: u64 = 120;

/// User agent sent with every WAPI request
pub const USER_AGENT: &str = concat!("octoblox/", env!("CARGO_PKG_VERSION"));

/// Environment variable consulted when the config file carries no password
pub const PASSWORD_ENV_VAR: &str = "OCTOBLOX_PASSWORD";
