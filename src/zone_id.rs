// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone name to WAPI zone identifier translation.
//!
//! Forward zones are addressed by their name without the trailing dot. Reverse zones
//! are addressed by the network they cover:
//!
//! - `12.11.10.in-addr.arpa.` → `10.11.12.0/24`
//! - `f.e.d.c.b.a.9.8.7.6.5.4.3.2.1.0.ip6.arpa.` → `0123:4567:89ab:cdef:0000:0000:0000:0000/64`
//!
//! Reverse zone names must be label-aligned (whole octets, whole nibbles). Classless
//! delegations such as `0/26.2.0.192.in-addr.arpa.` are rejected as malformed.

use crate::constants::{
    BITS_PER_NIBBLE, BITS_PER_OCTET, IPV4_OCTETS, IPV4_REVERSE_SUFFIX, IPV6_NIBBLES,
    IPV6_REVERSE_SUFFIX,
};
use crate::dns_errors::{Result, ZoneError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which address family a reverse zone covers, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReverseKind {
    None,
    Ipv4,
    Ipv6,
}

/// A zone name together with the identifier the grid knows it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneIdentifier {
    /// Normalized zone name (lowercase, trailing dot)
    pub zone: String,
    /// WAPI `fqdn` of the zone
    pub identifier: String,
    pub reverse: ReverseKind,
}

/// `zone_format` value sent when creating a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneFormat {
    Forward,
    Ipv4,
    Ipv6,
}

impl ZoneFormat {
    /// Classify a resolved identifier: a colon means IPv6, a slash means IPv4.
    #[must_use]
    pub fn classify(identifier: &str) -> Self {
        if identifier.contains(':') {
            Self::Ipv6
        } else if identifier.contains('/') {
            Self::Ipv4
        } else {
            Self::Forward
        }
    }

    #[must_use]
    pub fn as_wapi(self) -> &'static str {
        match self {
            Self::Forward => "FORWARD",
            Self::Ipv4 => "IPV4",
            Self::Ipv6 => "IPV6",
        }
    }
}

impl fmt::Display for ZoneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wapi())
    }
}

/// Normalize a zone name: trimmed, lowercase, exactly one trailing dot.
#[must_use]
pub fn normalize_zone_name(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.').to_ascii_lowercase();
    format!("{trimmed}.")
}

/// Resolve a zone name into its WAPI identifier.
///
/// # Errors
///
/// Returns `MalformedZoneName` for empty names and for reverse zones whose labels
/// are not whole octets or nibbles, or that have more labels than an address.
pub fn resolve(zone_name: &str) -> Result<ZoneIdentifier> {
    let zone = normalize_zone_name(zone_name);
    if zone == "." {
        return Err(malformed(&zone, "zone name is empty"));
    }

    if let Some(labels) = reverse_labels(&zone, IPV4_REVERSE_SUFFIX) {
        let identifier = ipv4_identifier(&zone, &labels)?;
        return Ok(ZoneIdentifier {
            zone,
            identifier,
            reverse: ReverseKind::Ipv4,
        });
    }

    if let Some(labels) = reverse_labels(&zone, IPV6_REVERSE_SUFFIX) {
        let identifier = ipv6_identifier(&zone, &labels)?;
        return Ok(ZoneIdentifier {
            zone,
            identifier,
            reverse: ReverseKind::Ipv6,
        });
    }

    let identifier = zone.trim_end_matches('.').to_string();
    Ok(ZoneIdentifier {
        zone,
        identifier,
        reverse: ReverseKind::None,
    })
}

/// Labels in front of a reverse suffix, or `None` when `zone` is not under it.
fn reverse_labels<'a>(zone: &'a str, suffix: &str) -> Option<Vec<&'a str>> {
    if zone == suffix {
        return Some(Vec::new());
    }
    let prefix = zone.strip_suffix(suffix)?.strip_suffix('.')?;
    Some(prefix.split('.').collect())
}

fn ipv4_identifier(zone: &str, labels: &[&str]) -> Result<String> {
    if labels.is_empty() {
        return Err(malformed(zone, "reverse zone has no octet labels"));
    }
    if labels.len() > IPV4_OCTETS {
        return Err(malformed(
            zone,
            &format!("{} octet labels exceed {IPV4_OCTETS}", labels.len()),
        ));
    }

    let mut octets = Vec::with_capacity(IPV4_OCTETS);
    for label in labels.iter().rev() {
        let valid = !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit());
        match label.parse::<u8>() {
            Ok(octet) if valid => octets.push(octet.to_string()),
            _ => {
                return Err(malformed(
                    zone,
                    &format!("label '{label}' is not a decimal octet"),
                ))
            }
        }
    }
    let prefix_len = BITS_PER_OCTET * octets.len();
    octets.resize(IPV4_OCTETS, "0".to_string());

    Ok(format!("{}/{prefix_len}", octets.join(".")))
}

fn ipv6_identifier(zone: &str, labels: &[&str]) -> Result<String> {
    if labels.is_empty() {
        return Err(malformed(zone, "reverse zone has no nibble labels"));
    }
    if labels.len() > IPV6_NIBBLES {
        return Err(malformed(
            zone,
            &format!("{} nibble labels exceed {IPV6_NIBBLES}", labels.len()),
        ));
    }

    let mut nibbles = String::with_capacity(IPV6_NIBBLES);
    for label in labels.iter().rev() {
        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_hexdigit() => nibbles.push(c.to_ascii_lowercase()),
            _ => {
                return Err(malformed(
                    zone,
                    &format!("label '{label}' is not a single hex nibble"),
                ))
            }
        }
    }
    let prefix_len = BITS_PER_NIBBLE * nibbles.len();
    while nibbles.len() < IPV6_NIBBLES {
        nibbles.push('0');
    }

    let groups: Vec<&str> = (0..IPV6_NIBBLES)
        .step_by(4)
        .map(|start| &nibbles[start..start + 4])
        .collect();

    Ok(format!("{}/{prefix_len}", groups.join(":")))
}

fn malformed(zone: &str, reason: &str) -> crate::dns_errors::DnsError {
    ZoneError::MalformedZoneName {
        zone: zone.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
#[path = "zone_id_tests.rs"]
mod zone_id_tests;
