// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone lookup and creation.

use crate::config::ProviderConfig;
use crate::dns_errors::{DnsError, RemoteError, Result, ZoneError};
use crate::store::RecordStore;
use crate::wapi::types::{Fields, WapiRef};
use crate::zone_id::{resolve, ReverseKind, ZoneFormat};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// A zone as it exists on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneInfo {
    /// Normalized zone name
    pub zone: String,
    /// WAPI `fqdn` of the zone
    pub identifier: String,
    pub reverse: ReverseKind,
    /// TTL of records that do not override it
    pub default_ttl: u32,
    pub reference: WapiRef,
    /// Created by this call rather than found
    pub created: bool,
}

/// Look a zone up by name.
///
/// Zones without an SOA default TTL use `config.default_ttl`.
///
/// # Errors
///
/// Returns `MalformedZoneName` for unresolvable reverse zones and propagates store
/// read errors.
pub async fn lookup<S: RecordStore + ?Sized>(
    store: &S,
    config: &ProviderConfig,
    zone_name: &str,
) -> Result<Option<ZoneInfo>> {
    let resolved = resolve(zone_name)?;
    let Some(found) = store.find_zone(&resolved.identifier).await? else {
        debug!(zone = %resolved.zone, identifier = %resolved.identifier, "Zone not found");
        return Ok(None);
    };

    Ok(Some(ZoneInfo {
        zone: resolved.zone,
        identifier: resolved.identifier,
        reverse: resolved.reverse,
        default_ttl: found.soa_default_ttl.unwrap_or(config.default_ttl),
        reference: found.reference,
        created: false,
    }))
}

/// Look a zone up, creating it when absent and `config.create_zones` is set.
///
/// The creation request carries `fqdn`, `zone_format` and every field of
/// `config.zone_create_fields`; the store adds the view.
///
/// # Errors
///
/// - `ZoneNotFound` when the zone is absent and creation is disabled
/// - `ZoneCreationFailed` when the grid rejects the creation, transient only for
///   connection failures and 429/5xx answers
pub async fn ensure<S: RecordStore + ?Sized>(
    store: &S,
    config: &ProviderConfig,
    zone_name: &str,
) -> Result<ZoneInfo> {
    if let Some(info) = lookup(store, config, zone_name).await? {
        return Ok(info);
    }

    let resolved = resolve(zone_name)?;
    if !config.create_zones {
        return Err(ZoneError::ZoneNotFound {
            zone: resolved.zone,
            identifier: resolved.identifier,
        }
        .into());
    }

    let format = ZoneFormat::classify(&resolved.identifier);
    let mut body = Fields::new();
    body.insert("fqdn".to_string(), Value::String(resolved.identifier.clone()));
    body.insert(
        "zone_format".to_string(),
        Value::String(format.as_wapi().to_string()),
    );
    body.extend(config.zone_create_fields.clone());

    let reference = store
        .create_zone(&body)
        .await
        .map_err(|e| creation_failed(&resolved.zone, e))?;

    info!(
        zone = %resolved.zone,
        identifier = %resolved.identifier,
        zone_format = %format,
        reference = %reference,
        "Created zone"
    );

    Ok(ZoneInfo {
        zone: resolved.zone,
        identifier: resolved.identifier,
        reverse: resolved.reverse,
        default_ttl: config.default_ttl,
        reference,
        created: true,
    })
}

/// Wrap a rejected zone write, keeping the grid's status code. Other errors (an
/// undecodable answer) pass through unchanged.
fn creation_failed(zone: &str, error: DnsError) -> DnsError {
    if matches!(error, DnsError::Remote(RemoteError::RemoteWriteError { .. })) {
        ZoneError::ZoneCreationFailed {
            zone: zone.to_string(),
            status_code: error.status_code(),
            reason: error.to_string(),
        }
        .into()
    } else {
        error
    }
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod provisioner_tests;
