// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Assembly of canonical records from grouped grid entities.
//!
//! ALIAS has no native entity on the grid. It is stored as one `record:alias` entity
//! per configured target type, each carrying the same `target_name` and a distinct
//! `target_type`. Reading it back yields a single value. When the entities no longer
//! match the configuration (a type missing or extra, or targets that differ) and
//! current state is being read, the value gets the desync marker so that a planner
//! sees a difference and re-applies the record.

use crate::constants::ALIAS_DESYNC_MARKER;
use crate::dns_errors::{RecordError, Result};
use crate::provider::reader::RemoteGroup;
use crate::record_types::{FieldLayout, RecordType, TypeSpec};
use crate::records::{CanonicalRecord, RecordValue, SourceEntity, Zone};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// How ALIAS entities are interpreted.
#[derive(Debug, Clone, Copy)]
pub struct AliasView<'a> {
    /// Configured target types, in priority order
    pub alias_types: &'a [RecordType],
    /// Reading current state (mark desynchronized records)
    pub target: bool,
}

/// Build the canonical record for one group of entities.
///
/// # Errors
///
/// Returns `InvalidRecordData` when an entity lacks a field of its type.
pub fn build_record(
    zone: &Zone,
    record_type: RecordType,
    group: RemoteGroup,
    alias: AliasView<'_>,
) -> Result<CanonicalRecord> {
    let spec = record_type.spec();
    let name = zone.hostname_from_fqdn(&group.owner);

    let values = match record_type {
        RecordType::Alias => vec![alias_value(&name, &group.entities, alias)?],
        RecordType::Cname | RecordType::Ptr => {
            let first = group
                .entities
                .first()
                .ok_or_else(|| missing(&name, record_type, "no entities"))?;
            vec![entity_value(spec, &name, first)?]
        }
        RecordType::A
        | RecordType::Aaaa
        | RecordType::Caa
        | RecordType::Mx
        | RecordType::Naptr
        | RecordType::Ns
        | RecordType::Srv
        | RecordType::Txt => group
            .entities
            .iter()
            .map(|entity| entity_value(spec, &name, entity))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(CanonicalRecord {
        name,
        record_type,
        ttl: group.ttl,
        values,
        sources: group.entities,
    })
}

/// Canonical value carried by one entity.
fn entity_value(spec: &TypeSpec, name: &str, entity: &SourceEntity) -> Result<RecordValue> {
    match &spec.layout {
        FieldLayout::Scalar(mapping) => {
            let value = entity
                .fields
                .get(mapping.remote)
                .ok_or_else(|| missing(name, spec.record_type, mapping.remote))?;
            Ok(RecordValue::Text(text_of(value)))
        }
        FieldLayout::Structured(mappings) => {
            let mut fields = BTreeMap::new();
            for mapping in *mappings {
                let value = entity
                    .fields
                    .get(mapping.remote)
                    .ok_or_else(|| missing(name, spec.record_type, mapping.remote))?;
                fields.insert(mapping.canonical.to_string(), value.clone());
            }
            Ok(RecordValue::Fields(fields))
        }
    }
}

fn alias_value(
    name: &str,
    entities: &[SourceEntity],
    alias: AliasView<'_>,
) -> Result<RecordValue> {
    let spec = RecordType::Alias.spec();
    let (target_field, tag_field) = match (&spec.layout, spec.discriminator) {
        (FieldLayout::Scalar(mapping), Some(tag_field)) => (mapping.remote, tag_field),
        _ => return Err(missing(name, RecordType::Alias, "alias layout")),
    };

    let tagged: Vec<(Option<String>, String)> = entities
        .iter()
        .map(|entity| {
            let tag = entity
                .fields
                .get(tag_field)
                .map(|v| text_of(v).to_ascii_uppercase());
            let target = entity
                .fields
                .get(target_field)
                .map(text_of)
                .ok_or_else(|| missing(name, RecordType::Alias, target_field))?;
            Ok((tag, target))
        })
        .collect::<Result<_>>()?;

    let preferred = alias.alias_types.first().map(|t| t.as_str());
    let chosen = tagged
        .iter()
        .find(|(tag, _)| tag.as_deref() == preferred)
        .or_else(|| tagged.first())
        .map(|(_, target)| target.clone())
        .ok_or_else(|| missing(name, RecordType::Alias, "no entities"))?;

    if !alias.target {
        return Ok(RecordValue::Text(chosen));
    }

    let mut present: Vec<String> = tagged
        .iter()
        .map(|(tag, _)| tag.clone().unwrap_or_default())
        .collect();
    present.sort();
    let mut configured: Vec<String> = alias
        .alias_types
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    configured.sort();
    let targets_agree = tagged.iter().all(|(_, target)| *target == chosen);

    if present == configured && targets_agree {
        Ok(RecordValue::Text(chosen))
    } else {
        warn!(
            name = %name,
            present = ?present,
            configured = ?configured,
            targets_agree = targets_agree,
            "ALIAS entities out of sync with configured types"
        );
        Ok(RecordValue::Text(format!("{chosen}{ALIAS_DESYNC_MARKER}")))
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(name: &str, record_type: RecordType, what: &str) -> crate::dns_errors::DnsError {
    RecordError::InvalidRecordData {
        name: name.to_string(),
        record_type: record_type.to_string(),
        reason: format!("grid entity is missing {what}"),
    }
    .into()
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod builder_tests;
