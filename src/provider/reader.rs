// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Paged retrieval of record entities, grouped by owner name.

use crate::constants::{TTL_FIELD, USE_TTL_FIELD};
use crate::dns_errors::Result;
use crate::record_types::{RecordType, TypeSpec};
use crate::records::SourceEntity;
use crate::store::RecordStore;
use crate::wapi::types::{Fields, PageRequest, RemoteEntity};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Entities of one type sharing an owner name.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteGroup {
    /// Owner FQDN as stored on the grid
    pub owner: String,
    /// Resolved TTL
    pub ttl: u32,
    /// Entities restricted to the type's fields, dotted fields carrying a trailing dot
    pub entities: Vec<SourceEntity>,
}

/// Remote field names requested for `spec`, including `ttl` and `use_ttl` when
/// the type supports per-entity TTLs.
#[must_use]
pub fn return_fields(spec: &TypeSpec) -> Vec<String> {
    let mut fields: Vec<String> = spec
        .remote_field_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    if spec.uses_ttl_override {
        fields.push(TTL_FIELD.to_string());
        fields.push(USE_TTL_FIELD.to_string());
    }
    fields
}

/// Read every entity of `record_type` in a zone and group them by owner name.
///
/// Follows `next_page_id` until the grid stops returning one. Groups keep the order
/// in which owner names were first seen.
///
/// # Errors
///
/// Propagates store read errors.
pub async fn read_groups<S: RecordStore + ?Sized>(
    store: &S,
    record_type: RecordType,
    zone_identifier: &str,
    default_ttl: u32,
) -> Result<Vec<RemoteGroup>> {
    let spec = record_type.spec();

    let mut request = PageRequest::First {
        zone: zone_identifier.to_string(),
        return_fields: return_fields(spec),
    };
    let mut entities: Vec<RemoteEntity> = Vec::new();
    let mut pages = 0;
    loop {
        let page = store.fetch_page(record_type, &request).await?;
        pages += 1;
        entities.extend(page.result);
        match page.next_page_id {
            Some(page_id) => request = PageRequest::Next { page_id },
            None => break,
        }
    }

    debug!(
        record_type = %record_type,
        zone = %zone_identifier,
        pages = pages,
        entities = entities.len(),
        "Read record entities"
    );

    Ok(group_entities(spec, entities, default_ttl))
}

/// Group entities by owner name in first-seen order.
#[must_use]
pub fn group_entities(
    spec: &TypeSpec,
    entities: Vec<RemoteEntity>,
    default_ttl: u32,
) -> Vec<RemoteGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<(String, Vec<RemoteEntity>)> = Vec::new();
    for entity in entities {
        match index.get(&entity.name) {
            Some(&position) => grouped[position].1.push(entity),
            None => {
                index.insert(entity.name.clone(), grouped.len());
                grouped.push((entity.name.clone(), vec![entity]));
            }
        }
    }

    grouped
        .into_iter()
        .map(|(owner, members)| RemoteGroup {
            owner,
            ttl: resolve_ttl(spec, &members[0], default_ttl),
            entities: members
                .into_iter()
                .map(|entity| restrict(spec, entity))
                .collect(),
        })
        .collect()
}

/// TTL of the first entity when it overrides the zone default, otherwise the default.
fn resolve_ttl(spec: &TypeSpec, first: &RemoteEntity, default_ttl: u32) -> u32 {
    if !spec.uses_ttl_override {
        return default_ttl;
    }
    match (first.use_ttl, first.ttl) {
        (Some(true), Some(ttl)) => ttl,
        _ => default_ttl,
    }
}

fn restrict(spec: &TypeSpec, entity: RemoteEntity) -> SourceEntity {
    let wanted = spec.remote_field_names();
    let fields: Fields = entity
        .fields
        .into_iter()
        .filter(|(name, _)| wanted.contains(&name.as_str()))
        .map(|(name, value)| {
            let value = if spec.is_dotted(&name) {
                with_trailing_dot(value)
            } else {
                value
            };
            (name, value)
        })
        .collect();

    SourceEntity {
        reference: entity.reference,
        fields,
    }
}

fn with_trailing_dot(value: Value) -> Value {
    match value {
        Value::String(s) if !s.ends_with('.') => Value::String(format!("{s}.")),
        other => other,
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod reader_tests;
