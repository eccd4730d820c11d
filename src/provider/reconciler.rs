// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Translation of planned record changes into entity mutations.
//!
//! Each [`Change`] is applied with the fewest creates, modifies and deletes that take
//! the grid from the existing record to the new one:
//!
//! - **Create**: one entity per value, or one per configured type for ALIAS
//! - **Delete**: every backing entity
//! - **Update**: single types modify their entity; multi types diff their value sets
//!   and only touch values that appeared, vanished, or need a new TTL; ALIAS diffs the
//!   configured types against the entities present
//!
//! Mutations are issued one at a time. The first failure aborts the change and the
//! mutations already issued stay in place.

use crate::constants::{NAME_FIELD, TTL_FIELD, USE_TTL_FIELD};
use crate::dns_errors::Result;
use crate::record_types::{FieldLayout, RecordType};
use crate::records::{CanonicalRecord, Change, RecordValue, SourceEntity, Zone};
use crate::store::RecordStore;
use crate::wapi::types::Fields;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Zone facts every mutation needs.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileContext<'a> {
    pub zone: &'a Zone,
    /// Zone default TTL; records at this TTL do not override it
    pub default_ttl: u32,
    pub alias_types: &'a [RecordType],
}

/// Apply one change, returning how many entity mutations were issued.
///
/// # Errors
///
/// - `InvalidRecordData` when a record's values cannot be mapped to entity fields or
///   an update or delete has no backing entity to act on
/// - `RemoteWriteError` from the first mutation the grid rejects
pub async fn reconcile<S: RecordStore + ?Sized>(
    store: &S,
    ctx: &ReconcileContext<'_>,
    change: &Change,
) -> Result<usize> {
    let record = change.record();
    debug!(
        action = change.action(),
        name = %record.name,
        record_type = %record.record_type,
        "Reconciling change"
    );

    let mutations = match change {
        Change::Create { new } => apply_create(store, ctx, new).await?,
        Change::Delete { existing } => {
            if existing.sources.is_empty() {
                return Err(existing.invalid("no backing entity to delete"));
            }
            delete_all(store, existing.sources.iter()).await?
        }
        Change::Update { existing, new } => apply_update(store, ctx, existing, new).await?,
    };

    info!(
        action = change.action(),
        name = %record.name,
        record_type = %record.record_type,
        mutations = mutations,
        "Applied change"
    );
    Ok(mutations)
}

async fn apply_create<S: RecordStore + ?Sized>(
    store: &S,
    ctx: &ReconcileContext<'_>,
    new: &CanonicalRecord,
) -> Result<usize> {
    new.validate(true)?;

    match new.record_type {
        RecordType::Alias => {
            let target = single_value(new)?;
            for alias_type in ctx.alias_types {
                let body = create_body(ctx, new, &alias_fields(new, target, *alias_type)?);
                store.create_entity(new.record_type, &body).await?;
            }
            Ok(ctx.alias_types.len())
        }
        RecordType::Cname | RecordType::Ptr => {
            let body = create_body(ctx, new, &remote_fields(new, single_value(new)?)?);
            store.create_entity(new.record_type, &body).await?;
            Ok(1)
        }
        RecordType::A
        | RecordType::Aaaa
        | RecordType::Caa
        | RecordType::Mx
        | RecordType::Naptr
        | RecordType::Ns
        | RecordType::Srv
        | RecordType::Txt => {
            for value in &new.values {
                let body = create_body(ctx, new, &remote_fields(new, value)?);
                store.create_entity(new.record_type, &body).await?;
            }
            Ok(new.values.len())
        }
    }
}

async fn apply_update<S: RecordStore + ?Sized>(
    store: &S,
    ctx: &ReconcileContext<'_>,
    existing: &CanonicalRecord,
    new: &CanonicalRecord,
) -> Result<usize> {
    new.validate(true)?;

    match new.record_type {
        RecordType::Alias => update_alias(store, ctx, existing, new).await,
        RecordType::Cname | RecordType::Ptr => {
            let source = existing
                .sources
                .first()
                .ok_or_else(|| existing.invalid("no backing entity to modify"))?;
            let body = modify_body(ctx, new, remote_fields(new, single_value(new)?)?);
            store.modify_entity(&source.reference, &body).await?;
            Ok(1)
        }
        RecordType::A
        | RecordType::Aaaa
        | RecordType::Caa
        | RecordType::Mx
        | RecordType::Naptr
        | RecordType::Ns
        | RecordType::Srv
        | RecordType::Txt => update_values(store, ctx, existing, new).await,
    }
}

/// Value-set diff: create new values, re-TTL kept values when the TTL changed,
/// delete vanished values.
async fn update_values<S: RecordStore + ?Sized>(
    store: &S,
    ctx: &ReconcileContext<'_>,
    existing: &CanonicalRecord,
    new: &CanonicalRecord,
) -> Result<usize> {
    if existing.sources.len() < existing.values.len() {
        return Err(existing.invalid("fewer backing entities than values"));
    }
    let ttl_changed = existing.ttl != new.ttl;
    let mut mutations = 0;

    for value in &new.values {
        match existing.values.iter().position(|v| v == value) {
            Some(index) if ttl_changed => {
                let body = modify_body(ctx, new, remote_fields(new, value)?);
                store
                    .modify_entity(&existing.sources[index].reference, &body)
                    .await?;
                mutations += 1;
            }
            Some(_) => {}
            None => {
                let body = create_body(ctx, new, &remote_fields(new, value)?);
                store.create_entity(new.record_type, &body).await?;
                mutations += 1;
            }
        }
    }

    let vanished = existing
        .values
        .iter()
        .zip(&existing.sources)
        .filter(|(value, _)| !new.values.contains(*value))
        .map(|(_, source)| source);
    mutations += delete_all(store, vanished).await?;

    Ok(mutations)
}

/// Tag-map diff: create entities for missing types, modify entities whose target
/// or TTL differ, delete entities for types no longer configured.
async fn update_alias<S: RecordStore + ?Sized>(
    store: &S,
    ctx: &ReconcileContext<'_>,
    existing: &CanonicalRecord,
    new: &CanonicalRecord,
) -> Result<usize> {
    let target = single_value(new)?;
    let spec = RecordType::Alias.spec();
    let tag_field = spec.discriminator.unwrap_or_default();

    let mut by_tag: BTreeMap<String, &SourceEntity> = BTreeMap::new();
    let mut stale: Vec<&SourceEntity> = Vec::new();
    for source in &existing.sources {
        let tag = source
            .fields
            .get(tag_field)
            .and_then(Value::as_str)
            .map(str::to_ascii_uppercase)
            .unwrap_or_default();
        let configured = ctx.alias_types.iter().any(|t| t.as_str() == tag);
        if configured && !by_tag.contains_key(&tag) {
            by_tag.insert(tag, source);
        } else {
            stale.push(source);
        }
    }

    let ttl_changed = existing.ttl != new.ttl;
    let mut mutations = 0;
    for alias_type in ctx.alias_types {
        let fields = alias_fields(new, target, *alias_type)?;
        match by_tag.get(alias_type.as_str()) {
            Some(source) => {
                if ttl_changed || !same_remote_fields(source, &fields) {
                    let body = modify_body(ctx, new, fields);
                    store.modify_entity(&source.reference, &body).await?;
                    mutations += 1;
                }
            }
            None => {
                let body = create_body(ctx, new, &fields);
                store.create_entity(new.record_type, &body).await?;
                mutations += 1;
            }
        }
    }

    mutations += delete_all(store, stale.into_iter()).await?;
    Ok(mutations)
}

async fn delete_all<'a, S: RecordStore + ?Sized>(
    store: &S,
    sources: impl Iterator<Item = &'a SourceEntity>,
) -> Result<usize> {
    let mut deleted = 0;
    for source in sources {
        store.delete_entity(&source.reference).await?;
        deleted += 1;
    }
    Ok(deleted)
}

fn single_value(record: &CanonicalRecord) -> Result<&RecordValue> {
    record
        .value()
        .ok_or_else(|| record.invalid("record has no values"))
}

/// Remote fields for one value, FQDNs without their trailing dot.
fn remote_fields(record: &CanonicalRecord, value: &RecordValue) -> Result<Fields> {
    let spec = record.record_type.spec();
    let mut fields = Fields::new();
    match (&spec.layout, value) {
        (FieldLayout::Scalar(mapping), RecordValue::Text(text)) => {
            let text = if mapping.dotted {
                strip_trailing_dot(text)
            } else {
                text.clone()
            };
            fields.insert(mapping.remote.to_string(), Value::String(text));
        }
        (FieldLayout::Structured(mappings), RecordValue::Fields(values)) => {
            for mapping in *mappings {
                let value = values.get(mapping.canonical).ok_or_else(|| {
                    record.invalid(&format!("missing field '{}'", mapping.canonical))
                })?;
                let value = match value {
                    Value::String(s) if mapping.dotted => Value::String(strip_trailing_dot(s)),
                    other => other.clone(),
                };
                fields.insert(mapping.remote.to_string(), value);
            }
        }
        (FieldLayout::Scalar(_), RecordValue::Fields(_))
        | (FieldLayout::Structured(_), RecordValue::Text(_)) => {
            return Err(record.invalid("value does not match the record type"));
        }
    }
    Ok(fields)
}

fn alias_fields(
    record: &CanonicalRecord,
    target: &RecordValue,
    alias_type: RecordType,
) -> Result<Fields> {
    let mut fields = remote_fields(record, target)?;
    if let Some(tag_field) = RecordType::Alias.spec().discriminator {
        fields.insert(
            tag_field.to_string(),
            Value::String(alias_type.as_str().to_string()),
        );
    }
    Ok(fields)
}

/// Whether a stored entity already carries `fields`, ignoring trailing dots.
fn same_remote_fields(source: &SourceEntity, fields: &Fields) -> bool {
    fields.iter().all(|(name, wanted)| {
        match (source.fields.get(name), wanted) {
            (Some(Value::String(have)), Value::String(want)) => {
                strip_trailing_dot(have) == *want
            }
            (Some(have), want) => have == want,
            (None, _) => false,
        }
    })
}

fn strip_trailing_dot(value: &str) -> String {
    if value == "." {
        return value.to_string();
    }
    value.strip_suffix('.').unwrap_or(value).to_string()
}

fn ttl_fields(record: &CanonicalRecord, default_ttl: u32, body: &mut Fields) {
    if record.record_type.spec().uses_ttl_override {
        body.insert(TTL_FIELD.to_string(), Value::from(record.ttl));
        body.insert(USE_TTL_FIELD.to_string(), Value::Bool(record.ttl != default_ttl));
    }
}

fn create_body(ctx: &ReconcileContext<'_>, record: &CanonicalRecord, fields: &Fields) -> Fields {
    let mut body = Fields::new();
    body.insert(
        NAME_FIELD.to_string(),
        Value::String(ctx.zone.fqdn_for(&record.name)),
    );
    body.extend(fields.clone());
    ttl_fields(record, ctx.default_ttl, &mut body);
    body
}

fn modify_body(ctx: &ReconcileContext<'_>, record: &CanonicalRecord, fields: Fields) -> Fields {
    let mut body = fields;
    ttl_fields(record, ctx.default_ttl, &mut body);
    body
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
