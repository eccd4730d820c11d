// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`RecordStore`] that records every call, for unit tests.

use crate::dns_errors::{RemoteError, Result};
use crate::record_types::RecordType;
use crate::store::RecordStore;
use crate::wapi::types::{Fields, Page, PageRequest, RemoteEntity, Schema, WapiRef, ZoneAuth};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A write issued against the store.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StoreCall {
    CreateZone(Fields),
    Create(RecordType, Fields),
    Modify(WapiRef, Fields),
    Delete(WapiRef),
}

pub(crate) struct MemoryStore {
    pub schema: Schema,
    pub api_version: String,
    pub zones: Mutex<Vec<ZoneAuth>>,
    pub entities: BTreeMap<RecordType, Vec<RemoteEntity>>,
    pub page_size: usize,
    /// Writes allowed to succeed before every further write fails
    pub fail_after_writes: Option<usize>,
    pub calls: Mutex<Vec<StoreCall>>,
    pub page_requests: Mutex<Vec<(RecordType, PageRequest)>>,
}

impl MemoryStore {
    /// Store advertising every record type and holding no zones.
    pub fn new() -> Self {
        let mut supported_objects: Vec<String> =
            RecordType::ALL.iter().map(|t| t.wapi_object()).collect();
        supported_objects.push("zone_auth".to_string());
        Self {
            schema: Schema {
                supported_versions: vec!["1.0".to_string(), "2.12".to_string()],
                supported_objects,
            },
            api_version: "1.0".to_string(),
            zones: Mutex::new(Vec::new()),
            entities: BTreeMap::new(),
            page_size: 1000,
            fail_after_writes: None,
            calls: Mutex::new(Vec::new()),
            page_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_zone(self, fqdn: &str, soa_default_ttl: u32) -> Self {
        self.zones.lock().unwrap().push(ZoneAuth {
            reference: WapiRef::new(format!("zone_auth/{fqdn}/default")),
            fqdn: fqdn.to_string(),
            view: Some("default".to_string()),
            soa_default_ttl: Some(soa_default_ttl),
        });
        self
    }

    /// Add an entity; `fields` must be a JSON object carrying at least `name`.
    pub fn with_entity(mut self, record_type: RecordType, fields: Value) -> Self {
        let list = self.entities.entry(record_type).or_default();
        let mut object = fields.as_object().cloned().unwrap();
        object
            .entry("_ref")
            .or_insert_with(|| Value::String(format!("{}/{}", record_type.wapi_object(), list.len())));
        list.push(serde_json::from_value(Value::Object(object)).unwrap());
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record_write(&self, call: StoreCall) -> Result<usize> {
        let mut calls = self.calls.lock().unwrap();
        if self.fail_after_writes.is_some_and(|limit| calls.len() >= limit) {
            return Err(RemoteError::RemoteWriteError {
                operation: "write".to_string(),
                object: format!("{call:?}"),
                status_code: Some(400),
                reason: "WapiBadRequest: rejected by test store".to_string(),
            }
            .into());
        }
        calls.push(call);
        Ok(calls.len())
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    fn use_api_version(&mut self, version: &str) {
        self.api_version = version.to_string();
    }

    async fn find_zone(&self, identifier: &str) -> Result<Option<ZoneAuth>> {
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .find(|zone| zone.fqdn == identifier)
            .cloned())
    }

    async fn create_zone(&self, body: &Fields) -> Result<WapiRef> {
        let count = self.record_write(StoreCall::CreateZone(body.clone()))?;
        Ok(WapiRef::new(format!("zone_auth/new-{count}")))
    }

    async fn fetch_page(&self, record_type: RecordType, request: &PageRequest) -> Result<Page> {
        self.page_requests
            .lock()
            .unwrap()
            .push((record_type, request.clone()));

        let index = match request {
            PageRequest::First { .. } => 0,
            PageRequest::Next { page_id } => page_id
                .rsplit(':')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
        };
        let all = self.entities.get(&record_type).cloned().unwrap_or_default();
        let start = index * self.page_size;
        let result: Vec<RemoteEntity> = all.iter().skip(start).take(self.page_size).cloned().collect();
        let next_page_id = (start + self.page_size < all.len())
            .then(|| format!("{}:{}", record_type.wapi_object(), index + 1));

        Ok(Page {
            result,
            next_page_id,
        })
    }

    async fn create_entity(&self, record_type: RecordType, body: &Fields) -> Result<WapiRef> {
        let count = self.record_write(StoreCall::Create(record_type, body.clone()))?;
        Ok(WapiRef::new(format!("{}/new-{count}", record_type.wapi_object())))
    }

    async fn modify_entity(&self, reference: &WapiRef, body: &Fields) -> Result<()> {
        self.record_write(StoreCall::Modify(reference.clone(), body.clone()))?;
        Ok(())
    }

    async fn delete_entity(&self, reference: &WapiRef) -> Result<()> {
        self.record_write(StoreCall::Delete(reference.clone()))?;
        Ok(())
    }
}
