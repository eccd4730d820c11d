// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The remote operations the engine performs against a grid.
//!
//! [`crate::wapi::WapiClient`] implements this over HTTP. Keeping the engine behind a
//! trait lets the reader, reconciler and provisioner run against an in-memory store.

use crate::dns_errors::Result;
use crate::record_types::RecordType;
use crate::wapi::types::{Fields, Page, PageRequest, Schema, WapiRef, ZoneAuth};

/// Remote DNS store holding independently addressable record entities.
///
/// Implementations add the DNS view to every read and create themselves, so callers
/// never pass it.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the schema: advertised API versions and object types.
    async fn schema(&self) -> Result<Schema>;

    /// Switch subsequent requests to `version`.
    fn use_api_version(&mut self, version: &str);

    /// Look up an authoritative zone by identifier, returning `None` when absent.
    async fn find_zone(&self, identifier: &str) -> Result<Option<ZoneAuth>>;

    /// Create an authoritative zone.
    async fn create_zone(&self, body: &Fields) -> Result<WapiRef>;

    /// Read one page of entities of `record_type`.
    async fn fetch_page(&self, record_type: RecordType, request: &PageRequest) -> Result<Page>;

    /// Create one entity of `record_type`.
    async fn create_entity(&self, record_type: RecordType, body: &Fields) -> Result<WapiRef>;

    /// Overwrite fields of an existing entity.
    async fn modify_entity(&self, reference: &WapiRef, body: &Fields) -> Result<()>;

    /// Remove an entity.
    async fn delete_entity(&self, reference: &WapiRef) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod memory;
