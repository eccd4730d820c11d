// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Infoblox provider: reads zones into canonical records and applies planned changes.
//!
//! # Architecture
//!
//! - [`reader`] - paged retrieval of entities, grouped by owner name
//! - [`builder`] - canonical records from entity groups, ALIAS emulation
//! - [`reconciler`] - entity mutations for one planned change
//! - [`provisioner`] - zone lookup and creation
//!
//! The provider discovers the grid's schema once when it is built. Call
//! [`InfobloxProvider::reinitialize`] to discover it again.
//!
//! # Example
//!
//! ```rust,no_run
//! use octoblox::config::ProviderConfig;
//! use octoblox::provider::InfobloxProvider;
//! use octoblox::records::Zone;
//!
//! # async fn example() -> octoblox::dns_errors::Result<()> {
//! let config = ProviderConfig::from_yaml("gridmaster: grid.example.com\nusername: admin\n")?;
//! let provider = InfobloxProvider::connect("infoblox", config).await?;
//!
//! let mut zone = Zone::new("unit.tests.");
//! let exists = provider.populate(&mut zone, true, false).await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod provisioner;
pub mod reader;
pub mod reconciler;

use crate::config::ProviderConfig;
use crate::dns_errors::{RecordError, Result};
use crate::records::{Change, Zone};
use crate::store::RecordStore;
use crate::wapi::types::Capabilities;
use crate::wapi::WapiClient;
use builder::{build_record, AliasView};
use provisioner::ZoneInfo;
use reconciler::{reconcile, ReconcileContext};
use tracing::{debug, info};

/// Reconciliation engine bound to one grid.
pub struct InfobloxProvider<S: RecordStore = WapiClient> {
    id: String,
    config: ProviderConfig,
    capabilities: Capabilities,
    store: S,
}

impl InfobloxProvider<WapiClient> {
    /// Build a provider talking to the grid named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for invalid settings and propagates schema read errors.
    pub async fn connect(id: impl Into<String>, config: ProviderConfig) -> Result<Self> {
        let client = WapiClient::new(&config)?;
        Self::initialize(id, config, client).await
    }
}

impl<S: RecordStore> InfobloxProvider<S> {
    /// Build a provider over an arbitrary store, discovering its schema.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for invalid settings and propagates schema read errors.
    pub async fn initialize(id: impl Into<String>, config: ProviderConfig, store: S) -> Result<Self> {
        config.validate()?;
        let mut provider = Self {
            id: id.into(),
            config,
            capabilities: Capabilities {
                api_version: String::new(),
                record_types: Default::default(),
            },
            store,
        };
        provider.reinitialize().await?;
        Ok(provider)
    }

    /// Discover the schema again and switch to the negotiated API version.
    ///
    /// # Errors
    ///
    /// Propagates schema read errors.
    pub async fn reinitialize(&mut self) -> Result<()> {
        let schema = self.store.schema().await?;
        self.capabilities = Capabilities::negotiate(&schema, self.config.api_version.as_deref());
        self.store.use_api_version(&self.capabilities.api_version);

        info!(
            id = %self.id,
            gridmaster = %self.config.gridmaster,
            username = %self.config.username,
            api_version = %self.capabilities.api_version,
            record_types = ?self.capabilities.record_types,
            "Infoblox provider initialized"
        );
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look the zone up without creating it.
    ///
    /// # Errors
    ///
    /// Propagates resolution and read errors.
    pub async fn zone_info(&self, zone_name: &str) -> Result<Option<ZoneInfo>> {
        provisioner::lookup(&self.store, &self.config, zone_name).await
    }

    /// Load every record the grid holds for `zone` into it.
    ///
    /// `target` marks the call as reading current state: ALIAS records whose entities
    /// drifted from the configured types come back desynchronized. `lenient` relaxes
    /// record validation.
    ///
    /// Returns `false`, leaving `zone` untouched, when the zone does not exist.
    ///
    /// # Errors
    ///
    /// Propagates resolution, read and record validation errors.
    pub async fn populate(&self, zone: &mut Zone, target: bool, lenient: bool) -> Result<bool> {
        debug!(zone = %zone.name, target = target, lenient = lenient, "populate");

        let Some(info) = self.zone_info(&zone.name).await? else {
            return Ok(false);
        };

        let before = zone.records().len();
        let alias = AliasView {
            alias_types: &self.config.alias_types,
            target,
        };
        for record_type in &self.capabilities.record_types {
            let groups =
                reader::read_groups(&self.store, *record_type, &info.identifier, info.default_ttl)
                    .await?;
            for group in groups {
                let record = build_record(zone, *record_type, group, alias)?;
                zone.add_record(record, lenient)?;
            }
        }

        info!(
            zone = %zone.name,
            records = zone.records().len() - before,
            default_ttl = info.default_ttl,
            "Populated zone"
        );
        Ok(true)
    }

    /// Apply planned changes to a zone, in order.
    ///
    /// The zone is looked up (or created) once. Every change type is checked
    /// against the grid's capabilities before anything is written. Changes are not
    /// transactional: when one fails, earlier changes and earlier mutations of the
    /// failing change remain applied.
    ///
    /// Returns the number of changes applied.
    ///
    /// # Errors
    ///
    /// - `UnsupportedType` when the grid does not offer a change's record type
    /// - `ZoneNotFound` / `ZoneCreationFailed` from zone provisioning
    /// - `InvalidRecordData` / `RemoteWriteError` from reconciliation
    pub async fn apply(&self, zone_name: &str, changes: &[Change]) -> Result<usize> {
        if let Some(unsupported) = changes
            .iter()
            .map(|change| change.record().record_type)
            .find(|record_type| !self.capabilities.supports(*record_type))
        {
            return Err(RecordError::UnsupportedType {
                record_type: unsupported.to_string(),
            }
            .into());
        }

        let info = provisioner::ensure(&self.store, &self.config, zone_name).await?;
        let zone = Zone::new(&info.zone);
        let ctx = ReconcileContext {
            zone: &zone,
            default_ttl: info.default_ttl,
            alias_types: &self.config.alias_types,
        };

        let mut mutations = 0;
        for change in changes {
            mutations += reconcile(&self.store, &ctx, change).await?;
        }

        info!(
            zone = %zone.name,
            changes = changes.len(),
            mutations = mutations,
            "Applied changes"
        );
        Ok(changes.len())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
