// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # octoblox - Infoblox WAPI DNS reconciliation engine
//!
//! octoblox keeps an Infoblox grid in line with a declarative set of DNS records. It
//! reads a zone's entities over the WAPI into canonical records (name, type, TTL,
//! values) and applies planned create/update/delete changes back as the smallest set
//! of entity mutations.
//!
//! ## Modules
//!
//! - [`record_types`] - how each record type maps onto WAPI entities
//! - [`zone_id`] - zone names to WAPI zone identifiers, including reverse zones
//! - [`records`] - canonical records, zones and planned changes
//! - [`provider`] - populate and apply: reader, builder, reconciler, provisioner
//! - [`store`] - the remote operations the engine needs
//! - [`wapi`] - HTTP client for the WAPI
//! - [`config`] - provider configuration
//! - [`dns_errors`] / [`http_errors`] - error types and HTTP status mapping
//!
//! ## Example
//!
//! ```rust,no_run
//! use octoblox::config::ProviderConfig;
//! use octoblox::provider::InfobloxProvider;
//! use octoblox::record_types::RecordType;
//! use octoblox::records::{CanonicalRecord, Change, RecordValue};
//!
//! # async fn example() -> octoblox::dns_errors::Result<()> {
//! let config = ProviderConfig::load(std::path::Path::new("octoblox.yaml"))?;
//! let provider = InfobloxProvider::connect("infoblox", config).await?;
//!
//! let www = CanonicalRecord::new("www", RecordType::A, 300, vec![RecordValue::from("192.168.0.2")]);
//! provider.apply("unit.tests.", &[Change::Create { new: www }]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Record Types** - A, AAAA, ALIAS, CAA, CNAME, MX, NAPTR, NS, PTR, SRV, TXT
//! - **ALIAS Emulation** - one entity per configured target type, with drift detection
//! - **Reverse Zones** - `in-addr.arpa.` and `ip6.arpa.` zones addressed by network
//! - **Retries** - idempotent requests retried with exponential backoff

pub mod config;
pub mod constants;
pub mod dns_errors;
pub mod http_errors;
pub mod provider;
pub mod record_types;
pub mod records;
pub mod retry;
pub mod store;
pub mod wapi;
pub mod zone_id;
