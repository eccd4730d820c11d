// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Infoblox WAPI client.
//!
//! All requests go to `https://{gridmaster}/wapi/v{version}/{object}` with HTTP basic
//! authentication. Reads and creates carry the configured DNS view. Idempotent
//! requests are retried on transient failures (see [`request`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use octoblox::config::ProviderConfig;
//! use octoblox::store::RecordStore;
//! use octoblox::wapi::WapiClient;
//!
//! # async fn example() -> octoblox::dns_errors::Result<()> {
//! let config = ProviderConfig::new("grid.example.com", "admin");
//! let client = WapiClient::new(&config)?;
//! let zone = client.find_zone("unit.tests").await?;
//! # Ok(())
//! # }
//! ```

pub mod request;
pub mod types;

use crate::config::ProviderConfig;
use crate::constants::{
    DEFAULT_WAPI_VERSION, NAME_FIELD, SOA_DEFAULT_TTL_FIELD, TTL_FIELD, USER_AGENT,
    USE_TTL_FIELD, VIEW_FIELD, WAPI_PAGE_SIZE, WAPI_PATH_PREFIX, ZONE_AUTH_OBJECT,
};
use crate::dns_errors::{DnsError, RemoteError, Result};
use crate::record_types::RecordType;
use crate::store::RecordStore;
use request::{wapi_request, RequestFailure, Session, WapiRequest};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use types::{Fields, Page, PageRequest, Schema, WapiRef, ZoneAuth};

/// Build the server URL from a configured grid master.
///
/// A value with a scheme is used as-is; a bare host gets `https://`. Trailing
/// slashes are removed.
#[must_use]
pub fn build_server_url(gridmaster: &str) -> String {
    let trimmed = gridmaster.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// HTTP client for one grid.
pub struct WapiClient {
    http: HttpClient,
    server_url: String,
    api_version: String,
    username: String,
    password: String,
    view: Option<String>,
    retry_max_elapsed: Duration,
}

impl WapiClient {
    /// Build a client from provider configuration.
    ///
    /// The API version starts at the configured one (or `1.0`); the provider switches
    /// it after schema discovery.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the grid master is not a valid URL and
    /// `Transport` when the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let server_url = build_server_url(&config.gridmaster);
        url::Url::parse(&server_url).map_err(|e| {
            DnsError::Configuration(format!("invalid gridmaster '{}': {e}", config.gridmaster))
        })?;

        let http = HttpClient::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.verify)
            .build()
            .map_err(|e| DnsError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            server_url,
            api_version: config
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_WAPI_VERSION.to_string()),
            username: config.username.clone(),
            password: config.resolved_password(),
            view: config.dns_view.clone(),
            retry_max_elapsed: config.retry_max_elapsed(),
        })
    }

    /// `{server}/wapi/v{version}/`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}/{WAPI_PATH_PREFIX}/v{}/",
            self.server_url, self.api_version
        )
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn url_for(&self, object: &str) -> String {
        format!("{}{object}", self.base_url())
    }

    fn session(&self) -> Session<'_> {
        Session {
            http: &self.http,
            username: &self.username,
            password: &self.password,
            retry_max_elapsed: self.retry_max_elapsed,
        }
    }

    fn view_param(&self) -> Option<(String, String)> {
        self.view
            .as_ref()
            .map(|view| (VIEW_FIELD.to_string(), view.clone()))
    }

    /// Body with the configured view added when the caller did not set one.
    fn with_view(&self, body: &Fields) -> Fields {
        let mut body = body.clone();
        if let Some(view) = &self.view {
            body.entry(VIEW_FIELD)
                .or_insert_with(|| Value::String(view.clone()));
        }
        body
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        object: &str,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let request: WapiRequest<'_, Value> = WapiRequest {
            method: Method::GET,
            url,
            query,
            body: None,
        };
        let text = wapi_request(&self.session(), &request)
            .await
            .map_err(|failure| failure.into_read_error(object))?;
        decode(object, &text)
    }

    async fn write(
        &self,
        method: Method,
        operation: &str,
        object: &str,
        body: Option<&Fields>,
    ) -> std::result::Result<String, RequestFailure> {
        let url = self.url_for(object);
        let request = WapiRequest {
            method,
            url: &url,
            query: &[],
            body,
        };
        debug!(operation = %operation, object = %object, "WAPI write");
        wapi_request(&self.session(), &request).await
    }
}

fn decode<T: DeserializeOwned>(object: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        RemoteError::UnexpectedResponse {
            object: object.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[async_trait::async_trait]
impl RecordStore for WapiClient {
    async fn schema(&self) -> Result<Schema> {
        let url = format!("{}?_schema", self.base_url());
        self.get_json("_schema", &url, &[]).await
    }

    fn use_api_version(&mut self, version: &str) {
        self.api_version = version.to_string();
    }

    async fn find_zone(&self, identifier: &str) -> Result<Option<ZoneAuth>> {
        let mut query = vec![
            ("fqdn".to_string(), identifier.to_string()),
            (
                "_return_fields+".to_string(),
                SOA_DEFAULT_TTL_FIELD.to_string(),
            ),
        ];
        query.extend(self.view_param());

        let zones: Vec<ZoneAuth> = self
            .get_json(ZONE_AUTH_OBJECT, &self.url_for(ZONE_AUTH_OBJECT), &query)
            .await?;
        debug!(identifier = %identifier, found = zones.len(), "Looked up zone");
        Ok(zones.into_iter().next())
    }

    async fn create_zone(&self, body: &Fields) -> Result<WapiRef> {
        let body = self.with_view(body);
        let text = self
            .write(Method::POST, "create", ZONE_AUTH_OBJECT, Some(&body))
            .await
            .map_err(|failure| failure.into_write_error("create", ZONE_AUTH_OBJECT))?;
        let reference: WapiRef = decode(ZONE_AUTH_OBJECT, &text)?;
        info!(reference = %reference, "Created zone");
        Ok(reference)
    }

    async fn fetch_page(&self, record_type: RecordType, request: &PageRequest) -> Result<Page> {
        let object = record_type.wapi_object();
        let query = match request {
            PageRequest::First {
                zone,
                return_fields,
            } => {
                let mut query = vec![
                    ("zone".to_string(), zone.clone()),
                    ("_return_fields+".to_string(), return_fields.join(",")),
                    ("_paging".to_string(), "1".to_string()),
                    ("_max_results".to_string(), WAPI_PAGE_SIZE.to_string()),
                    ("_return_as_object".to_string(), "1".to_string()),
                ];
                query.extend(self.view_param());
                query
            }
            PageRequest::Next { page_id } => {
                vec![("_page_id".to_string(), page_id.clone())]
            }
        };

        let page: Page = self.get_json(&object, &self.url_for(&object), &query).await?;
        debug!(
            record_type = %record_type,
            entities = page.result.len(),
            more = page.next_page_id.is_some(),
            "Fetched record page"
        );
        Ok(page)
    }

    async fn create_entity(&self, record_type: RecordType, body: &Fields) -> Result<WapiRef> {
        let object = record_type.wapi_object();
        let body = self.with_view(body);
        let text = self
            .write(Method::POST, "create", &object, Some(&body))
            .await
            .map_err(|failure| failure.into_write_error("create", &object))?;
        let reference: WapiRef = decode(&object, &text)?;
        info!(
            record_type = %record_type,
            name = ?body.get(NAME_FIELD),
            ttl = ?body.get(TTL_FIELD),
            use_ttl = ?body.get(USE_TTL_FIELD),
            reference = %reference,
            "Created record entity"
        );
        Ok(reference)
    }

    async fn modify_entity(&self, reference: &WapiRef, body: &Fields) -> Result<()> {
        self.write(Method::PUT, "modify", reference.as_str(), Some(body))
            .await
            .map_err(|failure| failure.into_write_error("modify", reference.as_str()))?;
        info!(reference = %reference, "Modified record entity");
        Ok(())
    }

    async fn delete_entity(&self, reference: &WapiRef) -> Result<()> {
        self.write(Method::DELETE, "delete", reference.as_str(), None)
            .await
            .map_err(|failure| failure.into_write_error("delete", reference.as_str()))?;
        info!(reference = %reference, "Deleted record entity");
        Ok(())
    }
}
