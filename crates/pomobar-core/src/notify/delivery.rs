//! Session event delivery to the configured HTTP endpoint.
//!
//! Delivery is at-most-once and best-effort: one POST per event, no retry,
//! no queue. The timer never observes the outcome; responses are logged
//! for diagnostics only.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use tokio::runtime::Handle;
use url::Url;

use crate::error::{ConfigError, CoreError, DeliveryError};
use crate::events::EventRecord;
use crate::storage::EndpointConfig;

/// Capability to hand off an event record without waiting for the result.
pub trait EventDelivery: Send + Sync {
    fn deliver(&self, record: EventRecord);
}

/// Outcome of one awaited request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub status: u16,
    pub body: String,
}

/// POSTs each record as JSON to a fixed endpoint.
#[derive(Clone)]
pub struct HttpDelivery {
    client: Client,
    endpoint: Url,
    headers: HeaderMap,
    runtime: Option<Handle>,
}

impl HttpDelivery {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(endpoint: Url) -> Result<Self, DeliveryError> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            headers: HeaderMap::new(),
            runtime: Handle::try_current().ok(),
        })
    }

    /// Build from the `[endpoint]` section of the configuration.
    pub fn from_config(config: &EndpointConfig) -> Result<Self, CoreError> {
        let mut delivery =
            Self::with_timeout(config.url()?, Duration::from_secs(config.timeout_secs))?;
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            delivery = delivery.with_api_key(&config.api_key_header, key).map_err(|e| {
                ConfigError::invalid("endpoint.api_key", e.to_string())
            })?;
        }
        Ok(delivery)
    }

    /// Attach a static API-key header to every request.
    pub fn with_api_key(mut self, header: &str, key: &str) -> Result<Self, DeliveryError> {
        let name = HeaderName::from_bytes(header.as_bytes())
            .map_err(|e| DeliveryError::InvalidHeader(format!("{header}: {e}")))?;
        let mut value = HeaderValue::from_str(key)
            .map_err(|e| DeliveryError::InvalidHeader(format!("{header} value: {e}")))?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Runtime on which detached requests are spawned.
    ///
    /// Defaults to the runtime current at construction; when neither exists
    /// `deliver` logs and drops the record.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one record and wait for the response.
    pub async fn send(&self, record: &EventRecord) -> Result<DeliveryReport, DeliveryError> {
        let body = record.to_json()?;
        self.post(body).await
    }

    async fn post(&self, body: Vec<u8>) -> Result<DeliveryReport, DeliveryError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(DeliveryReport {
            status: status.as_u16(),
            body,
        })
    }
}

impl EventDelivery for HttpDelivery {
    fn deliver(&self, record: EventRecord) {
        let body = match record.to_json() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(action = %record.action, error = %e, "failed to encode session event");
                return;
            }
        };
        tracing::debug!(
            endpoint = %self.endpoint,
            body = %String::from_utf8_lossy(&body),
            "posting session event"
        );

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!(action = %record.action, "no async runtime available, dropping session event");
            return;
        };

        let this = self.clone();
        let action = record.action;
        let session_id = record.session_id;
        runtime.spawn(async move {
            match this.post(body).await {
                Ok(report) => tracing::debug!(
                    %action,
                    %session_id,
                    status = report.status,
                    response = %report.body,
                    "session event delivered"
                ),
                Err(e) => tracing::warn!(%action, %session_id, error = %e, "session event delivery failed"),
            }
        });
    }
}

/// Delivery switched off in the configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDelivery;

impl EventDelivery for DisabledDelivery {
    fn deliver(&self, record: EventRecord) {
        tracing::debug!(action = %record.action, "event delivery disabled, dropping");
    }
}
