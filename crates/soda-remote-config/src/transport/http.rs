//! Desktop/editor transport issuing plain HTTP GET requests.
//!
//! Requests target `{server_url}/api/games/{bundle_id}/configs/{config_name}`
//! and carry the client identification headers the configuration server
//! expects. Every outcome other than a 2xx response with a readable body is
//! reported as a [`TransportError`]; 404 and 5xx statuses are logged with
//! dedicated messages but are otherwise treated like any other failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use soda_config_proto::{config_url, headers};
use tracing::{debug, error, info, warn};

use super::{ConfigTransport, TransportError};
use crate::device;

/// Fixed budget for a configuration request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Platform label reported in `X-Platform` unless overridden.
pub const DEFAULT_PLATFORM_NAME: &str = "Desktop";

/// Options controlling how the HTTP transport identifies itself.
#[derive(Debug, Clone)]
pub struct HttpTransportOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value of the `X-Platform` header.
    pub platform_name: String,
    /// Client version advertised in `User-Agent`.
    pub client_version: String,
    /// Explicit device identifier; detected when `None`.
    pub device_id: Option<String>,
    /// Host-owned reachability flag. Clones of the options, and every
    /// transport built from them, share it.
    pub network_available: Arc<AtomicBool>,
}

impl HttpTransportOptions {
    /// Records the host's view of network reachability for every transport
    /// built from these options.
    pub fn set_network_available(&self, available: bool) {
        self.network_available.store(available, Ordering::Relaxed);
    }
}

impl Default for HttpTransportOptions {
    fn default() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
            platform_name: DEFAULT_PLATFORM_NAME.to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            device_id: None,
            network_available: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// HTTP implementation of [`ConfigTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    options: HttpTransportOptions,
    build_version: String,
    device_id: String,
    network_available: Arc<AtomicBool>,
}

impl HttpTransport {
    /// Builds the transport and its underlying HTTP client.
    pub fn new(
        options: HttpTransportOptions,
        build_version: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(TransportError::Client)?;
        let device_id = options
            .device_id
            .clone()
            .unwrap_or_else(|| device::resolve_device_id(&options.platform_name));

        let network_available = options.network_available.clone();
        Ok(Self {
            client,
            options,
            build_version: build_version.into(),
            device_id,
            network_available,
        })
    }

    /// Records the host's view of network reachability. While unreachable,
    /// fetches fail immediately without touching the network.
    pub fn set_network_available(&self, available: bool) {
        self.network_available.store(available, Ordering::Relaxed);
    }

    pub fn user_agent(&self) -> String {
        format!("SodaSDK-Rust/{}", self.options.client_version)
    }

    fn request_headers(&self, bundle_id: &str) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::new();
        let entries = [
            (headers::CONTENT_TYPE, headers::JSON_CONTENT_TYPE.to_string()),
            (headers::USER_AGENT, self.user_agent()),
            (headers::BUNDLE_ID, bundle_id.to_string()),
            (headers::BUILD_VERSION, self.build_version.clone()),
            (headers::DEVICE_ID, self.device_id.clone()),
            (headers::PLATFORM, self.options.platform_name.clone()),
        ];
        for (name, value) in entries {
            let value =
                HeaderValue::from_str(&value).map_err(|_| TransportError::InvalidHeader(name))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

#[async_trait]
impl ConfigTransport for HttpTransport {
    async fn fetch_config(
        &self,
        bundle_id: &str,
        server_url: &str,
        config_name: &str,
    ) -> Result<String, TransportError> {
        if !self.is_network_available() {
            warn!("network not available");
            return Err(TransportError::NetworkUnavailable);
        }

        let url = config_url(server_url, bundle_id, config_name);
        info!(url = %url, "fetching config");

        let response = self
            .client
            .get(&url)
            .headers(self.request_headers(bundle_id)?)
            .send()
            .await
            .map_err(|err| {
                error!(url = %url, error = %err, timeout = err.is_timeout(), "network error");
                TransportError::Connection(err)
            })?;

        let status = response.status();
        if status.is_success() {
            return match response.text().await {
                Ok(body) => {
                    debug!(status = %status, body_len = body.len(), "config fetched successfully");
                    Ok(body)
                }
                Err(err) => {
                    error!(error = %err, "failed to read config response body");
                    Err(TransportError::Body(err))
                }
            };
        }

        Err(classify_status(status))
    }

    fn is_network_available(&self) -> bool {
        self.network_available.load(Ordering::Relaxed)
    }

    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn name(&self) -> &'static str {
        "HttpTransport"
    }
}

/// Maps a non-success status to its error, logging 404 and 5xx distinctly.
fn classify_status(status: StatusCode) -> TransportError {
    if status == StatusCode::NOT_FOUND {
        warn!("config not found (404)");
        return TransportError::NotFound;
    }
    if status.is_server_error() {
        error!(status = status.as_u16(), "server error");
        return TransportError::Server(status.as_u16());
    }
    error!(status = status.as_u16(), "protocol error");
    TransportError::Status(status.as_u16())
}
