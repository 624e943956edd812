//! Transport delegating to a platform-provided native bridge.
//!
//! Mobile hosts perform the HTTP request in native code. The bridge call is
//! blocking and has no timeout of its own, so it runs on the blocking thread
//! pool. Empty payloads, bridge errors and panics inside the bridge all
//! surface as transport failures.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{ConfigTransport, TransportError};
use crate::device;

/// Platform label used for the fallback device identifier.
const BRIDGE_ENVIRONMENT: &str = "native_bridge";

/// Error raised by a native bridge implementation.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BridgeError(pub String);

/// Native-side configuration fetcher.
pub trait NativeBridge: Send + Sync {
    /// Performs the request and returns the raw body. Blocks until done.
    fn get_config(
        &self,
        bundle_id: &str,
        server_url: &str,
        config_name: &str,
        device_id: &str,
        build_version: &str,
    ) -> Result<String, BridgeError>;

    /// The platform's unique device identifier, when it exposes one.
    fn device_unique_id(&self) -> Option<String> {
        None
    }

    fn is_network_available(&self) -> bool {
        true
    }
}

/// [`ConfigTransport`] over a [`NativeBridge`].
pub struct BridgeTransport {
    bridge: Arc<dyn NativeBridge>,
    device_id: String,
    build_version: String,
}

impl BridgeTransport {
    pub fn new(bridge: Arc<dyn NativeBridge>, build_version: impl Into<String>) -> Self {
        let device_id = bridge
            .device_unique_id()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| device::resolve_device_id(BRIDGE_ENVIRONMENT));
        Self {
            bridge,
            device_id,
            build_version: build_version.into(),
        }
    }
}

#[async_trait]
impl ConfigTransport for BridgeTransport {
    async fn fetch_config(
        &self,
        bundle_id: &str,
        server_url: &str,
        config_name: &str,
    ) -> Result<String, TransportError> {
        info!(bundle_id, config_name, "fetching config through native bridge");

        let bridge = Arc::clone(&self.bridge);
        let (bundle_id, server_url, config_name) = (
            bundle_id.to_string(),
            server_url.to_string(),
            config_name.to_string(),
        );
        let (device_id, build_version) = (self.device_id.clone(), self.build_version.clone());

        let joined = tokio::task::spawn_blocking(move || {
            bridge.get_config(
                &bundle_id,
                &server_url,
                &config_name,
                &device_id,
                &build_version,
            )
        })
        .await;

        match joined {
            Ok(Ok(body)) if is_empty_payload(&body) => {
                warn!("empty or failed response from native bridge");
                Err(TransportError::EmptyResponse)
            }
            Ok(Ok(body)) => {
                debug!(body_len = body.len(), "config fetched successfully");
                Ok(body)
            }
            Ok(Err(err)) => {
                error!(error = %err, "native bridge call failed");
                Err(TransportError::Bridge(err))
            }
            Err(join_err) => {
                error!(error = %join_err, "native bridge task aborted");
                Err(TransportError::BridgeAborted(join_err.to_string()))
            }
        }
    }

    fn is_network_available(&self) -> bool {
        self.bridge.is_network_available()
    }

    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn name(&self) -> &'static str {
        "BridgeTransport"
    }
}

/// The bridge signals failure with an empty string or an empty object.
fn is_empty_payload(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.is_empty() || trimmed == "{}"
}
