//! Environment-specific configuration transports.
//!
//! Every transport fetches the raw response body for a
//! `(bundle_id, server_url, config_name)` tuple. The service only sees the
//! [`ConfigTransport`] trait; which implementation runs is decided at
//! initialization from the injected [`RuntimeEnvironment`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod bridge;
pub mod http;
pub mod memory;

pub use bridge::{BridgeError, BridgeTransport, NativeBridge};
pub use http::{HttpTransport, HttpTransportOptions, REQUEST_TIMEOUT};
pub use memory::{MemoryTransport, RecordedFetch};

/// Failure taxonomy shared by all transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The host reported that no network is reachable.
    #[error("network not available")]
    NetworkUnavailable,
    /// Connection, DNS, TLS or timeout failure.
    #[error("network error: {0}")]
    Connection(#[source] reqwest::Error),
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    /// The configuration does not exist on the server.
    #[error("config not found (404)")]
    NotFound,
    /// The server failed with a 5xx status.
    #[error("server error ({0})")]
    Server(u16),
    /// Any other non-success HTTP status.
    #[error("protocol error: HTTP {0}")]
    Status(u16),
    /// A header value could not be encoded.
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The native bridge returned an empty payload.
    #[error("empty or failed response from native bridge")]
    EmptyResponse,
    /// The native bridge raised an error.
    #[error("native bridge call failed: {0}")]
    Bridge(#[from] BridgeError),
    /// The native bridge call panicked or was cancelled.
    #[error("native bridge task aborted: {0}")]
    BridgeAborted(String),
    /// A scripted failure from an in-memory transport.
    #[error("{0}")]
    Scripted(String),
}

/// Transport capability: fetch raw configuration bodies and describe the device.
#[async_trait]
pub trait ConfigTransport: Send + Sync {
    /// Fetches the raw response body for `config_name`.
    async fn fetch_config(
        &self,
        bundle_id: &str,
        server_url: &str,
        config_name: &str,
    ) -> Result<String, TransportError>;

    /// Whether the network is currently reachable.
    fn is_network_available(&self) -> bool;

    /// Stable identifier of the device issuing requests.
    fn device_id(&self) -> String;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Describes the runtime the service is running in and therefore which
/// transport it should use.
#[derive(Clone)]
pub enum RuntimeEnvironment {
    /// Desktop or editor host talking HTTP directly.
    Desktop(HttpTransportOptions),
    /// Mobile host delegating to a platform-provided bridge.
    NativeBridge(Arc<dyn NativeBridge>),
    /// Caller-provided transport, typically an in-memory stub in tests.
    Custom(Arc<dyn ConfigTransport>),
}

impl Default for RuntimeEnvironment {
    fn default() -> Self {
        Self::Desktop(HttpTransportOptions::default())
    }
}

impl fmt::Debug for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop(options) => f.debug_tuple("Desktop").field(options).finish(),
            Self::NativeBridge(_) => f.write_str("NativeBridge"),
            Self::Custom(transport) => write!(f, "Custom({})", transport.name()),
        }
    }
}

impl RuntimeEnvironment {
    /// Builds the transport matching this environment.
    pub fn create_transport(
        &self,
        build_version: &str,
    ) -> Result<Arc<dyn ConfigTransport>, TransportError> {
        match self {
            Self::Desktop(options) => Ok(Arc::new(HttpTransport::new(
                options.clone(),
                build_version,
            )?)),
            Self::NativeBridge(bridge) => Ok(Arc::new(BridgeTransport::new(
                Arc::clone(bridge),
                build_version,
            ))),
            Self::Custom(transport) => Ok(Arc::clone(transport)),
        }
    }
}
