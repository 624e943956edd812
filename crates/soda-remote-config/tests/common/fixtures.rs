//! Payloads and builders shared by the integration scenarios.
#![allow(dead_code)]

use std::sync::Arc;

use soda_remote_config::{
    CountingEvents, MemoryTransport, RemoteConfigService, RuntimeEnvironment, ServiceConfig,
    SharedOverrides,
};

pub const BUNDLE_ID: &str = "com.acme.game";
pub const SERVER_URL: &str = "http://host";
pub const CONFIG_NAME: &str = "default";

/// Successful response carrying `x` and `y`.
pub const XY_PAYLOAD: &str = r#"{"success":true,"config":{"x":10,"y":"hi"}}"#;

/// Response whose `config` is a JSON-encoded string, as some servers send it.
pub const ENCODED_PAYLOAD: &str =
    r##"{"success":true,"config":"{\"speed\":2.5,\"enabled\":\"True\",\"tint\":\"#FF000080\"}"}"##;

/// Service wired to `transport`, with a counting listener attached.
pub fn service_with(
    transport: &Arc<MemoryTransport>,
    overrides: Option<&SharedOverrides>,
) -> (RemoteConfigService, Arc<CountingEvents>) {
    let mut config =
        ServiceConfig::with_environment(RuntimeEnvironment::Custom(transport.clone()));
    if let Some(overrides) = overrides {
        config = config.with_override_source(Arc::new(overrides.clone()));
    }
    let service = RemoteConfigService::new(config);
    let events = Arc::new(CountingEvents::new());
    service.add_listener(events.clone());
    (service, events)
}
