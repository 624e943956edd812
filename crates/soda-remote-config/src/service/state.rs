//! Service lifecycle state and diagnostic snapshots.

use std::collections::HashMap;

use serde::Serialize;

use crate::value::ConfigValue;

/// Lifecycle of a [`RemoteConfigService`](super::RemoteConfigService).
///
/// There is no error state: failed fetches leave the service `Ready` with its
/// previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
}

/// Point-in-time view of the service for diagnostics and debug tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSnapshot {
    pub state: ServiceState,
    pub bundle_id: Option<String>,
    pub server_url: Option<String>,
    pub transport: Option<&'static str>,
    pub overrides_active: bool,
    pub remote_entries: usize,
    pub override_entries: usize,
    /// The effective view at the time of the snapshot.
    pub config: HashMap<String, ConfigValue>,
}
