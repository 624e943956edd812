//! Remote configuration service module facade.
//!
//! Re-exports the service handle together with its construction-time
//! configuration, lifecycle state and event listener hooks.

pub(crate) mod config;
mod core;
pub(crate) mod events;
pub(crate) mod state;

pub use config::{ServiceConfig, DEFAULT_BUILD_VERSION};
pub use core::*;
pub use events::{CountingEvents, RemoteConfigEvents};
pub use state::{ServiceSnapshot, ServiceState};
