//! Public entry points for the Soda remote configuration client.
//!
//! The crate fetches named configuration documents for an application
//! (identified by a reverse-domain bundle id), caches the last good snapshot,
//! layers local overrides on top and answers typed lookups that always fall
//! back to a caller-supplied default. [`SodaSdk`] is the usual entry point;
//! [`RemoteConfigService`] can be used directly with a custom
//! [`RuntimeEnvironment`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod bundle_id;
pub mod cache;
pub mod device;
pub mod logger;
pub mod overrides;
pub mod sdk;
pub mod service;
pub mod settings;
pub mod transport;
pub mod value;

pub use bundle_id::ValidationResult;
pub use cache::{ConfigCache, UpdateOutcome};
pub use overrides::{OverrideConfig, OverrideEntry, OverrideSource, OverrideValue, SharedOverrides};
pub use sdk::{SdkError, SodaSdk};
pub use service::{
    CountingEvents, FetchOptions, RemoteConfigEvents, RemoteConfigService, ServiceConfig,
    ServiceSnapshot, ServiceState,
};
pub use settings::SdkSettings;
pub use transport::{
    BridgeError, BridgeTransport, ConfigTransport, HttpTransport, HttpTransportOptions,
    MemoryTransport, NativeBridge, RuntimeEnvironment, TransportError,
};
pub use value::{Color, ConfigValue, FromConfigValue};
