//! Remote configuration service orchestration.
//!
//! The service owns the cache, the transport chosen at initialization and
//! the override collaborator. Fetches pull the override document first and
//! may skip the network entirely when overrides are enabled; otherwise the
//! transport body is folded into the cache and overrides are re-applied on
//! top, on success and on failure alike. Every outcome is reported as a
//! boolean plus listener events; no error crosses the public surface.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info, warn};

use super::config::ServiceConfig;
use super::events::RemoteConfigEvents;
use super::state::{ServiceSnapshot, ServiceState};
use crate::cache::ConfigCache;
use crate::overrides::OverrideSource;
use crate::transport::{ConfigTransport, RuntimeEnvironment};
use crate::value::{Color, ConfigValue, FromConfigValue};

/// Message delivered to `on_error` listeners when a transport fetch fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch remote config";

/// Message delivered to `on_error` listeners when no transport can be built.
pub const TRANSPORT_FAILED_MESSAGE: &str = "Failed to create config transport";

/// Per-call knobs for [`RemoteConfigService::fetch_config_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// When the override source is enabled, serve overrides and skip the
    /// transport.
    pub apply_override_before_fetch: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            apply_override_before_fetch: true,
        }
    }
}

/// Server coordinates and transport bound by a successful initialization.
#[derive(Clone)]
struct Session {
    bundle_id: String,
    server_url: String,
    transport: Arc<dyn ConfigTransport>,
}

struct ServiceShared {
    environment: RuntimeEnvironment,
    build_version: String,
    state: RwLock<ServiceState>,
    session: RwLock<Option<Session>>,
    cache: RwLock<ConfigCache>,
    override_source: RwLock<Option<Arc<dyn OverrideSource>>>,
    listeners: RwLock<Vec<Arc<dyn RemoteConfigEvents>>>,
}

/// Handle to the remote configuration service. Clones share state.
#[derive(Clone)]
pub struct RemoteConfigService {
    shared: Arc<ServiceShared>,
}

impl std::fmt::Debug for RemoteConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfigService")
            .field("state", &self.state())
            .field("transport", &self.transport_name())
            .finish()
    }
}

impl Default for RemoteConfigService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl RemoteConfigService {
    pub fn new(config: ServiceConfig) -> Self {
        let ServiceConfig {
            environment,
            override_source,
            build_version,
        } = config;
        Self {
            shared: Arc::new(ServiceShared {
                environment,
                build_version,
                state: RwLock::new(ServiceState::Uninitialized),
                session: RwLock::new(None),
                cache: RwLock::new(ConfigCache::new()),
                override_source: RwLock::new(override_source),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Binds the service to a server and performs the initial fetch.
    ///
    /// Returns `false` without changing state when `bundle_id` is blank or
    /// the transport cannot be built. Otherwise the service becomes
    /// [`ServiceState::Ready`] before the fetch starts and the return value is
    /// the outcome of that fetch. Calling it again on a ready service only
    /// fetches `config_name`; the first binding is kept.
    pub async fn initialize(&self, bundle_id: &str, server_url: &str, config_name: &str) -> bool {
        if bundle_id.trim().is_empty() {
            error!("bundle id is empty; remote config not initialized");
            return false;
        }

        let already_ready = {
            let mut state = write(&self.shared.state);
            let ready = *state == ServiceState::Ready;
            if !ready {
                *state = ServiceState::Initializing;
            }
            ready
        };
        if already_ready {
            warn!("remote config already initialized; fetching config only");
            return self.fetch_config(config_name).await;
        }

        let transport = match self
            .shared
            .environment
            .create_transport(&self.shared.build_version)
        {
            Ok(transport) => transport,
            Err(err) => {
                error!(error = %err, "failed to create config transport");
                *write(&self.shared.state) = ServiceState::Uninitialized;
                self.notify_error(TRANSPORT_FAILED_MESSAGE);
                return false;
            }
        };

        info!(
            bundle_id,
            server_url,
            transport = transport.name(),
            device_id = %transport.device_id(),
            "remote config initialized"
        );
        *write(&self.shared.session) = Some(Session {
            bundle_id: bundle_id.to_string(),
            server_url: server_url.to_string(),
            transport,
        });
        *write(&self.shared.state) = ServiceState::Ready;

        self.apply_override_config();
        self.fetch_config(config_name).await
    }

    /// Fetches `config_name`, serving enabled overrides without a network call.
    pub async fn fetch_config(&self, config_name: &str) -> bool {
        self.fetch_config_with(config_name, FetchOptions::default())
            .await
    }

    /// Fetches `config_name` with explicit [`FetchOptions`].
    ///
    /// Returns `false` when the service is not initialized or the transport
    /// fails; in both cases the cached snapshot is left as it was.
    pub async fn fetch_config_with(&self, config_name: &str, options: FetchOptions) -> bool {
        let session = match self.ready_session() {
            Some(session) => session,
            None => {
                error!(config_name, "remote config not initialized; cannot fetch");
                return false;
            }
        };

        if options.apply_override_before_fetch && self.overrides_enabled() {
            self.apply_override_config();
            info!(config_name, "overrides enabled; skipping remote fetch");
            self.notify_loaded(true);
            return true;
        }

        debug!(
            config_name,
            transport = session.transport.name(),
            "fetching remote config"
        );
        let result = session
            .transport
            .fetch_config(&session.bundle_id, &session.server_url, config_name)
            .await;

        match result {
            Ok(body) => {
                let outcome = write(&self.shared.cache).update_from_json(&body);
                debug!(config_name, outcome = ?outcome, "remote config response applied");
                self.apply_override_config();
                self.notify_loaded(true);
                true
            }
            Err(err) => {
                error!(config_name, error = %err, "failed to fetch remote config");
                self.apply_override_config();
                self.notify_error(FETCH_FAILED_MESSAGE);
                self.notify_loaded(false);
                false
            }
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_value(key, default.to_string())
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_value(key, default)
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.get_value(key, default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_value(key, default)
    }

    pub fn get_color(&self, key: &str, default: Color) -> Color {
        self.get_value(key, default)
    }

    /// Typed lookup in the effective view. Returns `default` before
    /// initialization without touching the cache.
    pub fn get_value<T>(&self, key: &str, default: T) -> T
    where
        T: FromConfigValue + Debug,
    {
        if !self.is_initialized() {
            warn!(key, "remote config not initialized; using default value");
            return default;
        }
        read(&self.shared.cache).get_value(key, default)
    }

    /// The effective view: remote snapshot with enabled overrides applied.
    pub fn get_all_configs(&self) -> HashMap<String, ConfigValue> {
        read(&self.shared.cache).config_data()
    }

    pub fn add_listener(&self, listener: Arc<dyn RemoteConfigEvents>) {
        write(&self.shared.listeners).push(listener);
    }

    /// Replaces the override collaborator and applies it immediately.
    /// `None` clears any override data from the cache.
    pub fn set_override_source(&self, source: Option<Arc<dyn OverrideSource>>) {
        let cleared = source.is_none();
        *write(&self.shared.override_source) = source;
        if cleared {
            write(&self.shared.cache).set_override_data(None, false);
            return;
        }
        self.apply_override_config();
    }

    pub fn state(&self) -> ServiceState {
        *read(&self.shared.state)
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == ServiceState::Ready
    }

    pub fn is_using_overrides(&self) -> bool {
        read(&self.shared.cache).is_using_overrides()
    }

    /// Name of the bound transport, once initialized.
    pub fn transport_name(&self) -> Option<&'static str> {
        read(&self.shared.session)
            .as_ref()
            .map(|session| session.transport.name())
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        let session = read(&self.shared.session).clone();
        let cache = read(&self.shared.cache);
        ServiceSnapshot {
            state: self.state(),
            bundle_id: session.as_ref().map(|s| s.bundle_id.clone()),
            server_url: session.as_ref().map(|s| s.server_url.clone()),
            transport: session.as_ref().map(|s| s.transport.name()),
            overrides_active: cache.is_using_overrides(),
            remote_entries: cache.remote_len(),
            override_entries: cache.override_len(),
            config: cache.config_data(),
        }
    }

    fn ready_session(&self) -> Option<Session> {
        if !self.is_initialized() {
            return None;
        }
        read(&self.shared.session).clone()
    }

    fn override_source(&self) -> Option<Arc<dyn OverrideSource>> {
        read(&self.shared.override_source).clone()
    }

    fn overrides_enabled(&self) -> bool {
        self.override_source()
            .is_some_and(|source| source.overrides_enabled())
    }

    /// Pulls the override document into the cache. A missing source leaves
    /// the cache's override set untouched.
    fn apply_override_config(&self) {
        let Some(source) = self.override_source() else {
            return;
        };
        let data = source.override_data();
        let enabled = source.overrides_enabled();
        write(&self.shared.cache).set_override_data(Some(data), enabled);
    }

    fn listeners(&self) -> Vec<Arc<dyn RemoteConfigEvents>> {
        read(&self.shared.listeners).clone()
    }

    fn notify_loaded(&self, success: bool) {
        for listener in self.listeners() {
            listener.on_config_loaded(success);
        }
    }

    fn notify_error(&self, message: &str) {
        for listener in self.listeners() {
            listener.on_error(message);
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
