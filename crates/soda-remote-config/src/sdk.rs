//! Application-level SDK handle.
//!
//! [`SodaSdk`] is created once at the application root and passed to the
//! code that reads configuration. It validates the settings, drives the
//! initial fetch and exposes the [`RemoteConfigService`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::logger::{self, LoggerError};
use crate::overrides::SharedOverrides;
use crate::service::{RemoteConfigService, ServiceConfig};
use crate::settings::SdkSettings;
use crate::transport::RuntimeEnvironment;

/// Error raised by [`SodaSdk::initialize`] and [`SdkSettings::validate`].
#[derive(Debug, Error)]
pub enum SdkError {
    /// The bundle id failed validation; carries the validator's message.
    #[error("invalid bundle id: {0}")]
    InvalidBundleId(String),
    /// A required setting is blank.
    #[error("missing setting: {0}")]
    MissingSettings(&'static str),
    /// The service could not complete its initial fetch.
    #[error("remote config initialization failed")]
    InitializationFailed,
}

/// Explicit SDK context owning the remote configuration service.
#[derive(Debug, Clone)]
pub struct SodaSdk {
    settings: SdkSettings,
    overrides: Option<SharedOverrides>,
    remote_config: RemoteConfigService,
}

impl SodaSdk {
    /// SDK version reported by [`SodaSdk::VERSION`].
    pub const VERSION: &'static str = "0.0.1";

    /// Builds the SDK without touching the network. Overrides from
    /// `settings` are exposed through [`SodaSdk::overrides`].
    pub fn new(settings: SdkSettings, environment: RuntimeEnvironment) -> Self {
        let overrides = settings.override_config.clone().map(SharedOverrides::new);
        let mut config = ServiceConfig::with_environment(environment)
            .with_build_version(settings.build_version.clone());
        if let Some(shared) = &overrides {
            config = config.with_override_source(Arc::new(shared.clone()));
        }
        Self {
            settings,
            overrides,
            remote_config: RemoteConfigService::new(config),
        }
    }

    /// Validates the settings and initializes the remote configuration
    /// service with the default config name.
    ///
    /// A rejected bundle id or blank setting is reported before any request
    /// is made. A failed initial fetch is reported as
    /// [`SdkError::InitializationFailed`]; the service stays usable and
    /// returns defaults.
    pub async fn initialize(&self) -> Result<(), SdkError> {
        logger::set_logging_enabled(self.settings.enable_log);

        if let Err(err) = self.settings.validate() {
            error!(error = %err, "invalid SDK settings; remote config not initialized");
            return Err(err);
        }

        info!(
            version = Self::VERSION,
            bundle_id = %self.settings.bundle_id,
            "initializing SDK"
        );
        let loaded = self
            .remote_config
            .initialize(
                &self.settings.bundle_id,
                &self.settings.server_url,
                &self.settings.default_config_name,
            )
            .await;
        if !loaded {
            return Err(SdkError::InitializationFailed);
        }
        Ok(())
    }

    /// Installs the SDK subscriber with the configured `log_level`.
    ///
    /// Optional: hosts that already own a global subscriber skip this and
    /// keep receiving SDK events through their own. Fails with
    /// [`LoggerError::AlreadyInstalled`] when a global subscriber exists.
    pub fn init_logging(&self) -> Result<(), LoggerError> {
        logger::init(&self.settings.log_level)
    }

    pub fn bundle_id(&self) -> &str {
        &self.settings.bundle_id
    }

    pub fn server_url(&self) -> &str {
        &self.settings.server_url
    }

    pub fn settings(&self) -> &SdkSettings {
        &self.settings
    }

    pub fn remote_config(&self) -> &RemoteConfigService {
        &self.remote_config
    }

    /// Live handle on the configured overrides, if any.
    pub fn overrides(&self) -> Option<&SharedOverrides> {
        self.overrides.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.remote_config.is_initialized()
    }
}
