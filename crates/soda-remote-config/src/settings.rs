//! SDK settings and their environment-driven loading.
//!
//! Hosts normally build [`SdkSettings`] once at startup, either in code or
//! from `SODA_*` environment variables, and hand it to
//! [`SodaSdk`](crate::SodaSdk).

use std::collections::HashMap;
use std::env;

use crate::bundle_id;
use crate::overrides::OverrideConfig;
use crate::sdk::SdkError;
use crate::service::DEFAULT_BUILD_VERSION;

/// Environment variable carrying the bundle identifier.
const ENV_BUNDLE_ID: &str = "SODA_BUNDLE_ID";
/// Environment variable carrying the configuration server URL.
const ENV_SERVER_URL: &str = "SODA_SERVER_URL";
/// Environment variable naming the configuration fetched at startup.
const ENV_CONFIG_NAME: &str = "SODA_CONFIG_NAME";
/// Environment variable toggling SDK logging.
const ENV_LOG_ENABLED: &str = "SODA_LOG_ENABLED";
/// Environment variable selecting the log level filter.
const ENV_LOG_LEVEL: &str = "SODA_LOG_LEVEL";
/// Environment variable carrying the application build version.
const ENV_BUILD_VERSION: &str = "SODA_BUILD_VERSION";

pub const DEFAULT_BUNDLE_ID: &str = "com.mycompany.mygame";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONFIG_NAME: &str = "default";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Values the SDK needs to reach the configuration server.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkSettings {
    /// Reverse-domain identifier of the application.
    pub bundle_id: String,
    /// Base URL of the configuration server.
    pub server_url: String,
    /// Configuration fetched during initialization.
    pub default_config_name: String,
    /// Whether SDK diagnostics are emitted.
    pub enable_log: bool,
    /// Filter directive installed by [`SodaSdk::init_logging`].
    ///
    /// [`SodaSdk::init_logging`]: crate::SodaSdk::init_logging
    pub log_level: String,
    pub build_version: String,
    /// Local overrides applied on top of (or instead of) remote values.
    pub override_config: Option<OverrideConfig>,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            default_config_name: DEFAULT_CONFIG_NAME.to_string(),
            enable_log: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            build_version: DEFAULT_BUILD_VERSION.to_string(),
            override_config: None,
        }
    }
}

impl SdkSettings {
    /// Builds settings from the current process environment.
    pub fn from_os_env() -> Self {
        Self::from_env_iter(env::vars())
    }

    /// Builds settings from key/value pairs; unset or blank keys keep their
    /// defaults.
    pub fn from_env_iter<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let lookup = |key: &str| map.get(key).and_then(|value| sanitize_non_empty(value));
        let defaults = Self::default();

        Self {
            bundle_id: lookup(ENV_BUNDLE_ID).unwrap_or(defaults.bundle_id),
            server_url: lookup(ENV_SERVER_URL).unwrap_or(defaults.server_url),
            default_config_name: lookup(ENV_CONFIG_NAME).unwrap_or(defaults.default_config_name),
            enable_log: parse_bool(map.get(ENV_LOG_ENABLED).map(String::as_str), true),
            log_level: lookup(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            build_version: lookup(ENV_BUILD_VERSION).unwrap_or(defaults.build_version),
            override_config: None,
        }
    }

    pub fn with_override_config(mut self, config: OverrideConfig) -> Self {
        self.override_config = Some(config);
        self
    }

    /// Checks that the settings can drive an initialization.
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.server_url.trim().is_empty() {
            return Err(SdkError::MissingSettings("server_url"));
        }
        if self.default_config_name.trim().is_empty() {
            return Err(SdkError::MissingSettings("default_config_name"));
        }
        let result = bundle_id::validate(&self.bundle_id);
        if !result.is_valid {
            return Err(SdkError::InvalidBundleId(result.message));
        }
        Ok(())
    }
}

/// Helper trimming whitespace and discarding empty values.
fn sanitize_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses boolean values from strings, falling back to the provided default.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|s| s.trim().to_ascii_lowercase()) {
        Some(ref v) if ["1", "true", "t", "yes", "y"].contains(&v.as_str()) => true,
        Some(ref v) if ["0", "false", "f", "no", "n"].contains(&v.as_str()) => false,
        _ => default,
    }
}
