//! Construction-time configuration for [`RemoteConfigService`](super::RemoteConfigService).

use std::fmt;
use std::sync::Arc;

use crate::overrides::OverrideSource;
use crate::transport::RuntimeEnvironment;

/// Build version reported in `X-Build-Version` when the host sets none.
pub const DEFAULT_BUILD_VERSION: &str = "1.0.0";

/// Configuration values that control how the service reaches the server.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Runtime descriptor selecting the transport during initialization.
    pub environment: RuntimeEnvironment,
    /// Optional override collaborator, pulled at init and on every fetch.
    pub override_source: Option<Arc<dyn OverrideSource>>,
    /// Application build version forwarded to the transport.
    pub build_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            override_source: None,
            build_version: DEFAULT_BUILD_VERSION.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Default configuration running over `environment`.
    pub fn with_environment(environment: RuntimeEnvironment) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }

    pub fn with_override_source(mut self, source: Arc<dyn OverrideSource>) -> Self {
        self.override_source = Some(source);
        self
    }

    pub fn with_build_version(mut self, build_version: impl Into<String>) -> Self {
        self.build_version = build_version.into();
        self
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("environment", &self.environment)
            .field("override_source", &self.override_source.is_some())
            .field("build_version", &self.build_version)
            .finish()
    }
}
