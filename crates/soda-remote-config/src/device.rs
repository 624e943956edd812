//! Stable device identification for configuration requests.

use std::env;
use std::fs;

use sha2::{Digest, Sha256};
use tracing::debug;

/// Environment variable overriding the detected device identifier.
pub const ENV_DEVICE_ID: &str = "SODA_DEVICE_ID";

/// Files holding a per-machine identifier on common platforms.
const MACHINE_ID_PATHS: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Returns the platform's unique device identifier, if one can be found.
///
/// Checks [`ENV_DEVICE_ID`] first, then the machine id files.
pub fn platform_device_id() -> Option<String> {
    if let Some(id) = env::var(ENV_DEVICE_ID).ok().and_then(non_empty) {
        return Some(id);
    }
    MACHINE_ID_PATHS
        .iter()
        .find_map(|path| fs::read_to_string(path).ok().and_then(non_empty))
}

/// Resolves a stable identifier: the platform id when available, otherwise
/// a hash of `environment`, the host name and the OS.
pub fn resolve_device_id(environment: &str) -> String {
    match platform_device_id() {
        Some(id) => id,
        None => {
            let fallback = fallback_device_id(environment, &host_name(), env::consts::OS);
            debug!(device_id = %fallback, "no platform device id, using fallback hash");
            fallback
        }
    }
}

/// Deterministic fallback identifier derived from the runtime environment.
pub fn fallback_device_id(environment: &str, host: &str, os: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{environment}_{host}_{os}").as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..32].to_string()
}

fn host_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|key| env::var(key).ok().and_then(non_empty))
        .unwrap_or_else(|| "unknown".to_string())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_stable_and_input_sensitive() {
        let a = fallback_device_id("desktop", "box", "linux");
        assert_eq!(a, fallback_device_id("desktop", "box", "linux"));
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, fallback_device_id("bridge", "box", "linux"));
        assert_ne!(a, fallback_device_id("desktop", "box", "macos"));
    }

    #[test]
    fn resolved_id_is_never_empty() {
        assert!(!resolve_device_id("desktop").is_empty());
        assert_eq!(resolve_device_id("desktop"), resolve_device_id("desktop"));
    }

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("  abc\n".into()).as_deref(), Some("abc"));
        assert_eq!(non_empty(" \n".into()), None);
    }
}
