//! Remote snapshot and override storage with typed lookup.
//!
//! The cache keeps the last successfully parsed remote document and the
//! override set side by side. The effective view (remote merged with enabled
//! overrides, override wins) is derived on every read and never written back,
//! so toggling overrides takes effect immediately without a new fetch.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Debug;

use soda_config_proto::ConfigResponse;
use tracing::{debug, error, info, warn};

use crate::value::{ConfigValue, FromConfigValue};

/// Result of [`ConfigCache::update_from_json`]. Only `Updated` changes the
/// remote snapshot; every other outcome leaves it as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The snapshot was replaced with `entries` keys.
    Updated { entries: usize },
    /// The body was empty.
    Empty,
    /// The server answered `success: false`.
    Rejected { error: String },
    /// The response carried no `config` document.
    NoConfig,
    /// The body or the encoded config could not be decoded.
    Malformed { reason: String },
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Holds the remote snapshot and the override set.
#[derive(Debug, Clone, Default)]
pub struct ConfigCache {
    remote: HashMap<String, ConfigValue>,
    overrides: HashMap<String, ConfigValue>,
    use_overrides: bool,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the override mapping and its enable flag. `None` clears the
    /// mapping.
    pub fn set_override_data(
        &mut self,
        overrides: Option<HashMap<String, ConfigValue>>,
        enabled: bool,
    ) {
        self.overrides = overrides.unwrap_or_default();
        self.use_overrides = enabled;
        debug!(
            enabled,
            entries = self.overrides.len(),
            "override set {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Whether overrides currently shape the effective view.
    pub fn is_using_overrides(&self) -> bool {
        self.use_overrides
    }

    pub fn remote_len(&self) -> usize {
        self.remote.len()
    }

    pub fn override_len(&self) -> usize {
        self.overrides.len()
    }

    /// Replaces the remote snapshot with the document carried by `raw`.
    ///
    /// Never fails: empty bodies, server-side errors, missing documents and
    /// malformed JSON are logged and leave the previous snapshot untouched.
    pub fn update_from_json(&mut self, raw: &str) -> UpdateOutcome {
        if raw.trim().is_empty() {
            warn!("empty configuration response");
            return UpdateOutcome::Empty;
        }

        let response = match ConfigResponse::from_json(raw) {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, raw_response = %raw, "failed to parse configuration response");
                return UpdateOutcome::Malformed {
                    reason: err.to_string(),
                };
            }
        };

        if !response.is_success() {
            let message = response.error_message().to_string();
            warn!(error = %message, "server returned an error");
            return UpdateOutcome::Rejected { error: message };
        }

        let document = match response.config_object() {
            Ok(Some(document)) => document,
            Ok(None) => {
                warn!("no config data in response");
                return UpdateOutcome::NoConfig;
            }
            Err(err) => {
                error!(error = %err, raw_response = %raw, "failed to decode config document");
                return UpdateOutcome::Malformed {
                    reason: err.to_string(),
                };
            }
        };

        self.remote = document
            .into_iter()
            .map(|(key, value)| (key, ConfigValue::from(value)))
            .collect();

        info!(
            entries = self.remote.len(),
            overrides = if self.use_overrides { self.overrides.len() } else { 0 },
            "remote configuration updated"
        );
        UpdateOutcome::Updated {
            entries: self.remote.len(),
        }
    }

    /// The effective view: remote values with enabled overrides applied.
    pub fn config_data(&self) -> HashMap<String, ConfigValue> {
        self.effective().into_owned()
    }

    /// Looks up `key` in the effective view and converts it to `T`.
    ///
    /// Missing keys, empty keys, `null` values and failed conversions all
    /// return `default`.
    pub fn get_value<T>(&self, key: &str, default: T) -> T
    where
        T: FromConfigValue + Debug,
    {
        let effective = self.effective();
        let value = match effective.get(key) {
            Some(value) if !key.is_empty() => value,
            _ => {
                warn!(key, default = ?default, "no config data found for key; using default value");
                return default;
            }
        };

        let source = if self.is_override_key(key) {
            "override"
        } else {
            "remote"
        };
        debug!(key, source, value = %value, "config lookup");

        match T::from_config_value(value) {
            Some(converted) => converted,
            None => {
                warn!(
                    key,
                    stored = value.kind(),
                    target = std::any::type_name::<T>(),
                    "type conversion failed; using default value"
                );
                default
            }
        }
    }

    fn is_override_key(&self, key: &str) -> bool {
        self.use_overrides && self.overrides.contains_key(key)
    }

    fn effective(&self) -> Cow<'_, HashMap<String, ConfigValue>> {
        if !self.use_overrides || self.overrides.is_empty() {
            return Cow::Borrowed(&self.remote);
        }
        let mut merged = self.remote.clone();
        merged.extend(
            self.overrides
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Cow::Owned(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Color;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};
    use tracing_test::traced_test;

    fn cache_with(raw: &str) -> ConfigCache {
        let mut cache = ConfigCache::new();
        assert!(cache.update_from_json(raw).is_updated());
        cache
    }

    fn overrides(entries: &[(&str, ConfigValue)]) -> Option<HashMap<String, ConfigValue>> {
        Some(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn update_replaces_whole_snapshot() {
        let mut cache = cache_with(r#"{"success":true,"config":{"a":1,"b":2}}"#);
        let outcome = cache.update_from_json(r#"{"config":{"c":3}}"#);
        assert_eq!(outcome, UpdateOutcome::Updated { entries: 1 });
        let data = cache.config_data();
        assert_eq!(data.len(), 1);
        assert_eq!(data["c"], ConfigValue::Int(3));
    }

    #[test]
    fn update_is_idempotent() {
        let raw = r#"{"success":true,"config":{"a":1,"s":"x","l":[1,2]}}"#;
        let mut cache = cache_with(raw);
        let first = cache.config_data();
        cache.update_from_json(raw);
        assert_eq!(cache.config_data(), first);
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            (-1.0e6_f64..1.0e6).prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-zA-Z0-9# ]{0,12}".prop_map(Value::from),
            prop::collection::vec(any::<i32>(), 0..4).prop_map(Value::from),
            Just(Value::Null),
        ]
    }

    fn config_document() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map("[a-z]{1,8}", json_leaf(), 0..12)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        #[test]
        fn applying_a_payload_twice_changes_nothing(
            config in config_document(),
            encoded in any::<bool>(),
        ) {
            let config = Value::Object(config);
            let raw = if encoded {
                json!({"success": true, "config": config.to_string()}).to_string()
            } else {
                json!({"success": true, "config": config}).to_string()
            };

            let mut cache = ConfigCache::new();
            let first = cache.update_from_json(&raw);
            let view = cache.config_data();
            let second = cache.update_from_json(&raw);

            prop_assert_eq!(first, second);
            prop_assert_eq!(cache.config_data(), view);
        }
    }

    #[test]
    fn encoded_config_string_is_decoded() {
        let cache = cache_with(r#"{"success":true,"config":"{\"speed\":4.5}"}"#);
        assert_eq!(cache.get_value("speed", 0.0_f64), 4.5);
    }

    #[test]
    #[traced_test]
    fn malformed_json_keeps_previous_snapshot() {
        let mut cache = cache_with(r#"{"config":{"a":1}}"#);
        let outcome = cache.update_from_json("{not json");
        assert!(matches!(outcome, UpdateOutcome::Malformed { .. }));
        assert_eq!(cache.get_value("a", 0_i64), 1);
        assert!(logs_contain("failed to parse configuration response"));
        assert!(logs_contain("{not json"));
    }

    #[test]
    fn malformed_encoded_config_keeps_previous_snapshot() {
        let mut cache = cache_with(r#"{"config":{"a":1}}"#);
        let outcome = cache.update_from_json(r#"{"config":"{broken"}"#);
        assert!(matches!(outcome, UpdateOutcome::Malformed { .. }));
        assert_eq!(cache.get_value("a", 0_i64), 1);
    }

    #[test]
    fn non_updating_outcomes_leave_snapshot() {
        let mut cache = cache_with(r#"{"config":{"a":1}}"#);
        assert_eq!(cache.update_from_json("   "), UpdateOutcome::Empty);
        assert_eq!(
            cache.update_from_json(r#"{"success":false}"#),
            UpdateOutcome::Rejected {
                error: "Unknown error".into()
            }
        );
        assert_eq!(
            cache.update_from_json(r#"{"success":false,"error":"gone"}"#),
            UpdateOutcome::Rejected {
                error: "gone".into()
            }
        );
        assert_eq!(
            cache.update_from_json(r#"{"success":true,"config":null}"#),
            UpdateOutcome::NoConfig
        );
        assert_eq!(cache.update_from_json(r#"{"success":true}"#), UpdateOutcome::NoConfig);
        assert!(matches!(
            cache.update_from_json(r#"{"config":[1]}"#),
            UpdateOutcome::Malformed { .. }
        ));
        assert_eq!(cache.config_data().len(), 1);
    }

    #[test]
    fn empty_cache_survives_bad_first_payload() {
        let mut cache = ConfigCache::new();
        cache.update_from_json("garbage");
        assert!(cache.config_data().is_empty());
        assert_eq!(cache.get_value("a", 99_i64), 99);
    }

    #[test]
    fn enabled_overrides_win_over_remote() {
        let mut cache = cache_with(r#"{"config":{"a":1,"b":2}}"#);
        cache.set_override_data(
            overrides(&[("b", ConfigValue::Int(3)), ("c", ConfigValue::Int(4))]),
            true,
        );
        let data = cache.config_data();
        assert_eq!(data.len(), 3);
        assert_eq!(data["a"], ConfigValue::Int(1));
        assert_eq!(data["b"], ConfigValue::Int(3));
        assert_eq!(data["c"], ConfigValue::Int(4));
    }

    #[test]
    fn disabled_overrides_are_inert_but_retained() {
        let mut cache = cache_with(r#"{"config":{"a":1,"b":2}}"#);
        cache.set_override_data(
            overrides(&[("b", ConfigValue::Int(3)), ("c", ConfigValue::Int(4))]),
            false,
        );
        let data = cache.config_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data["b"], ConfigValue::Int(2));
        assert_eq!(cache.override_len(), 2);
        assert!(!cache.is_using_overrides());
    }

    #[test]
    fn overrides_do_not_mutate_remote_snapshot() {
        let mut cache = cache_with(r#"{"config":{"a":1}}"#);
        cache.set_override_data(overrides(&[("a", ConfigValue::Int(5))]), true);
        assert_eq!(cache.get_value("a", 0_i64), 5);
        cache.set_override_data(None, false);
        assert_eq!(cache.get_value("a", 0_i64), 1);
        assert_eq!(cache.remote_len(), 1);
    }

    #[test]
    fn overrides_survive_remote_refresh() {
        let mut cache = cache_with(r#"{"config":{"a":1}}"#);
        cache.set_override_data(overrides(&[("a", ConfigValue::Int(5))]), true);
        cache.update_from_json(r#"{"config":{"a":2,"b":3}}"#);
        assert_eq!(cache.get_value("a", 0_i64), 5);
        assert_eq!(cache.get_value("b", 0_i64), 3);
    }

    #[test]
    fn typed_lookup_converts_tolerantly() {
        let cache = cache_with(
            r##"{"config":{"flag":"TRUE","nope":"nope","tint":"#FF0000","bad_tint":"zzz","n":7,"s":"12","nothing":null}}"##,
        );
        assert!(cache.get_value("flag", false));
        assert!(!cache.get_value("nope", true));
        assert_eq!(
            cache.get_value("tint", Color::BLACK),
            Color::new(1.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(cache.get_value("bad_tint", Color::BLACK), Color::BLACK);
        assert_eq!(cache.get_value("n", 0.0_f64), 7.0);
        assert_eq!(cache.get_value("s", 0_i64), 12);
        assert_eq!(cache.get_value("n", String::new()), "7");
        assert_eq!(cache.get_value("nothing", 3_i64), 3);
    }

    #[test]
    #[traced_test]
    fn missing_and_empty_keys_return_default() {
        let cache = cache_with(r#"{"config":{"":1,"a":1}}"#);
        assert_eq!(cache.get_value("missing", 42_i64), 42);
        assert_eq!(cache.get_value("", 42_i64), 42);
        assert!(logs_contain("no config data found for key"));
    }

    #[test]
    #[traced_test]
    fn failed_conversion_returns_default() {
        let cache = cache_with(r#"{"config":{"list":[1,2]}}"#);
        assert_eq!(cache.get_value("list", 5_i64), 5);
        assert!(logs_contain("type conversion failed"));
    }
}
