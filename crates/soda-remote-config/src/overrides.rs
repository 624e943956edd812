//! Locally supplied override values.
//!
//! Overrides let developers pin configuration keys to known values while
//! testing, independently of what the server returns. The service does not
//! own the override document; it pulls the current entries and enable flag
//! from an [`OverrideSource`] whenever it initializes or fetches.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::value::{Color, ConfigValue};

/// Strongly typed override value. The type is chosen explicitly by the author
/// of the override, never inferred from the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum OverrideValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Color(Color),
}

impl From<&ConfigValue> for OverrideValue {
    /// Scalars keep their type; `Null` becomes an empty string and
    /// collections their JSON text.
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::String(s) => Self::String(s.clone()),
            ConfigValue::Int(i) => Self::Int(*i),
            ConfigValue::Float(x) => Self::Float(*x),
            ConfigValue::Bool(b) => Self::Bool(*b),
            ConfigValue::Color(c) => Self::Color(*c),
            ConfigValue::Null => Self::String(String::new()),
            ConfigValue::Array(_) | ConfigValue::Map(_) => Self::String(value.to_string()),
        }
    }
}

impl From<OverrideValue> for ConfigValue {
    fn from(value: OverrideValue) -> Self {
        match value {
            OverrideValue::String(s) => ConfigValue::String(s),
            OverrideValue::Int(i) => ConfigValue::Int(i),
            OverrideValue::Float(x) => ConfigValue::Float(x),
            OverrideValue::Bool(b) => ConfigValue::Bool(b),
            OverrideValue::Color(c) => ConfigValue::Color(c),
        }
    }
}

/// A single keyed override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub key: String,
    pub value: OverrideValue,
}

impl OverrideEntry {
    pub fn new(key: impl Into<String>, value: OverrideValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Override document: an ordered list of entries plus an enable flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideConfig {
    #[serde(default)]
    pub enable_overrides: bool,
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
}

impl OverrideConfig {
    pub fn new(enable_overrides: bool) -> Self {
        Self {
            enable_overrides,
            overrides: Vec::new(),
        }
    }

    /// Parses a serialized override document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Builder-style variant of [`OverrideConfig::set`].
    pub fn with(mut self, key: impl Into<String>, value: OverrideValue) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `value`, replacing an existing entry for the same key.
    pub fn set(&mut self, key: impl Into<String>, value: OverrideValue) {
        let key = key.into();
        match self.overrides.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value,
            None => self.overrides.push(OverrideEntry::new(key, value)),
        }
    }

    /// Removes every entry for `key`, returning whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|entry| entry.key != key);
        before != self.overrides.len()
    }

    /// Replaces every entry with one per key of `values`, sorted by key.
    /// Returns the number of entries imported. The enable flag is untouched.
    pub fn import_from(&mut self, values: &HashMap<String, ConfigValue>) -> usize {
        let mut keys: Vec<&String> = values.keys().collect();
        keys.sort();
        self.overrides = keys
            .into_iter()
            .map(|key| OverrideEntry::new(key.clone(), OverrideValue::from(&values[key])))
            .collect();
        self.overrides.len()
    }

    /// Drops every entry. The enable flag is untouched.
    pub fn clear(&mut self) {
        self.overrides.clear();
    }

    /// Resolves the entries into a key/value mapping.
    ///
    /// Entries with an empty key are skipped; when a key repeats, the later
    /// entry wins.
    pub fn override_data(&self) -> HashMap<String, ConfigValue> {
        self.overrides
            .iter()
            .filter(|entry| !entry.key.is_empty())
            .map(|entry| (entry.key.clone(), ConfigValue::from(entry.value.clone())))
            .collect()
    }
}

/// Pull-based provider of override data.
pub trait OverrideSource: Send + Sync {
    /// Current override mapping.
    fn override_data(&self) -> HashMap<String, ConfigValue>;
    /// Whether the overrides should currently take effect.
    fn overrides_enabled(&self) -> bool;
}

impl OverrideSource for OverrideConfig {
    fn override_data(&self) -> HashMap<String, ConfigValue> {
        OverrideConfig::override_data(self)
    }

    fn overrides_enabled(&self) -> bool {
        self.enable_overrides
    }
}

/// Cloneable handle to an [`OverrideConfig`] that its owner can edit at any
/// time while the service keeps reading from it.
#[derive(Debug, Clone, Default)]
pub struct SharedOverrides {
    inner: Arc<RwLock<OverrideConfig>>,
}

impl SharedOverrides {
    pub fn new(config: OverrideConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.update(|config| config.enable_overrides = enabled);
    }

    pub fn set(&self, key: impl Into<String>, value: OverrideValue) {
        let key = key.into();
        self.update(move |config| config.set(key, value));
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut removed = false;
        self.update(|config| removed = config.remove(key));
        removed
    }

    /// See [`OverrideConfig::import_from`].
    pub fn import_from(&self, values: &HashMap<String, ConfigValue>) -> usize {
        let mut imported = 0;
        self.update(|config| imported = config.import_from(values));
        imported
    }

    pub fn clear(&self) {
        self.update(OverrideConfig::clear);
    }

    /// Returns a copy of the current document.
    pub fn snapshot(&self) -> OverrideConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut OverrideConfig)) {
        match self.inner.write() {
            Ok(mut guard) => apply(&mut *guard),
            Err(poisoned) => apply(&mut *poisoned.into_inner()),
        }
    }
}

impl OverrideSource for SharedOverrides {
    fn override_data(&self) -> HashMap<String, ConfigValue> {
        self.snapshot().override_data()
    }

    fn overrides_enabled(&self) -> bool {
        self.snapshot().enable_overrides
    }
}
