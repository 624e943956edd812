//! Dynamic configuration values and their typed conversions.
//!
//! Remote documents are untyped JSON, while callers ask for a concrete type
//! (`String`, `i64`, `bool`, [`Color`], ...). [`ConfigValue`] is the tagged
//! representation stored in the cache and [`FromConfigValue`] describes how
//! each target type is extracted from it. Every conversion is total: a value
//! that cannot be represented yields `None` and the caller's default applies.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configuration value as stored in the remote snapshot or override set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Color(Color),
    Array(Vec<ConfigValue>),
    Map(HashMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Short label naming the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Color(_) => "color",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts the value into `T`, returning `None` when no conversion exists.
    pub fn get<T: FromConfigValue>(&self) -> Option<T> {
        T::from_config_value(self)
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Self::Int(int),
                // u64 beyond i64::MAX and real numbers both land here.
                None => number
                    .as_f64()
                    .map(Self::Float)
                    .unwrap_or_else(|| Self::String(number.to_string())),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Color> for ConfigValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Array(_) | Self::Map(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str(self.kind()),
            },
        }
    }
}

/// RGBA colour with channels in the `0.0..=1.0` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    /// Opaque white, the default colour of override entries.
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Parses an HTML colour string.
    ///
    /// Accepts `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` and a fixed set of
    /// case-insensitive colour names. Hex forms require the leading `#`.
    pub fn parse_html(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }
        named_color(&input.to_ascii_lowercase())
    }

    /// Renders the colour as `#RRGGBBAA`.
    pub fn to_html_rgba(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html_rgba())
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    // Short forms repeat each nibble: "f80" == "ff8800".
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let channel = |index: usize| u8::from_str_radix(&expanded[index * 2..index * 2 + 2], 16).ok();
    let alpha = if expanded.len() == 8 { channel(3)? } else { 255 };
    Some(Color::from_rgba8(channel(0)?, channel(1)?, channel(2)?, alpha))
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "red" => [255, 0, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "blue" => [0, 0, 255],
        "darkblue" => [0, 0, 160],
        "lightblue" => [173, 216, 230],
        "purple" => [128, 0, 128],
        "yellow" => [255, 255, 0],
        "lime" => [0, 255, 0],
        "fuchsia" | "magenta" => [255, 0, 255],
        "white" => [255, 255, 255],
        "silver" => [192, 192, 192],
        "grey" | "gray" => [128, 128, 128],
        "black" => [0, 0, 0],
        "orange" => [255, 165, 0],
        "brown" => [165, 42, 42],
        "maroon" => [128, 0, 0],
        "green" => [0, 128, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "teal" => [0, 128, 128],
        _ => return None,
    };
    Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
}

/// Extraction of a concrete type from a [`ConfigValue`].
///
/// Implementations return `None` for `Null` and for any value that has no
/// faithful representation in `Self`.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue) -> Option<Self>;
}

impl FromConfigValue for ConfigValue {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        (!value.is_null()).then(|| value.clone())
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Int(i) => Some(i.to_string()),
            ConfigValue::Float(x) => Some(x.to_string()),
            ConfigValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::Float(x) => float_to_i64(*x),
            ConfigValue::Bool(b) => Some(i64::from(*b)),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromConfigValue for i32 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        i64::from_config_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromConfigValue for f64 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(x) => Some(*x),
            ConfigValue::Int(i) => Some(*i as f64),
            ConfigValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromConfigValue for f32 {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        let wide = f64::from_config_value(value)?;
        let narrow = wide as f32;
        // Finite doubles beyond the f32 range would silently become infinity.
        (narrow.is_finite() || !wide.is_finite()).then_some(narrow)
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Bool(b) => Some(*b),
            // Deliberately not a general bool parse: "yes" or "1" read as false.
            ConfigValue::String(s) => Some(s.eq_ignore_ascii_case("true")),
            ConfigValue::Int(i) => Some(*i != 0),
            ConfigValue::Float(x) => Some(*x != 0.0),
            _ => None,
        }
    }
}

impl FromConfigValue for Color {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Color(c) => Some(*c),
            ConfigValue::String(s) => Color::parse_html(s),
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<ConfigValue> {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromConfigValue for HashMap<String, ConfigValue> {
    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Map(map) => Some(map.clone()),
            _ => None,
        }
    }
}

/// Rounds half-to-even and rejects values outside the `i64` range.
fn float_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round_ties_even();
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}
