//! Wire models for the Soda remote configuration endpoint.
//!
//! The crate owns the JSON shape exchanged with the configuration server and
//! the request conventions (path layout and header names) shared by every
//! transport. Higher-level crates convert the decoded objects into their own
//! value model.

#![doc = include_str!("../README.md")]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Header names attached to configuration requests.
pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const USER_AGENT: &str = "User-Agent";
    pub const BUNDLE_ID: &str = "X-Bundle-ID";
    pub const BUILD_VERSION: &str = "X-Build-Version";
    pub const DEVICE_ID: &str = "X-Device-ID";
    pub const PLATFORM: &str = "X-Platform";

    /// Content type announced on every request.
    pub const JSON_CONTENT_TYPE: &str = "application/json";
}

/// Builds the request path for a named configuration document.
pub fn config_path(bundle_id: &str, config_name: &str) -> String {
    format!("/api/games/{bundle_id}/configs/{config_name}")
}

/// Builds the absolute URL for a named configuration document.
///
/// A trailing `/` on `server_url` is ignored so `http://host/` and
/// `http://host` resolve to the same endpoint.
pub fn config_url(server_url: &str, bundle_id: &str, config_name: &str) -> String {
    format!(
        "{}{}",
        server_url.trim_end_matches('/'),
        config_path(bundle_id, config_name)
    )
}

/// Failures raised while decoding the `config` field of a response.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The `config` string did not contain valid JSON.
    #[error("encoded config is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
    /// The encoded JSON decoded to something other than an object.
    #[error("encoded config must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    /// The `config` field holds a value that is neither object, string nor null.
    #[error("unexpected config type: {0}")]
    UnexpectedType(&'static str),
}

/// Response body returned by the configuration endpoint.
///
/// Every field is optional on the wire. A missing `success` flag is treated as
/// success by consumers; only an explicit `false` marks a server-side failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl ConfigResponse {
    /// Parses a raw response body.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Returns `true` unless the server explicitly reported `success: false`.
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }

    /// Returns the server error message, or `"Unknown error"` when absent.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error")
    }

    /// Decodes the `config` field into a JSON object.
    ///
    /// * absent, `null` or an empty string yields `Ok(None)`;
    /// * an object is returned as-is;
    /// * a string is parsed as an encoded JSON object.
    pub fn config_object(&self) -> Result<Option<Map<String, Value>>, PayloadError> {
        match &self.config {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(Value::String(encoded)) if encoded.trim().is_empty() => Ok(None),
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded)? {
                Value::Object(map) => Ok(Some(map)),
                other => Err(PayloadError::NotAnObject(type_name(&other))),
            },
            Some(other) => Err(PayloadError::UnexpectedType(type_name(other))),
        }
    }
}

/// Short JSON type label used in error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_url_joins_segments() {
        assert_eq!(
            config_url("http://host:8080/", "com.acme.game", "default"),
            "http://host:8080/api/games/com.acme.game/configs/default"
        );
        assert_eq!(
            config_path("com.acme.game", "beta"),
            "/api/games/com.acme.game/configs/beta"
        );
    }

    #[test]
    fn missing_success_flag_counts_as_success() {
        let response = ConfigResponse::from_json(r#"{"config":{}}"#).unwrap();
        assert!(response.is_success());
        assert_eq!(response.error_message(), "Unknown error");
    }

    #[test]
    fn explicit_failure_carries_message() {
        let response =
            ConfigResponse::from_json(r#"{"success":false,"error":"no such game"}"#).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.error_message(), "no such game");
    }

    #[test]
    fn config_object_accepts_objects_and_encoded_strings() {
        let direct = ConfigResponse {
            config: Some(json!({"a": 1})),
            ..Default::default()
        };
        assert_eq!(direct.config_object().unwrap().unwrap()["a"], json!(1));

        let encoded = ConfigResponse {
            config: Some(json!("{\"b\": true}")),
            ..Default::default()
        };
        assert_eq!(encoded.config_object().unwrap().unwrap()["b"], json!(true));
    }

    #[test]
    fn config_object_treats_null_and_blank_as_absent() {
        for config in [None, Some(Value::Null), Some(json!("  "))] {
            let response = ConfigResponse {
                config,
                ..Default::default()
            };
            assert!(response.config_object().unwrap().is_none());
        }
    }

    #[test]
    fn config_object_rejects_other_shapes() {
        let array = ConfigResponse {
            config: Some(json!([1, 2])),
            ..Default::default()
        };
        assert!(matches!(
            array.config_object(),
            Err(PayloadError::UnexpectedType("array"))
        ));

        let encoded_array = ConfigResponse {
            config: Some(json!("[1, 2]")),
            ..Default::default()
        };
        assert!(matches!(
            encoded_array.config_object(),
            Err(PayloadError::NotAnObject("array"))
        ));

        let garbage = ConfigResponse {
            config: Some(json!("{not json")),
            ..Default::default()
        };
        assert!(matches!(
            garbage.config_object(),
            Err(PayloadError::Encoding(_))
        ));
    }
}
