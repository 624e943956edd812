use serde_json::json;
use soda_config_proto::ConfigResponse;

#[test]
fn test_parse_server_payload_with_nulls() {
    let body = r#"{"success":true,"error":null,"config":{"speed":10,"title":"hi","ratio":0.5,"tags":["a","b"],"nested":{"on":true},"missing":null}}"#;

    let response = ConfigResponse::from_json(body).expect("payload should parse");
    assert!(response.is_success());
    assert!(response.error.is_none());

    let config = response
        .config_object()
        .expect("config should decode")
        .expect("config should be present");
    assert_eq!(config.len(), 6);
    assert_eq!(config["speed"], json!(10));
    assert_eq!(config["title"], json!("hi"));
    assert_eq!(config["tags"], json!(["a", "b"]));
    assert_eq!(config["nested"]["on"], json!(true));
    assert!(config["missing"].is_null());
}

#[test]
fn test_parse_double_encoded_config() {
    let inner = json!({"difficulty": "hard", "lives": 3}).to_string();
    let body = json!({"success": true, "config": inner}).to_string();

    let response = ConfigResponse::from_json(&body).expect("payload should parse");
    let config = response
        .config_object()
        .expect("encoded config should decode")
        .expect("config should be present");
    assert_eq!(config["difficulty"], json!("hard"));
    assert_eq!(config["lives"], json!(3));
}

#[test]
fn test_rejects_non_object_bodies() {
    assert!(ConfigResponse::from_json("[1,2,3]").is_err());
    assert!(ConfigResponse::from_json("{\"success\":").is_err());
    assert!(ConfigResponse::from_json(r#"{"success":"yes"}"#).is_err());
}

#[test]
fn test_serialization_omits_absent_fields() {
    let response = ConfigResponse {
        success: Some(false),
        error: Some("boom".to_string()),
        config: None,
    };
    let encoded = serde_json::to_value(&response).unwrap();
    assert_eq!(encoded, json!({"success": false, "error": "boom"}));
}
