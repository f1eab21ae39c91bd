use budget_utils::{dejsonify, jsonify, jsonify_internal};
use serde_json::{json, Value};

#[test]
fn test_jsonify_sorts_keys() {
    let value = json!({"b": 1, "a": {"d": [{"z": 0, "y": 1}], "c": null}});
    assert_eq!(
        jsonify(&value).unwrap(),
        r#"{"a":{"c":null,"d":[{"y":1,"z":0}]},"b":1}"#
    );
}

#[test]
fn test_jsonify_internal_keeps_scalars() {
    assert_eq!(jsonify_internal(&json!(42)), json!(42));
    assert_eq!(jsonify_internal(&json!("text")), json!("text"));
}

#[test]
fn test_dejsonify_roundtrip_value() {
    let value: Value = dejsonify(r#"{"capacity": 150000, "mode": "random"}"#).unwrap();
    assert_eq!(value["capacity"], json!(150000));
    assert_eq!(value["mode"], json!("random"));
    assert!(dejsonify::<Value>("{not json").is_err());
}
