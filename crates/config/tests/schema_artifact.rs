//! The generated JSON Schema agrees with the Rust-side shape validation.

use rustci_config::schema::{self, SchemaVariant, json_schema};
use serde_json::Value;
use std::path::PathBuf;

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap()
}

fn errors(schema: &Value, instance: &Value) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).unwrap();
    validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect()
}

#[test]
fn test_partial_schema_accepts_fixtures() {
    let schema = json_schema(SchemaVariant::Partial);
    for name in ["rust-default.json", "fragment.json"] {
        let instance = fixture(name);
        assert!(errors(&schema, &instance).is_empty(), "{name}: {:?}", errors(&schema, &instance));
        assert!(schema::parse_value(instance, SchemaVariant::Partial).is_ok(), "{name}");
    }
}

#[test]
fn test_strict_schema_requires_sections() {
    let schema = json_schema(SchemaVariant::Strict);

    assert!(errors(&schema, &fixture("rust-default.json")).is_empty());
    assert!(!errors(&schema, &fixture("fragment.json")).is_empty());
    assert!(schema::parse_value(fixture("fragment.json"), SchemaVariant::Strict).is_err());
}

#[test]
fn test_both_sides_reject_missing_prompt() {
    let schema = json_schema(SchemaVariant::Partial);
    let instance = fixture("missing-prompt.json");

    assert!(!errors(&schema, &instance).is_empty());
    assert!(schema::parse_value(instance, SchemaVariant::Partial).is_err());
}

#[test]
fn test_both_sides_reject_empty_toolchains() {
    let schema = json_schema(SchemaVariant::Partial);
    let instance = serde_json::json!({ "global": { "toolchains": [] } });

    assert!(!errors(&schema, &instance).is_empty());
    assert!(schema::parse_value(instance, SchemaVariant::Partial).is_err());
}

#[test]
fn test_condition_accepts_flag_or_expression() {
    let schema = json_schema(SchemaVariant::Partial);
    let flag = serde_json::json!({ "jobs": { "fmt": { "if": false } } });
    let expr = serde_json::json!({ "jobs": { "fmt": { "if": "${{ always() }}" } } });
    let number = serde_json::json!({ "jobs": { "fmt": { "if": 1 } } });

    assert!(errors(&schema, &flag).is_empty());
    assert!(errors(&schema, &expr).is_empty());
    assert!(!errors(&schema, &number).is_empty());
    assert!(schema::parse_value(number, SchemaVariant::Partial).is_err());
}
