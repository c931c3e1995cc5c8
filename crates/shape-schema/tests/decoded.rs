//! Integration test: schema documents decoded from JSON and YAML text.
//!
//! The scenario schemas written as documents must decode to the same graph
//! the builders produce, and validate identically.

use serde_json::json;
use shape_schema::decode::{from_json_str, from_yaml_str, DecodeOptions};
use shape_schema::model::{
    ArraySchema, GenericKeywords, IntegerSchema, NumericKeywords, ObjectSchema, StringSchema,
};
use shape_schema::{validate, DecodeError, Keyword, Schema};

const PERSON_JSON: &str = r#"{
    "title": "Person",
    "type": "object",
    "required": ["firstName", "lastName"],
    "properties": {
        "firstName": {"type": "string", "maxLength": 1},
        "lastName": {"type": "string"},
        "age": {"type": "integer"}
    }
}"#;

const PERSON_YAML: &str = "
title: Person
type: object
required: [firstName, lastName]
properties:
  firstName:
    type: string
    maxLength: 1
  lastName:
    type: string
  age:
    type: integer
";

fn person() -> Schema {
    ObjectSchema::new()
        .title("Person")
        .required(["firstName", "lastName"])
        .property("firstName", StringSchema::new().max_length(1))
        .property("lastName", StringSchema::new())
        .property("age", IntegerSchema::new())
        .into()
}

fn strict() -> DecodeOptions {
    DecodeOptions::default()
}

#[test]
fn test_person_decodes_to_builder_graph() {
    let decoded = from_json_str(PERSON_JSON, &strict()).unwrap();
    assert_eq!(decoded, person());
}

#[test]
fn test_yaml_and_json_agree() {
    let from_yaml = from_yaml_str(PERSON_YAML, &strict()).unwrap();
    let from_json = from_json_str(PERSON_JSON, &strict()).unwrap();
    assert_eq!(from_yaml, from_json);
}

#[test]
fn test_decoded_person_reports_first_name() {
    let schema = from_json_str(PERSON_JSON, &strict()).unwrap();
    let verdict = validate(&schema, &json!({"firstName": "John", "lastName": "Doe"})).unwrap();
    let failure = verdict.trail().unwrap().first();
    assert_eq!(failure.keyword, Keyword::MaxLength);
    assert_eq!(failure.path.to_pointer(), "/firstName");
}

#[test]
fn test_decoded_positional_items() {
    let text = r#"{
        "type": "array",
        "items": [{"type": "string", "maxLength": 10}, {"type": "string", "minLength": 4}]
    }"#;
    let decoded = from_json_str(text, &strict()).unwrap();
    let built: Schema = ArraySchema::new()
        .positional_items([
            StringSchema::new().max_length(10).into(),
            StringSchema::new().min_length(4).into(),
        ])
        .into();
    assert_eq!(decoded, built);

    let verdict = validate(&decoded, &json!(["cold", "ice"])).unwrap();
    let failure = verdict.trail().expect("\"ice\" is shorter than 4").first();
    assert_eq!(failure.keyword, Keyword::MinLength);
    assert_eq!(failure.path.to_pointer(), "/1");
    assert!(validate(&decoded, &json!(["cold", "icy!"])).unwrap().is_valid());
}

#[test]
fn test_decoded_integer_bounds() {
    let decoded =
        from_json_str(r#"{"type": "integer", "multipleOf": 5, "maximum": 40}"#, &strict())
            .unwrap();
    let built: Schema = IntegerSchema::new().multiple_of(5).maximum(40).into();
    for instance in [json!(45), json!(42), json!(40), json!("42")] {
        assert_eq!(
            validate(&decoded, &instance).unwrap(),
            validate(&built, &instance).unwrap(),
            "{instance}"
        );
    }
}

#[test]
fn test_decoded_boolean_exclusive_maximum() {
    let decoded = from_json_str(
        r#"{"type": "number", "maximum": 10, "exclusiveMaximum": true}"#,
        &strict(),
    )
    .unwrap();
    assert!(validate(&decoded, &json!(9.5)).unwrap().is_valid());
    assert_eq!(
        validate(&decoded, &json!(10)).unwrap().trail().unwrap().first().keyword,
        Keyword::Maximum
    );
}

#[test]
fn test_decoded_enum() {
    let decoded = from_yaml_str("type: string\nenum: [red, amber, green]\n", &strict()).unwrap();
    let built: Schema = StringSchema::new()
        .enum_values([json!("red"), json!("amber"), json!("green")])
        .into();
    assert_eq!(decoded, built);
}

#[test]
fn test_unsupported_keyword_strict_and_lenient() {
    let text = r#"{"type": "object", "additionalProperties": false}"#;
    let err = from_json_str(text, &strict()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnsupportedKeyword { ref keyword, .. } if keyword == "additionalProperties"
    ));

    let lenient = DecodeOptions { lenient: true };
    let schema = from_json_str(text, &lenient).unwrap();
    // The dropped keyword no longer constrains anything.
    assert!(validate(&schema, &json!({"extra": 1})).unwrap().is_valid());
}

#[test]
fn test_malformed_documents() {
    assert!(matches!(
        from_json_str("{not json", &strict()),
        Err(DecodeError::Json(_))
    ));
    assert!(matches!(
        from_json_str(r#"{"type": "decimal"}"#, &strict()),
        Err(DecodeError::UnknownType { .. })
    ));
    assert!(matches!(
        from_json_str(r#"{"properties": {"a": 5}}"#, &strict()),
        Err(DecodeError::NotASchema { .. })
    ));
    assert!(matches!(
        from_json_str(r#"{"minLength": 1, "minimum": 0}"#, &strict()),
        Err(DecodeError::MixedKeywords { .. })
    ));
}
