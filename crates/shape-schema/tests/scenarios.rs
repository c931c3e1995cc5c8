//! Integration test: the reference scenarios for the validation engine.
//!
//! Each scenario pins both the verdict and the diagnostic that explains
//! it: the keyword blamed and the instance path it was blamed at.

use serde_json::json;
use shape_core::{InstancePath, PathSegment};
use shape_schema::model::{
    AnySchema, ArraySchema, BooleanSchema, GenericKeywords, IntegerSchema, NullSchema,
    NumericKeywords, ObjectSchema, StringSchema,
};
use shape_schema::{validate, Keyword, Schema, Verdict};

fn at(segments: &[PathSegment]) -> InstancePath {
    InstancePath::from(segments.to_vec())
}

fn first_failure(verdict: &Verdict) -> (Keyword, String) {
    let failure = verdict
        .trail()
        .expect("instance should be rejected")
        .first();
    (failure.keyword, failure.path.to_pointer())
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

#[test]
fn test_max_length_green_door() {
    let schema: Schema = StringSchema::new().max_length(5).into();
    let verdict = validate(&schema, &json!("A green door")).unwrap();
    assert_eq!(first_failure(&verdict), (Keyword::MaxLength, String::new()));
}

#[test]
fn test_string_bounds_and_kind_mismatch() {
    let schema: Schema = StringSchema::new().min_length(2).max_length(3).into();
    assert!(validate(&schema, &json!(42)).unwrap().is_valid());
    assert_eq!(
        first_failure(&validate(&schema, &json!("a")).unwrap()).0,
        Keyword::MinLength
    );
    assert_eq!(
        first_failure(&validate(&schema, &json!("abcd")).unwrap()).0,
        Keyword::MaxLength
    );
    assert!(validate(&schema, &json!("abc")).unwrap().is_valid());
}

#[test]
fn test_anchored_phone_pattern() {
    let schema: Schema = StringSchema::new()
        .pattern(r"^(\([0-9]{3}\))?[0-9]{3}-[0-9]{4}$")
        .into();
    assert!(validate(&schema, &json!("555-1212")).unwrap().is_valid());
    assert!(validate(&schema, &json!("(888)555-1212")).unwrap().is_valid());
    let verdict = validate(&schema, &json!("(888)555-1212 ext. 532")).unwrap();
    assert_eq!(first_failure(&verdict).0, Keyword::Pattern);
}

#[test]
fn test_enum_blue() {
    let schema: Schema = StringSchema::new()
        .enum_values([json!("red"), json!("amber"), json!("green")])
        .into();
    let verdict = validate(&schema, &json!("blue")).unwrap();
    assert_eq!(first_failure(&verdict), (Keyword::Enum, String::new()));
    assert!(validate(&schema, &json!("amber")).unwrap().is_valid());
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn person() -> Schema {
    ObjectSchema::new()
        .required(["firstName", "lastName"])
        .property("firstName", StringSchema::new().max_length(1))
        .property("lastName", StringSchema::new())
        .property("age", IntegerSchema::new())
        .into()
}

#[test]
fn test_record_first_name_max_length() {
    let verdict = validate(&person(), &json!({"firstName": "John", "lastName": "Doe"})).unwrap();
    let trail = verdict.trail().unwrap();
    assert!(trail.contains(Keyword::MaxLength, &at(&["firstName".into()])));
    assert_eq!(trail.first().path.to_pointer(), "/firstName");
}

#[test]
fn test_record_required_missing() {
    let verdict = validate(&person(), &json!({"firstName": "J"})).unwrap();
    assert_eq!(first_failure(&verdict), (Keyword::Required, String::new()));
    assert!(verdict.trail().unwrap().first().message.contains("lastName"));
}

#[test]
fn test_record_unknown_keys_unconstrained() {
    let verdict = validate(
        &person(),
        &json!({"firstName": "J", "lastName": "Doe", "nickname": 7}),
    )
    .unwrap();
    assert!(verdict.is_valid());
}

#[test]
fn test_record_address_kinds_open_world() {
    let address: Schema = ObjectSchema::new()
        .property("number", IntegerSchema::new())
        .property("streetName", StringSchema::new())
        .property(
            "streetType",
            StringSchema::new().enum_values([json!("Street"), json!("Avenue"), json!("Boulevard")]),
        )
        .into();
    // "1600" is a string, so the integer node's own checks do not apply.
    let instance = json!({
        "number": "1600",
        "streetName": "Pennsylvania",
        "streetType": "Avenue"
    });
    assert!(validate(&address, &instance).unwrap().is_valid());
}

#[test]
fn test_property_count_bounds() {
    let schema: Schema = ObjectSchema::new().min_properties(1).max_properties(2).into();
    assert_eq!(
        first_failure(&validate(&schema, &json!({})).unwrap()).0,
        Keyword::MinProperties
    );
    assert_eq!(
        first_failure(&validate(&schema, &json!({"a": 1, "b": 2, "c": 3})).unwrap()).0,
        Keyword::MaxProperties
    );
    let unbounded: Schema = ObjectSchema::new().max_properties(0).into();
    assert!(validate(&unbounded, &json!({"a": 1, "b": 2, "c": 3})).unwrap().is_valid());
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[test]
fn test_positional_items_min_length_at_index_one() {
    let schema: Schema = ArraySchema::new()
        .positional_items([
            StringSchema::new().max_length(10).into(),
            StringSchema::new().min_length(4).into(),
        ])
        .min_items(1)
        .into();
    let verdict = validate(&schema, &json!(["cold", "ice"])).unwrap();
    assert_eq!(first_failure(&verdict), (Keyword::MinLength, "/1".to_string()));
}

#[test]
fn test_uniform_items() {
    let schema: Schema = ArraySchema::new().items(IntegerSchema::new().minimum(0)).into();
    assert!(validate(&schema, &json!([])).unwrap().is_valid());
    assert!(validate(&schema, &json!([1, 2, 3, 4, 5])).unwrap().is_valid());
    let verdict = validate(&schema, &json!([1, -2, 3])).unwrap();
    assert_eq!(first_failure(&verdict), (Keyword::Minimum, "/1".to_string()));
}

#[test]
fn test_street_address_tuple() {
    let schema: Schema = ArraySchema::new()
        .positional_items([
            IntegerSchema::new().into(),
            StringSchema::new().into(),
            StringSchema::new()
                .enum_values([json!("Street"), json!("Avenue"), json!("Boulevard")])
                .into(),
            StringSchema::new()
                .enum_values([json!("NW"), json!("NE"), json!("SW"), json!("SE")])
                .into(),
        ])
        .into();
    let verdict = validate(&schema, &json!([24, "Sussex", "Drive"])).unwrap();
    assert_eq!(first_failure(&verdict), (Keyword::Enum, "/2".to_string()));
    assert!(validate(&schema, &json!([1600, "Pennsylvania", "Avenue", "NW"]))
        .unwrap()
        .is_valid());
}

#[test]
fn test_additional_items() {
    let closed: Schema = ArraySchema::new()
        .positional_items([IntegerSchema::new().into()])
        .no_additional_items()
        .into();
    assert!(validate(&closed, &json!([1])).unwrap().is_valid());
    assert_eq!(
        first_failure(&validate(&closed, &json!([1, 2])).unwrap()),
        (Keyword::AdditionalItems, String::new())
    );

    let typed_tail: Schema = ArraySchema::new()
        .positional_items([IntegerSchema::new().into()])
        .additional_items(StringSchema::new().max_length(1))
        .into();
    assert!(validate(&typed_tail, &json!([1, "a", "b"])).unwrap().is_valid());
    assert_eq!(
        first_failure(&validate(&typed_tail, &json!([1, "a", "bc"])).unwrap()),
        (Keyword::MaxLength, "/2".to_string())
    );

    let open_tail: Schema = ArraySchema::new()
        .positional_items([IntegerSchema::new().into()])
        .into();
    assert!(validate(&open_tail, &json!([1, {"any": "thing"}])).unwrap().is_valid());
}

#[test]
fn test_unique_items() {
    let schema: Schema = ArraySchema::new().unique_items(true).into();
    assert!(validate(&schema, &json!([1, "1", [1], {"a": 1}])).unwrap().is_valid());
    assert_eq!(
        first_failure(&validate(&schema, &json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}])).unwrap()).0,
        Keyword::UniqueItems
    );
    assert_eq!(
        first_failure(&validate(&schema, &json!([1, 1.0])).unwrap()).0,
        Keyword::UniqueItems
    );
}

#[test]
fn test_contains() {
    let schema: Schema = ArraySchema::new()
        .contains(IntegerSchema::new().minimum(10))
        .into();
    assert!(validate(&schema, &json!([1, 20, 3])).unwrap().is_valid());
    assert_eq!(
        first_failure(&validate(&schema, &json!([1, 2])).unwrap()).0,
        Keyword::Contains
    );
    assert_eq!(
        first_failure(&validate(&schema, &json!([])).unwrap()).0,
        Keyword::Contains
    );
}

#[test]
fn test_item_count_bounds() {
    let schema: Schema = ArraySchema::new().min_items(1).max_items(2).into();
    assert_eq!(
        first_failure(&validate(&schema, &json!([])).unwrap()).0,
        Keyword::MinItems
    );
    assert_eq!(
        first_failure(&validate(&schema, &json!([1, 2, 3])).unwrap()).0,
        Keyword::MaxItems
    );
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

#[test]
fn test_integer_multiple_of_and_maximum() {
    let schema: Schema = IntegerSchema::new().multiple_of(5).maximum(40).into();
    let verdict = validate(&schema, &json!(45)).unwrap();
    assert!(verdict.trail().unwrap().contains_keyword(Keyword::Maximum));

    let verdict = validate(&schema, &json!(42)).unwrap();
    assert_eq!(first_failure(&verdict).0, Keyword::MultipleOf);
    assert!(validate(&schema, &json!(40)).unwrap().is_valid());
}

#[test]
fn test_integer_against_string_is_valid() {
    let schema: Schema = IntegerSchema::new().into();
    assert_eq!(validate(&schema, &json!("42")).unwrap(), Verdict::Valid);
}

#[test]
fn test_boolean_and_null_kind_mismatch() {
    let boolean: Schema = BooleanSchema::new().into();
    assert!(validate(&boolean, &json!("true")).unwrap().is_valid());
    let null: Schema = NullSchema::new().into();
    assert!(validate(&null, &json!(false)).unwrap().is_valid());
    let constrained: Schema = NullSchema::new().enum_values([json!(null)]).into();
    assert!(validate(&constrained, &json!(false)).unwrap().is_invalid());
}

// ---------------------------------------------------------------------------
// Combinators gate the verdict
// ---------------------------------------------------------------------------

#[test]
fn test_any_of_branches_of_other_kinds_accept_vacuously() {
    let schema: Schema = AnySchema::new()
        .any_of([
            StringSchema::new().max_length(2).into(),
            IntegerSchema::new().minimum(0).into(),
        ])
        .into();
    assert!(validate(&schema, &json!("ab")).unwrap().is_valid());
    assert!(validate(&schema, &json!(3)).unwrap().is_valid());
    // "abc" fails the string branch but is outside the integer branch's kind.
    assert!(validate(&schema, &json!("abc")).unwrap().is_valid());
}

#[test]
fn test_any_of_all_branches_reject() {
    let schema: Schema = AnySchema::new()
        .any_of([
            StringSchema::new().max_length(2).into(),
            StringSchema::new().pattern("^z").into(),
        ])
        .into();
    let verdict = validate(&schema, &json!("abc")).unwrap();
    let keywords: Vec<Keyword> = verdict.trail().unwrap().iter().map(|f| f.keyword).collect();
    assert_eq!(keywords, vec![Keyword::AnyOf, Keyword::MaxLength, Keyword::Pattern]);
}

#[test]
fn test_one_of_gates_verdict() {
    let schema: Schema = AnySchema::new()
        .one_of([
            IntegerSchema::new().multiple_of(3).into(),
            IntegerSchema::new().multiple_of(5).into(),
        ])
        .into();
    assert!(validate(&schema, &json!(9)).unwrap().is_valid());
    assert!(validate(&schema, &json!(10)).unwrap().is_valid());

    let both = validate(&schema, &json!(15)).unwrap();
    assert!(both.trail().unwrap().first().message.starts_with("ambiguous: 2"));

    let neither = validate(&schema, &json!(7)).unwrap();
    assert_eq!(neither.trail().unwrap().first().message, "no branch matched");
    assert_eq!(neither.trail().unwrap().len(), 3);
}

#[test]
fn test_nested_path_through_combinators() {
    let schema: Schema = ObjectSchema::new()
        .property(
            "tags",
            ArraySchema::new().items(
                AnySchema::new().all_of([StringSchema::new().min_length(2).into()]),
            ),
        )
        .into();
    let verdict = validate(&schema, &json!({"tags": ["ok", "x"]})).unwrap();
    let trail = verdict.trail().unwrap();
    let records: Vec<(Keyword, String)> = trail
        .iter()
        .map(|f| (f.keyword, f.path.to_pointer()))
        .collect();
    assert_eq!(
        records,
        vec![
            (Keyword::MinLength, "/tags/1".to_string()),
            (Keyword::AllOf, "/tags/1".to_string()),
        ]
    );
}
