//! # Equality and Canonical Form Vectors
//!
//! Fixed vectors pinning the agreement between structural equality and
//! canonical bytes. `enum`, `const` and `uniqueItems` all depend on this
//! agreement: if a vector here fails, two validators built on different
//! halves of the crate would disagree about the same instance.

use serde_json::{json, Value};
use shape_core::{equal, CanonicalBytes};

fn canonical(value: &Value) -> String {
    let cb = CanonicalBytes::new(value).expect("canonicalization should succeed");
    String::from_utf8(cb.as_bytes().to_vec()).expect("canonical bytes are UTF-8")
}

fn assert_agree(a: Value, b: Value, expected_equal: bool) {
    assert_eq!(
        equal(&a, &b),
        expected_equal,
        "equal({a}, {b}) should be {expected_equal}"
    );
    assert_eq!(
        canonical(&a) == canonical(&b),
        expected_equal,
        "canonical bytes of {a} and {b} should match: {expected_equal}"
    );
}

// ---------------------------------------------------------------------------
// Vector 1: numbers compare by value
// ---------------------------------------------------------------------------

#[test]
fn test_integer_and_integral_float() {
    assert_agree(json!(5), json!(5.0), true);
    assert_agree(json!(-12), json!(-12.0), true);
}

#[test]
fn test_distinct_fractions() {
    assert_agree(json!(0.1), json!(0.10000001), false);
    assert_agree(json!(2.5), json!(2.5), true);
}

// ---------------------------------------------------------------------------
// Vector 2: objects ignore key order, arrays do not
// ---------------------------------------------------------------------------

#[test]
fn test_nested_objects_key_order() {
    let a = json!({"outer": {"z": 1, "a": 2}, "inner": {"m": [3, 2, 1], "b": true}});
    let b = json!({"inner": {"b": true, "m": [3, 2, 1]}, "outer": {"a": 2, "z": 1}});
    assert_agree(a.clone(), b, true);
    assert_eq!(
        canonical(&a),
        r#"{"inner":{"b":true,"m":[3,2,1]},"outer":{"a":2,"z":1}}"#
    );
}

#[test]
fn test_array_order_matters() {
    assert_agree(json!([1, 2, 3]), json!([3, 2, 1]), false);
}

// ---------------------------------------------------------------------------
// Vector 3: kinds never cross
// ---------------------------------------------------------------------------

#[test]
fn test_kind_boundaries() {
    assert_agree(json!(null), json!(false), false);
    assert_agree(json!("true"), json!(true), false);
    assert_agree(json!([]), json!({}), false);
    assert_agree(json!(0), json!("0"), false);
}

// ---------------------------------------------------------------------------
// Vector 4: empty containers and unicode
// ---------------------------------------------------------------------------

#[test]
fn test_empty_containers() {
    assert_agree(json!({}), json!({}), true);
    assert_agree(json!([]), json!([]), true);
    assert_eq!(canonical(&json!({"a": [], "b": {}})), r#"{"a":[],"b":{}}"#);
}

#[test]
fn test_unicode_strings() {
    assert_agree(json!("caf\u{00e9}"), json!("caf\u{00e9}"), true);
    assert_agree(json!("caf\u{00e9}"), json!("cafe\u{0301}"), false);
}
