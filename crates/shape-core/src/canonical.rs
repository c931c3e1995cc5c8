//! # Canonical Value Form: JCS-Compatible Bytes
//!
//! `CanonicalBytes` is a byte string that identifies an instance value up
//! to structural equality: two [`equal`](crate::equal) values always have
//! the same canonical bytes. The converse holds for every number JCS can
//! print exactly (magnitudes up to 2^53); beyond that, distinct integers
//! may share bytes, so a byte match is a candidate to confirm with
//! [`equal`](crate::equal), not a verdict. It lets `uniqueItems` detect
//! duplicates with a hash map instead of comparing every pair.
//!
//! ## Coercion Rules
//!
//! Before serialization the value tree is normalized so that
//! representation differences that equality ignores disappear:
//!
//! 1. **Integral floats become integers**: `1.0` and `1` canonicalize to
//!    the same bytes, as does `-0.0` and `0`. Floats outside the `i64`/`u64`
//!    range stay floats.
//! 2. **Object keys are sorted**: handled by the JCS serializer.
//! 3. Everything else passes through unchanged.
//!
//! After coercion, serialization uses `serde_jcs` for RFC 8785 (JSON
//! Canonicalization Scheme) output: sorted keys, compact separators, and
//! shortest round-trip number text.

use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Bytes produced by number coercion followed by JCS serialization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Integral numbers are written as integers.
/// - Object keys appear in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize an instance value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if JCS
    /// serialization fails.
    pub fn new(value: &Value) -> Result<Self, CanonicalizationError> {
        let coerced = coerce_json_value(value);
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively normalize numbers so that equal values serialize equally.
fn coerce_json_value(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value.clone(),
        Value::Number(n) => Value::Number(coerce_number(n)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), coerce_json_value(v)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.iter().map(coerce_json_value).collect()),
    }
}

/// 2^63 as an `f64`; integral floats below it convert to `i64` exactly.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

fn coerce_number(n: &Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n.clone();
    }
    let f = match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => f,
        _ => return n.clone(),
    };
    if (-TWO_POW_63..TWO_POW_63).contains(&f) {
        Number::from(f as i64)
    } else if (0.0..2.0 * TWO_POW_63).contains(&f) {
        Number::from(f as u64)
    } else {
        n.clone()
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::equal;
    use proptest::prelude::*;
    use serde_json::json;

    /// Strategy for JSON values, mixing integer and float encodings of
    /// the same magnitudes so equality has something to find.
    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-20i64..20).prop_map(|n| json!(n)),
            (-20i64..20).prop_map(|n| json!(n as f64)),
            (-20i64..20).prop_map(|n| json!(n as f64 / 4.0)),
            "[a-c]{0,3}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-c]{1,2}", inner, 0..4).prop_map(|m| {
                    let map: serde_json::Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    proptest! {
        /// Canonicalization never fails for representable values.
        #[test]
        fn canonical_bytes_never_fail(value in json_value()) {
            prop_assert!(CanonicalBytes::new(&value).is_ok());
        }

        /// Canonicalization is deterministic.
        #[test]
        fn canonical_bytes_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Canonical bytes agree with structural equality.
        #[test]
        fn canonical_bytes_match_equality(a in json_value(), b in json_value()) {
            let same_bytes = CanonicalBytes::new(&a).unwrap() == CanonicalBytes::new(&b).unwrap();
            prop_assert_eq!(same_bytes, equal(&a, &b));
        }
    }
}
