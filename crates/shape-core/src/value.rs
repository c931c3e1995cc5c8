//! # Instance Model
//!
//! Instances are `serde_json::Value` trees. This module adds the kind tag
//! used in diagnostics and the deep structural equality used by `enum`,
//! `const` and `uniqueItems`.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::number;

/// Runtime kind of an instance value.
///
/// Integers are not a separate kind: `1` and `1.5` are both
/// [`InstanceKind::Number`]. Use [`is_integer`] when integrality matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl InstanceKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// The JSON Schema type name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `value` is a number with no fractional part.
///
/// `2.0` counts as an integer, matching JSON Schema's definition.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => number::is_integral(n),
        _ => false,
    }
}

/// Deep structural equality between two instance values.
///
/// - Numbers compare by mathematical value, so `1` equals `1.0`.
/// - Arrays compare element-wise in order.
/// - Objects compare as unordered key sets with equal values.
/// - Values of different kinds are never equal.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number::compare(x, y) == Ordering::Equal,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| equal(l, r)))
        }
        _ => false,
    }
}
