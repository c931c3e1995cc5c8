//! # Verdicts and Failure Trails
//!
//! A [`Verdict`] is the binary outcome of validating one instance. When the
//! instance is rejected, the verdict carries a [`FailureTrail`]: the ordered
//! evidence of which keyword failed at which instance path.
//!
//! ## Trail Order
//!
//! - Leaf failures read innermost-first. When an `allOf` branch rejects,
//!   the branch's own trail comes first and the `allOf` record follows.
//! - `anyOf`/`oneOf` composites read outermost-first: the combinator
//!   record, then each failing branch's trail in branch order.
//!
//! Trail order is diagnostic only. The accept/reject outcome never depends
//! on it.
//!
//! All types here serialize with `serde` so the CLI can emit them as JSON.

use std::fmt;

use serde::Serialize;
use shape_core::InstancePath;

/// The keyword a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Enum,
    Const,
    AllOf,
    AnyOf,
    OneOf,
    Not,
    MinLength,
    MaxLength,
    Pattern,
    MultipleOf,
    Minimum,
    Maximum,
    Required,
    MinProperties,
    MaxProperties,
    AdditionalItems,
    MinItems,
    MaxItems,
    UniqueItems,
    Contains,
}

impl Keyword {
    /// The keyword as spelled in a schema document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Const => "const",
            Self::AllOf => "allOf",
            Self::AnyOf => "anyOf",
            Self::OneOf => "oneOf",
            Self::Not => "not",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::MultipleOf => "multipleOf",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Required => "required",
            Self::MinProperties => "minProperties",
            Self::MaxProperties => "maxProperties",
            Self::AdditionalItems => "additionalItems",
            Self::MinItems => "minItems",
            Self::MaxItems => "maxItems",
            Self::UniqueItems => "uniqueItems",
            Self::Contains => "contains",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of a failure trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Where in the instance the keyword failed.
    pub path: InstancePath,
    /// The violated keyword.
    pub keyword: Keyword,
    /// Human-readable summary.
    pub message: String,
}

impl Failure {
    pub fn new(path: InstancePath, keyword: Keyword, message: impl Into<String>) -> Self {
        Self {
            path,
            keyword,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {} [{}]", self.message, self.keyword)
        } else {
            write!(f, "{}: {} [{}]", self.path, self.message, self.keyword)
        }
    }
}

/// Non-empty ordered sequence of failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FailureTrail(Vec<Failure>);

impl FailureTrail {
    /// A trail holding a single failure.
    pub fn new(failure: Failure) -> Self {
        Self(vec![failure])
    }

    /// Append a failure after the existing records.
    pub fn push(&mut self, failure: Failure) {
        self.0.push(failure);
    }

    /// Append another trail after the existing records.
    pub fn append(&mut self, other: FailureTrail) {
        self.0.extend(other.0);
    }

    /// The first record. Always present.
    pub fn first(&self) -> &Failure {
        &self.0[0]
    }

    /// All records, in trail order.
    pub fn failures(&self) -> &[Failure] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if any record is attributed to `keyword`.
    pub fn contains_keyword(&self, keyword: Keyword) -> bool {
        self.0.iter().any(|f| f.keyword == keyword)
    }

    /// Returns true if any record is attributed to `keyword` at `path`.
    pub fn contains(&self, keyword: Keyword, path: &InstancePath) -> bool {
        self.0
            .iter()
            .any(|f| f.keyword == keyword && &f.path == path)
    }

    pub fn into_inner(self) -> Vec<Failure> {
        self.0
    }
}

impl<'a> IntoIterator for &'a FailureTrail {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FailureTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {failure}")?;
        }
        Ok(())
    }
}

/// Outcome of validating one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failures", rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Invalid(FailureTrail),
}

impl Verdict {
    /// Shorthand for a single-record rejection.
    pub fn fail(path: &InstancePath, keyword: Keyword, message: impl Into<String>) -> Self {
        Self::Invalid(FailureTrail::new(Failure::new(path.clone(), keyword, message)))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The failure trail, if the instance was rejected.
    pub fn trail(&self) -> Option<&FailureTrail> {
        match self {
            Self::Valid => None,
            Self::Invalid(trail) => Some(trail),
        }
    }

    pub fn into_trail(self) -> Option<FailureTrail> {
        match self {
            Self::Valid => None,
            Self::Invalid(trail) => Some(trail),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid(trail) => write!(f, "invalid:\n{trail}"),
        }
    }
}
