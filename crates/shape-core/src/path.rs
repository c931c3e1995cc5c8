//! # Instance Paths
//!
//! An [`InstancePath`] locates a value inside an instance document as the
//! sequence of object keys and array indices taken from the root. It
//! renders as an RFC 6901 JSON Pointer (`/address/lines/0`), with the root
//! rendered as the empty string.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step from a container into a child value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Property name within an object.
    Key(String),
    /// Position within an array.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of a value within an instance, from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    /// The path of the instance root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments from the root, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Descend one level.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// Ascend one level, returning the segment removed.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// A new path one level below this one.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Render as an RFC 6901 JSON Pointer.
    pub fn to_pointer(&self) -> String {
        self.to_string()
    }
}

impl From<Vec<PathSegment>> for InstancePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for InstancePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
