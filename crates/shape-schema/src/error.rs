//! # Schema Errors
//!
//! A [`SchemaError`] means the schema is broken, not the data. It is
//! disjoint from [`Verdict::Invalid`](crate::Verdict::Invalid): a caller
//! can always tell "your data is wrong" apart from "your schema is wrong".
//! Schema errors are detected lazily, when evaluation first reaches the
//! offending node, so a broken branch that no instance ever visits does
//! not surface.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which evaluation budget was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    /// Nested node evaluations on the active walk.
    Depth,
    /// Total node evaluations for one `validate` call.
    Steps,
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth => f.write_str("depth"),
            Self::Steps => f.write_str("step"),
        }
    }
}

/// A reference could not be turned into a schema node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The pointer is not a supported same-document pointer.
    #[error("malformed reference '{pointer}': {reason}")]
    Malformed {
        /// The pointer as written in the schema.
        pointer: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The pointer names another document. No fetch is ever attempted.
    #[error("external reference '{pointer}' is not supported")]
    External {
        /// The pointer as written in the schema.
        pointer: String,
    },

    /// No enclosing definitions table has the named entry.
    #[error("reference '{pointer}' does not resolve to a definition")]
    NotFound {
        /// The pointer as written in the schema.
        pointer: String,
    },

    /// The reference was re-entered without consuming instance structure.
    #[error("reference cycle through '{pointer}'")]
    Cycle {
        /// The pointer that closed the cycle.
        pointer: String,
    },
}

impl ResolutionError {
    /// The pointer that failed to resolve.
    pub fn pointer(&self) -> &str {
        match self {
            Self::Malformed { pointer, .. }
            | Self::External { pointer }
            | Self::NotFound { pointer }
            | Self::Cycle { pointer } => pointer,
        }
    }
}

/// A defect in the schema itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A `pattern` keyword is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A reference failed to resolve.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Evaluation exceeded its depth or step budget.
    #[error("evaluation exceeded the {budget} budget of {limit}")]
    BudgetExceeded {
        /// The exhausted budget.
        budget: Budget,
        /// The configured limit.
        limit: usize,
    },
}
