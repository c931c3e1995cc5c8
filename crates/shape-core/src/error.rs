//! # Error Types
//!
//! Errors raised by the leaf crate. Schema and validation errors live in
//! `shape-schema`; the only fallible operation here is canonicalization.

use thiserror::Error;

/// Error during canonical serialization of an instance value.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JCS serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
