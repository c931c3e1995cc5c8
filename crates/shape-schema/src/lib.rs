//! # shape-schema: Schema Nodes, Resolution & Validation
//!
//! Validates a JSON-like instance against a declarative schema and reports
//! a verdict with a failure trail.
//!
//! ## The Core (`model`, `resolve`, `engine`, `verdict`)
//!
//! - [`model`]: the closed set of schema node variants, with builders.
//! - [`resolve`]: same-document reference pointers (`#/definitions/x`).
//! - [`engine`]: the recursive validity decision.
//!   [`Validator::validate`] returns `Result<Verdict, SchemaError>`.
//! - [`verdict`]: [`Verdict`], [`FailureTrail`] and the [`Keyword`] a
//!   failure is attributed to.
//!
//! The core performs no I/O and never mutates a schema graph. A decoded
//! [`Schema`] is `Send + Sync` and can be shared across threads.
//!
//! ```
//! use serde_json::json;
//! use shape_schema::model::{GenericKeywords, ObjectSchema, StringSchema};
//! use shape_schema::{validate, Keyword, Schema};
//!
//! let person: Schema = ObjectSchema::new()
//!     .required(["firstName"])
//!     .property("firstName", StringSchema::new().max_length(1))
//!     .into();
//!
//! let verdict = validate(&person, &json!({"firstName": "John"})).unwrap();
//! let failure = verdict.trail().unwrap().first();
//! assert_eq!(failure.keyword, Keyword::MaxLength);
//! assert_eq!(failure.path.to_pointer(), "/firstName");
//! ```
//!
//! ## Embedding (`decode`, `loader`, `summary`)
//!
//! - [`decode`]: builds a [`Schema`] from JSON or YAML schema documents.
//! - [`loader`]: [`SchemaLoader`] reads a directory of schema files and
//!   validates documents from disk.
//! - [`summary`]: static node counts and a reference audit.
//!
//! ## Crate Policy
//!
//! - Depends only on `shape-core` internally.
//! - "The data is wrong" is `Ok(Verdict::Invalid(..))`; "the schema is
//!   wrong" is `Err(SchemaError)`. The two never mix.
//! - Unsupported keywords are rejected by the decoder, never silently
//!   ignored: `additionalProperties`, `patternProperties`, `dependencies`
//!   and `propertyNames` are not enforced by the engine.

pub mod decode;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod summary;
pub mod verdict;

pub use decode::{DecodeError, DecodeOptions};
pub use engine::{validate, ValidationOptions, Validator};
pub use error::{Budget, ResolutionError, SchemaError};
pub use loader::{LoadError, SchemaLoader};
pub use model::{Definitions, Schema, SchemaKind};
pub use summary::{audit_references, summarize, ReferenceFinding, SchemaSummary};
pub use verdict::{Failure, FailureTrail, Keyword, Verdict};
