//! # shape-core: Foundational Types for the shape Validator
//!
//! This crate is the leaf of the workspace. It defines the instance-side
//! primitives every other crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **The instance model is `serde_json::Value`.** It is already a closed
//!    sum type over null, boolean, number, string, array and object, so
//!    every consumer matches exhaustively instead of downcasting.
//!    [`InstanceKind`] names those arms for diagnostics.
//!
//! 2. **Structural equality, not representation equality.** [`equal`]
//!    compares numbers by value (`1 == 1.0`) and objects as key sets.
//!    `Value`'s own `PartialEq` does neither and must not be used for
//!    `enum`/`const`/`uniqueItems` decisions.
//!
//! 3. **Exact numerics.** [`number`] compares and divides JSON numbers in
//!    decimal, so `multipleOf: 0.01` against `0.07` is not misjudged by
//!    binary floating point.
//!
//! 4. **`CanonicalBytes` is the only hashable form of a value.** Values
//!    that are [`equal`] always share canonical bytes, so the bytes can
//!    bucket candidates before `equal` confirms them.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `shape-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod number;
pub mod path;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::CanonicalizationError;
pub use path::{InstancePath, PathSegment};
pub use value::{equal, is_integer, InstanceKind};
