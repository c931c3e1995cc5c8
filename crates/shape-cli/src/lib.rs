//! # shape-cli: Command-Line Interface for the shape Validator
//!
//! Provides the `shape` binary.
//!
//! ## Subcommands
//!
//! - `shape check`: validate JSON/YAML documents against a schema file.
//! - `shape inspect`: summarize a schema graph and audit its references.
//!
//! ```bash
//! shape check --schema person.schema.json alice.json bob.yaml
//! shape --format json inspect person.schema.json
//! shape -vv --config shape.yaml check -s order.schema.yaml orders/*.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here return an exit
//!   code and delegate all schema work to `shape-schema`.
//! - `anyhow` is used only in this crate, with `.context(...)` on every
//!   fallible step.

pub mod check;
pub mod config;
pub mod inspect;
