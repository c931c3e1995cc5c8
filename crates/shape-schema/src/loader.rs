//! # Schema Loading
//!
//! File-backed embedding of the engine: decode schema documents from disk,
//! index them by filename, and validate JSON/YAML documents against them.
//! This module is the only part of the crate that performs I/O.
//!
//! ## Schema Directory Layout
//!
//! [`SchemaLoader::new`] reads every `*.schema.json`, `*.schema.yaml` and
//! `*.schema.yml` file directly inside a directory. Each is decoded once,
//! at construction, and indexed by its filename (`person.schema.json`).
//! References inside a schema resolve only against that schema's own
//! definitions; there is no cross-file `$ref`.
//!
//! ## Document Formats
//!
//! The format is chosen by file extension: `.yaml`/`.yml` is YAML,
//! anything else is JSON. YAML documents are converted to the JSON value
//! model before validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::decode::{self, DecodeError, DecodeOptions};
use crate::engine::{ValidationOptions, Validator};
use crate::error::SchemaError;
use crate::model::Schema;
use crate::verdict::Verdict;

/// Filename suffixes recognized as schema documents.
const SCHEMA_SUFFIXES: &[&str] = &[".schema.json", ".schema.yaml", ".schema.yml"];

/// Error while loading schemas or documents.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The schema file or directory could not be read, or no such schema is loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad {
        /// Schema filename or directory.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema file was read but could not be decoded.
    #[error("schema '{schema_name}' could not be decoded: {source}")]
    Decode {
        /// Schema filename.
        schema_name: String,
        /// Decoder diagnostic.
        #[source]
        source: DecodeError,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// Validation reached a broken part of the schema.
    #[error("schema '{schema_name}' is broken: {source}")]
    Schema {
        /// Schema filename.
        schema_name: String,
        #[source]
        source: SchemaError,
    },

    /// IO error reading the schema directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded schemas indexed by filename.
///
/// `SchemaLoader` is `Send + Sync`; validation borrows the decoded graphs
/// immutably, so one loader can serve concurrent callers.
#[derive(Debug)]
pub struct SchemaLoader {
    /// Directory the schemas were loaded from.
    schema_dir: PathBuf,
    /// Filename → decoded schema.
    schemas: HashMap<String, Schema>,
    /// Budgets applied to every validation.
    options: ValidationOptions,
}

impl SchemaLoader {
    /// Load and decode every schema file in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::SchemaLoad` if the directory or a schema file
    /// cannot be read, and `LoadError::Decode` if a schema cannot be
    /// decoded.
    pub fn new(schema_dir: impl AsRef<Path>, decode_options: &DecodeOptions) -> Result<Self, LoadError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| LoadError::SchemaLoad {
            schema_name: schema_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if SCHEMA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                let schema = load_schema_file(&path, decode_options)?;
                schemas.insert(name.to_string(), schema);
            }
        }

        debug!(
            dir = %schema_dir.display(),
            count = schemas.len(),
            "loaded schemas"
        );
        Ok(Self {
            schema_dir,
            schemas,
            options: ValidationOptions::default(),
        })
    }

    /// Replace the evaluation budgets.
    pub fn with_validation_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Look up a loaded schema by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Validate a parsed value against a named schema.
    ///
    /// # Errors
    ///
    /// `LoadError::SchemaLoad` if no schema has that name;
    /// `LoadError::Schema` if validation hits a broken part of the schema.
    /// An invalid instance is `Ok(Verdict::Invalid(..))`, not an error.
    pub fn validate_value(&self, instance: &Value, schema_name: &str) -> Result<Verdict, LoadError> {
        let schema = self.schemas.get(schema_name).ok_or_else(|| LoadError::SchemaLoad {
            schema_name: schema_name.to_string(),
            reason: format!("schema not found in {}", self.schema_dir.display()),
        })?;
        Validator::with_options(schema, self.options)
            .validate(instance)
            .map_err(|source| LoadError::Schema {
                schema_name: schema_name.to_string(),
                source,
            })
    }

    /// Load a JSON or YAML document and validate it against a named schema.
    pub fn validate_file(&self, document_path: &Path, schema_name: &str) -> Result<Verdict, LoadError> {
        let document = load_document(document_path)?;
        self.validate_value(&document, schema_name)
    }
}

/// Read a JSON or YAML document into the instance model.
///
/// # Errors
///
/// Returns `LoadError::DocumentLoad` if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let document_error = |reason: String| LoadError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| document_error(format!("cannot read file: {e}")))?;

    if is_yaml(path) {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)
            .map_err(|e| document_error(format!("invalid YAML: {e}")))?;
        json_from_yaml(&yaml_value)
            .map_err(|e| document_error(format!("YAML-to-JSON conversion failed: {e}")))
    } else {
        serde_json::from_str(&content).map_err(|e| document_error(format!("invalid JSON: {e}")))
    }
}

/// Read and decode a single schema file.
///
/// # Errors
///
/// `LoadError::SchemaLoad` if the file cannot be read; `LoadError::Decode`
/// if its contents are not a supported schema.
pub fn load_schema_file(path: &Path, options: &DecodeOptions) -> Result<Schema, LoadError> {
    let schema_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::SchemaLoad {
        schema_name: schema_name.clone(),
        reason: format!("cannot read file: {e}"),
    })?;

    let decoded = if is_yaml(path) {
        decode::from_yaml_str(&content, options)
    } else {
        decode::from_json_str(&content, options)
    };
    decoded.map_err(|source| LoadError::Decode {
        schema_name,
        source,
    })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Rebuild a YAML document as the JSON value a schema or instance decodes
/// from.
///
/// Tags are dropped and their inner value kept. Mapping keys become
/// strings, so only scalar keys are accepted, and two keys that spell the
/// same string (`1` and `"1"`) are rejected rather than merged.
pub(crate) fn json_from_yaml(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(flag) => Value::Bool(*flag),
        Yaml::Number(n) => Value::Number(json_number(n)?),
        Yaml::String(text) => Value::String(text.clone()),
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .map(json_from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                match object.entry(json_key(key)?) {
                    serde_json::map::Entry::Occupied(taken) => {
                        return Err(format!(
                            "duplicate key '{}' after conversion to string",
                            taken.key()
                        ))
                    }
                    serde_json::map::Entry::Vacant(slot) => {
                        slot.insert(json_from_yaml(value)?);
                    }
                }
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => json_from_yaml(&tagged.value)?,
    })
}

fn json_number(n: &serde_yaml::Number) -> Result<serde_json::Number, String> {
    if let Some(signed) = n.as_i64() {
        return Ok(signed.into());
    }
    if let Some(unsigned) = n.as_u64() {
        return Ok(unsigned.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| format!("number {n} has no JSON representation"))
}

fn json_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(text) => Ok(text.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(format!("mapping key {other:?} is not a scalar")),
    }
}
