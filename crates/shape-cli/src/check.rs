//! # Check Subcommand
//!
//! Validates JSON or YAML documents against one schema file.
//!
//! ```bash
//! shape check --schema person.schema.json alice.json bob.yaml
//! ```
//!
//! Exit codes: 0 when every document is valid, 1 when any document is
//! invalid, 2 when the schema cannot be decoded, is broken on a path a
//! document reaches, or a document cannot be read. Every document is
//! reported even when an earlier one hit a schema error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use shape_schema::loader::{load_document, load_schema_file};
use shape_schema::{audit_references, Failure, Schema, Validator, Verdict};

use crate::config::{OutputFormat, Settings};

/// Arguments for the `shape check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(long, short, value_name = "FILE")]
    pub schema: PathBuf,

    /// Documents to validate.
    #[arg(value_name = "INSTANCE", required = true)]
    pub instances: Vec<PathBuf>,
}

/// Outcome for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub instance: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Valid,
    Invalid,
    /// The document could not be read, or the schema is broken on a
    /// path the document reaches.
    Error,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 all valid, 1 any invalid, 2 unreadable document or
/// broken schema. A schema that cannot be loaded is returned as `Err` and
/// reported by the caller.
pub fn run_check(args: &CheckArgs, settings: &Settings) -> Result<u8> {
    let schema = load_schema_file(&args.schema, &settings.decode)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;

    for finding in audit_references(&schema) {
        tracing::warn!(
            location = %finding.location,
            pointer = %finding.pointer,
            "unresolvable reference: {}",
            finding.problem
        );
    }

    let reports = check_instances(&schema, &args.instances, settings);

    match settings.format {
        OutputFormat::Text => print!("{}", render_text(&reports)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("failed to serialize report")?
        ),
    }

    Ok(exit_code(&reports))
}

/// Validate each document in order.
///
/// A document that cannot be read, or that reaches a broken part of the
/// schema, is reported as an error and the remaining documents are still
/// checked.
pub fn check_instances(
    schema: &Schema,
    paths: &[PathBuf],
    settings: &Settings,
) -> Vec<InstanceReport> {
    let validator = Validator::with_options(schema, settings.validation);
    paths.iter().map(|path| check_one(&validator, path)).collect()
}

fn check_one(validator: &Validator<'_>, path: &Path) -> InstanceReport {
    let instance = path.display().to_string();
    let errored = |instance: String, error: String| InstanceReport {
        instance,
        status: Status::Error,
        failures: Vec::new(),
        error: Some(error),
    };

    let document = match load_document(path) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!(path = %instance, error = %e, "document not loaded");
            return errored(instance, e.to_string());
        }
    };

    let verdict = match validator.validate(&document) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(path = %instance, error = %e, "schema error");
            return errored(instance, format!("schema error: {e}"));
        }
    };
    tracing::info!(path = %instance, valid = verdict.is_valid(), "checked document");

    match verdict {
        Verdict::Valid => InstanceReport {
            instance,
            status: Status::Valid,
            failures: Vec::new(),
            error: None,
        },
        Verdict::Invalid(trail) => InstanceReport {
            instance,
            status: Status::Invalid,
            failures: trail.into_inner(),
            error: None,
        },
    }
}

pub fn render_text(reports: &[InstanceReport]) -> String {
    let mut out = String::new();
    for report in reports {
        match report.status {
            Status::Valid => out.push_str(&format!("OK: {}\n", report.instance)),
            Status::Invalid => {
                out.push_str(&format!("FAIL: {}\n", report.instance));
                for failure in &report.failures {
                    out.push_str(&format!("  {failure}\n"));
                }
            }
            Status::Error => out.push_str(&format!(
                "ERROR: {}: {}\n",
                report.instance,
                report.error.as_deref().unwrap_or("unreadable")
            )),
        }
    }
    let valid = reports.iter().filter(|r| r.status == Status::Valid).count();
    out.push_str(&format!("\n{valid}/{} documents valid\n", reports.len()));
    out
}

pub fn exit_code(reports: &[InstanceReport]) -> u8 {
    if reports.iter().any(|r| r.status == Status::Error) {
        2
    } else if reports.iter().any(|r| r.status == Status::Invalid) {
        1
    } else {
        0
    }
}
