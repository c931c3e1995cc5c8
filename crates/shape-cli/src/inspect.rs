//! # Inspect Subcommand
//!
//! Decodes a schema document and prints the shape of its node graph:
//! node counts per variant, nesting depth, definitions, and any reference
//! that can never resolve.
//!
//! Exits 0 for a clean schema and 1 when the reference audit has findings.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use shape_schema::loader::load_schema_file;
use shape_schema::{summarize, SchemaSummary};

use crate::config::{OutputFormat, Settings};

/// Arguments for the `shape inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, settings: &Settings) -> Result<u8> {
    let schema = load_schema_file(&args.schema, &settings.decode)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let summary = summarize(&schema);
    tracing::debug!(
        nodes = summary.node_count(),
        findings = summary.findings.len(),
        "summarized schema"
    );

    match settings.format {
        OutputFormat::Text => print!("{}", render_text(&args.schema.display().to_string(), &summary)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
        ),
    }

    Ok(if summary.findings.is_empty() { 0 } else { 1 })
}

pub fn render_text(name: &str, summary: &SchemaSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Schema: {name}");
    if let Some(title) = &summary.title {
        let _ = writeln!(out, "  title: {title}");
    }
    match &summary.root_type {
        Some(type_name) => {
            let _ = writeln!(out, "  root: {} (type {type_name})", summary.root_kind);
        }
        None => {
            let _ = writeln!(out, "  root: {}", summary.root_kind);
        }
    }
    let counts: Vec<String> = summary
        .nodes
        .iter()
        .map(|(kind, count)| format!("{kind} {count}"))
        .collect();
    let _ = writeln!(
        out,
        "  nodes: {} ({})",
        summary.node_count(),
        counts.join(", ")
    );
    let _ = writeln!(out, "  depth: {}", summary.depth);
    let _ = writeln!(out, "  references: {}", summary.references);
    let _ = writeln!(out, "  definitions: {}", summary.definitions.len());
    for definition in &summary.definitions {
        let _ = writeln!(out, "    {definition}");
    }
    if !summary.findings.is_empty() {
        let _ = writeln!(out, "\n{} unresolvable reference(s):", summary.findings.len());
        for finding in &summary.findings {
            let _ = writeln!(out, "{finding}");
        }
    }
    out
}
