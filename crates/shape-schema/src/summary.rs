//! # Schema Summaries and Reference Audit
//!
//! Static analysis of a decoded schema graph, without any instance:
//!
//! - [`summarize`] counts nodes per variant, lists definitions, and
//!   measures nesting depth. The CLI's `inspect` command prints it.
//! - [`audit_references`] reports references that can never resolve
//!   (malformed, external, or naming an absent definition) and pure
//!   reference chains that loop back on themselves.
//!
//! The engine only discovers these defects when an instance happens to
//! reach them. The audit finds them up front.
//!
//! Lookup here is lexical, exactly as in the engine: a reference sees the
//! definitions tables of the nodes that enclose it in the document, and a
//! reference inside a definition sees the tables enclosing that
//! definition. A reference the audit accepts is one the engine resolves,
//! and the other way round.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ResolutionError;
use crate::model::{AdditionalItems, Definitions, Items, Reference, Schema, SchemaKind};
use crate::resolve;

/// Shape of a schema graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSummary {
    /// Variant of the root node.
    pub root_kind: SchemaKind,
    /// Declared `type` of the root node, if any.
    pub root_type: Option<String>,
    /// Root title annotation.
    pub title: Option<String>,
    /// Node count per variant, references included.
    pub nodes: BTreeMap<SchemaKind, usize>,
    /// Location of every definition, e.g. `#/definitions/address`.
    pub definitions: Vec<String>,
    /// Number of reference nodes.
    pub references: usize,
    /// Deepest nesting of the node tree; the root alone is depth 1.
    pub depth: usize,
    /// Reference problems found by [`audit_references`].
    pub findings: Vec<ReferenceFinding>,
}

impl SchemaSummary {
    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.values().sum()
    }
}

/// A reference that cannot work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceFinding {
    /// Location of the reference node in the schema document.
    pub location: String,
    /// The pointer as written.
    pub pointer: String,
    /// Why it cannot work.
    pub problem: String,
}

impl fmt::Display for ReferenceFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {} ({})", self.location, self.pointer, self.problem)
    }
}

/// Summarize a schema graph.
pub fn summarize(schema: &Schema) -> SchemaSummary {
    let mut summary = SchemaSummary {
        root_kind: schema.kind(),
        root_type: schema.type_name().map(str::to_string),
        title: schema
            .generic()
            .and_then(|g| g.annotations.title.clone()),
        nodes: BTreeMap::new(),
        definitions: Vec::new(),
        references: 0,
        depth: 0,
        findings: audit_references(schema),
    };
    tally(schema, "#", 1, &mut summary);
    summary
}

fn tally(node: &Schema, location: &str, depth: usize, summary: &mut SchemaSummary) {
    *summary.nodes.entry(node.kind()).or_insert(0) += 1;
    summary.depth = summary.depth.max(depth);
    if node.kind() == SchemaKind::Reference {
        summary.references += 1;
    }
    if let Some(definitions) = node.definitions() {
        for name in definitions.keys() {
            summary
                .definitions
                .push(format!("{location}/definitions/{}", escape_token(name)));
        }
    }
    for (child_location, child) in children(node, location) {
        tally(child, &child_location, depth + 1, summary);
    }
}

/// Find references that can never resolve, and pure reference cycles.
pub fn audit_references(schema: &Schema) -> Vec<ReferenceFinding> {
    let mut audit = Audit {
        root: schema,
        scopes: Vec::new(),
        findings: Vec::new(),
    };
    audit.visit(schema, "#");
    audit.findings
}

struct Audit<'s> {
    root: &'s Schema,
    scopes: Vec<&'s Definitions>,
    findings: Vec<ReferenceFinding>,
}

impl<'s> Audit<'s> {
    fn visit(&mut self, node: &'s Schema, location: &str) {
        if let Schema::Reference(reference) = node {
            if let Err(problem) = self.follow(reference) {
                self.findings.push(ReferenceFinding {
                    location: location.to_string(),
                    pointer: reference.pointer.clone(),
                    problem: problem.to_string(),
                });
            }
            return;
        }

        let scoped = node.definitions();
        if let Some(definitions) = scoped {
            self.scopes.push(definitions);
        }
        for (child_location, child) in children(node, location) {
            self.visit(child, &child_location);
        }
        if scoped.is_some() {
            self.scopes.pop();
        }
    }

    /// Resolve a reference, then keep following while the target is
    /// itself a reference. Each hop resolves in the scope of the previous
    /// target's declaration.
    fn follow(&self, start: &'s Reference) -> Result<(), ResolutionError> {
        let mut chain: Vec<&Reference> = vec![start];
        let mut scopes = self.scopes.clone();
        let mut current = start;
        loop {
            let located = resolve::locate(&current.pointer, self.root, &scopes)?;
            scopes.truncate(located.depth);
            let Schema::Reference(next) = located.target else {
                return Ok(());
            };
            if chain.iter().any(|r| std::ptr::eq(*r, next)) {
                return Err(ResolutionError::Cycle {
                    pointer: next.pointer.clone(),
                });
            }
            chain.push(next);
            current = next;
        }
    }
}

/// Direct sub-schemas of a node with their document locations.
fn children<'s>(node: &'s Schema, location: &str) -> Vec<(String, &'s Schema)> {
    let mut out = Vec::new();
    if let Some(generic) = node.generic() {
        for (keyword, branches) in [
            ("allOf", &generic.all_of),
            ("anyOf", &generic.any_of),
            ("oneOf", &generic.one_of),
        ] {
            for (i, branch) in branches.iter().enumerate() {
                out.push((format!("{location}/{keyword}/{i}"), branch));
            }
        }
        if let Some(not) = &generic.not {
            out.push((format!("{location}/not"), not.as_ref()));
        }
        for (name, definition) in &generic.definitions {
            out.push((
                format!("{location}/definitions/{}", escape_token(name)),
                definition,
            ));
        }
    }
    match node {
        Schema::Object(object) => {
            for (name, property) in &object.properties {
                out.push((
                    format!("{location}/properties/{}", escape_token(name)),
                    property,
                ));
            }
        }
        Schema::Array(array) => {
            match &array.items {
                Some(Items::Uniform(each)) => out.push((format!("{location}/items"), each.as_ref())),
                Some(Items::Positional(list)) => {
                    for (i, item) in list.iter().enumerate() {
                        out.push((format!("{location}/items/{i}"), item));
                    }
                }
                None => {}
            }
            if let Some(AdditionalItems::Schema(extra)) = &array.additional_items {
                out.push((format!("{location}/additionalItems"), extra.as_ref()));
            }
            if let Some(contains) = &array.contains {
                out.push((format!("{location}/contains"), contains.as_ref()));
            }
        }
        _ => {}
    }
    out
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
