//! # Reference Resolution
//!
//! Turns a reference pointer into the schema node it designates. Only
//! same-document pointers are supported:
//!
//! - `#` (or the empty string) designates the document root.
//! - `#/definitions/<name>` designates an entry of a definitions table.
//!
//! The pointer is interpreted as a URI reference against a fixed document
//! base, so `other.json#/definitions/x` or `https://...` are recognized as
//! naming another document and rejected as
//! [`ResolutionError::External`]. No network or file access ever happens.
//!
//! `<name>` is a JSON Pointer token inside a URI fragment: percent escapes
//! (`%20`) are decoded first, then `~1` becomes `/` and `~0` becomes `~`.
//!
//! Resolution is a pure function of the pointer and the tables it is given.
//! It never rewrites the reference node. Cycle detection is the engine's
//! job, since only the engine knows whether instance structure was
//! consumed between two visits.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::ResolutionError;
use crate::model::{Definitions, Schema};

/// Base URI standing in for "this document".
const DOCUMENT_BASE: &str = "shape:///document";

/// What a parsed pointer designates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The document root node.
    Root,
    /// A named entry of a definitions table.
    Definition(String),
}

/// Parse a reference pointer.
///
/// # Errors
///
/// - [`ResolutionError::External`] if the pointer names another document.
/// - [`ResolutionError::Malformed`] if it is not a URI reference, or its
///   fragment is not `""` or `/definitions/<name>`.
pub fn parse(pointer: &str) -> Result<Target, ResolutionError> {
    let malformed = |reason: String| ResolutionError::Malformed {
        pointer: pointer.to_string(),
        reason,
    };

    let base = Url::parse(DOCUMENT_BASE).map_err(|e| malformed(e.to_string()))?;
    let joined = base
        .join(pointer)
        .map_err(|e| malformed(format!("not a URI reference: {e}")))?;

    let mut document = joined.clone();
    document.set_fragment(None);
    if document != base {
        return Err(ResolutionError::External {
            pointer: pointer.to_string(),
        });
    }

    let fragment = match joined.fragment() {
        None | Some("") => return Ok(Target::Root),
        Some(fragment) => fragment,
    };

    let decoded = percent_decode_str(fragment)
        .decode_utf8()
        .map_err(|e| malformed(format!("fragment is not UTF-8: {e}")))?;
    let rest = decoded
        .strip_prefix('/')
        .ok_or_else(|| malformed("fragment is not a JSON pointer".to_string()))?;

    let mut tokens = rest.split('/');
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some("definitions"), Some(name), None) => {
            let name = unescape_token(name)
                .ok_or_else(|| malformed(format!("invalid escape in token '{name}'")))?;
            Ok(Target::Definition(name))
        }
        _ => Err(malformed(
            "only #/definitions/<name> pointers are supported".to_string(),
        )),
    }
}

/// Decode `~1` and `~0`. Any other `~` sequence is invalid.
fn unescape_token(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Look up `name` in a stack of definitions tables, innermost last.
///
/// The nearest enclosing table wins; outer tables are consulted in turn.
pub fn lookup<'s>(name: &str, scopes: &[&'s Definitions]) -> Option<&'s Schema> {
    lookup_scoped(name, scopes).map(|(_, schema)| schema)
}

/// Like [`lookup`], but also returns how many tables of `scopes` enclose
/// the entry, the table holding it included.
pub fn lookup_scoped<'s>(name: &str, scopes: &[&'s Definitions]) -> Option<(usize, &'s Schema)> {
    scopes
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, table)| table.get(name).map(|schema| (index + 1, schema)))
}

/// A resolved reference target and the scope it was declared in.
#[derive(Debug, Clone, Copy)]
pub struct Located<'s> {
    pub target: &'s Schema,
    /// Number of tables from the caller's scope stack that enclose the
    /// target in the document. Truncating the stack to this length gives
    /// the scope a reference inside the target must be resolved in.
    pub depth: usize,
}

/// Resolve a pointer lexically: `scopes` are the definitions tables
/// enclosing the reference, outermost first.
///
/// # Errors
///
/// Parse errors from [`parse`]; [`ResolutionError::NotFound`] if no
/// enclosing table has the entry.
pub fn locate<'s>(
    pointer: &str,
    root: &'s Schema,
    scopes: &[&'s Definitions],
) -> Result<Located<'s>, ResolutionError> {
    match parse(pointer)? {
        Target::Root => Ok(Located { target: root, depth: 0 }),
        Target::Definition(name) => lookup_scoped(&name, scopes)
            .map(|(depth, target)| Located { target, depth })
            .ok_or_else(|| ResolutionError::NotFound {
                pointer: pointer.to_string(),
            }),
    }
}

/// Resolve a pointer against a single definitions table.
///
/// # Errors
///
/// Parse errors from [`parse`]; [`ResolutionError::NotFound`] if the table
/// has no such entry. A root pointer (`#`) designates no definition and is
/// reported as malformed here; the engine resolves it against the root node.
pub fn resolve<'s>(pointer: &str, definitions: &'s Definitions) -> Result<&'s Schema, ResolutionError> {
    match parse(pointer)? {
        Target::Definition(name) => {
            definitions
                .get(&name)
                .ok_or_else(|| ResolutionError::NotFound {
                    pointer: pointer.to_string(),
                })
        }
        Target::Root => Err(ResolutionError::Malformed {
            pointer: pointer.to_string(),
            reason: "pointer designates the document root, not a definition".to_string(),
        }),
    }
}
