//! # Validation Engine
//!
//! Walks a schema graph against an instance and decides validity.
//!
//! ## Evaluation Order
//!
//! For every node:
//!
//! 1. Generic keywords `enum`, `const`, `allOf`, `not`. The first failure
//!    stops evaluation of the node.
//! 2. Variant keywords, in declaration order, only when the instance kind
//!    matches the variant. An instance of another kind passes them
//!    vacuously but is still subject to step 1 and steps 3–4.
//! 3. `anyOf`: every branch is evaluated; at least one must accept.
//! 4. `oneOf`: every branch is evaluated; exactly one must accept.
//!
//! A reference node evaluates its resolved target against the same
//! instance at the same path. Definition names resolve lexically: against
//! the tables of the nodes enclosing the reference in the document,
//! nearest first.
//!
//! ## Fail-Closed Invariants
//!
//! - A reference re-entered at the same instance location, without any
//!   property or item being consumed in between, is a
//!   [`ResolutionError::Cycle`].
//! - Nesting deeper than [`ValidationOptions::max_depth`] or evaluating
//!   more than [`ValidationOptions::max_steps`] nodes is
//!   [`SchemaError::BudgetExceeded`]. Adversarial schemas cannot exhaust
//!   the host stack.
//!
//! The engine never mutates the schema graph and keeps no state between
//! calls; one schema can be validated against from any number of threads.
//! Patterns are compiled once per call and dropped with it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use shape_core::{equal, number, CanonicalBytes, InstanceKind, InstancePath, PathSegment};
use tracing::{debug, trace};

use crate::error::{Budget, ResolutionError, SchemaError};
use crate::model::{
    AdditionalItems, ArraySchema, Definitions, Generic, Items, NumericBounds, ObjectSchema,
    Reference, Schema, StringSchema,
};
use crate::resolve;
use crate::verdict::{Failure, FailureTrail, Keyword, Verdict};

/// Default nesting limit for one validation.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default node-evaluation limit for one validation.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Evaluation budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Maximum nesting of node evaluations on the active walk.
    pub max_depth: usize,
    /// Maximum node evaluations for a single `validate` call.
    pub max_steps: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Validates instances against one root schema.
///
/// Borrowing the root keeps the graph immutable for the validator's
/// lifetime; a `Validator` is `Copy` and holds no per-call state.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    root: &'s Schema,
    options: ValidationOptions,
}

impl<'s> Validator<'s> {
    /// A validator with default budgets.
    pub fn new(root: &'s Schema) -> Self {
        Self::with_options(root, ValidationOptions::default())
    }

    pub fn with_options(root: &'s Schema, options: ValidationOptions) -> Self {
        Self { root, options }
    }

    pub fn root(&self) -> &'s Schema {
        self.root
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate an instance from its root.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema is broken on a path the
    /// instance reaches: an invalid pattern, an unresolvable or cyclic
    /// reference, or an exhausted budget.
    pub fn validate(&self, instance: &Value) -> Result<Verdict, SchemaError> {
        self.validate_at(instance, &InstancePath::root())
    }

    /// Validate an instance that lives at `path` inside a larger document.
    ///
    /// Failure paths are reported relative to the larger document.
    pub fn validate_at(
        &self,
        instance: &Value,
        path: &InstancePath,
    ) -> Result<Verdict, SchemaError> {
        let mut walk = Walk::new(self.root, self.options, path.clone());
        let verdict = walk.check(self.root, instance)?;
        debug!(
            valid = verdict.is_valid(),
            steps = walk.steps,
            "validation finished"
        );
        Ok(verdict)
    }

    /// Returns true if the instance is accepted.
    pub fn is_valid(&self, instance: &Value) -> Result<bool, SchemaError> {
        Ok(self.validate(instance)?.is_valid())
    }
}

/// Validate `instance` against `root` with default budgets.
pub fn validate(root: &Schema, instance: &Value) -> Result<Verdict, SchemaError> {
    Validator::new(root).validate(instance)
}

/// State of one validation call.
struct Walk<'s> {
    root: &'s Schema,
    options: ValidationOptions,
    /// Definitions tables enclosing the current node in the document,
    /// outermost first.
    scopes: Vec<&'s Definitions>,
    /// References entered since the last property or item was consumed.
    active_refs: Vec<&'s Reference>,
    /// Patterns compiled so far in this call.
    patterns: HashMap<&'s str, regex::Regex>,
    path: InstancePath,
    depth: usize,
    steps: usize,
}

impl<'s> Walk<'s> {
    fn new(root: &'s Schema, options: ValidationOptions, path: InstancePath) -> Self {
        Self {
            root,
            options,
            scopes: Vec::new(),
            active_refs: Vec::new(),
            patterns: HashMap::new(),
            path,
            depth: 0,
            steps: 0,
        }
    }

    fn check(&mut self, node: &'s Schema, instance: &Value) -> Result<Verdict, SchemaError> {
        if self.depth >= self.options.max_depth {
            return Err(SchemaError::BudgetExceeded {
                budget: Budget::Depth,
                limit: self.options.max_depth,
            });
        }
        if self.steps >= self.options.max_steps {
            return Err(SchemaError::BudgetExceeded {
                budget: Budget::Steps,
                limit: self.options.max_steps,
            });
        }
        self.depth += 1;
        self.steps += 1;
        let result = self.check_node(node, instance);
        self.depth -= 1;
        result
    }

    fn check_node(&mut self, node: &'s Schema, instance: &Value) -> Result<Verdict, SchemaError> {
        let generic = match node {
            Schema::Reference(reference) => return self.check_reference(reference, instance),
            Schema::Any(s) => &s.generic,
            Schema::String(s) => &s.generic,
            Schema::Integer(s) => &s.generic,
            Schema::Number(s) => &s.generic,
            Schema::Object(s) => &s.generic,
            Schema::Array(s) => &s.generic,
            Schema::Boolean(s) => &s.generic,
            Schema::Null(s) => &s.generic,
        };

        let scoped = !generic.definitions.is_empty();
        if scoped {
            self.scopes.push(&generic.definitions);
        }
        let result = self.check_keywords(node, generic, instance);
        if scoped {
            self.scopes.pop();
        }
        result
    }

    fn check_keywords(
        &mut self,
        node: &'s Schema,
        generic: &'s Generic,
        instance: &Value,
    ) -> Result<Verdict, SchemaError> {
        if let invalid @ Verdict::Invalid(_) = self.check_enum(generic, instance) {
            return Ok(invalid);
        }
        if let invalid @ Verdict::Invalid(_) = self.check_const(generic, instance) {
            return Ok(invalid);
        }
        if let invalid @ Verdict::Invalid(_) = self.check_all_of(generic, instance)? {
            return Ok(invalid);
        }
        if let invalid @ Verdict::Invalid(_) = self.check_not(generic, instance)? {
            return Ok(invalid);
        }

        let variant = match (node, instance) {
            (Schema::String(s), Value::String(text)) => self.check_string(s, text)?,
            (Schema::Integer(s), Value::Number(n)) if number::is_integral(n) => {
                self.check_numeric(&s.bounds, n)
            }
            (Schema::Number(s), Value::Number(n)) => self.check_numeric(&s.bounds, n),
            (Schema::Object(s), Value::Object(map)) => self.check_object(s, map)?,
            (Schema::Array(s), Value::Array(items)) => self.check_array(s, items)?,
            _ => Verdict::Valid,
        };
        if variant.is_invalid() {
            return Ok(variant);
        }

        if let invalid @ Verdict::Invalid(_) = self.check_any_of(generic, instance)? {
            return Ok(invalid);
        }
        self.check_one_of(generic, instance)
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    fn check_reference(
        &mut self,
        reference: &'s Reference,
        instance: &Value,
    ) -> Result<Verdict, SchemaError> {
        if self.active_refs.iter().any(|r| std::ptr::eq(*r, reference)) {
            return Err(ResolutionError::Cycle {
                pointer: reference.pointer.clone(),
            }
            .into());
        }
        let located = resolve::locate(&reference.pointer, self.root, &self.scopes)?;
        trace!(pointer = %reference.pointer, path = %self.path, "resolved reference");

        // The target sees the tables enclosing its declaration, not the
        // tables enclosing the reference.
        let outer = self.scopes.split_off(located.depth);
        self.active_refs.push(reference);
        let result = self.check(located.target, instance);
        self.active_refs.pop();
        self.scopes.extend(outer);
        result
    }

    /// Check a child value. Consuming structure clears the cycle guard.
    fn descend(
        &mut self,
        segment: impl Into<PathSegment>,
        node: &'s Schema,
        instance: &Value,
    ) -> Result<Verdict, SchemaError> {
        self.path.push(segment);
        let entered = std::mem::take(&mut self.active_refs);
        let result = self.check(node, instance);
        self.active_refs = entered;
        self.path.pop();
        result
    }

    fn fail(&self, keyword: Keyword, message: impl Into<String>) -> Verdict {
        Verdict::fail(&self.path, keyword, message)
    }

    // -----------------------------------------------------------------------
    // Generic keywords
    // -----------------------------------------------------------------------

    fn check_enum(&self, generic: &Generic, instance: &Value) -> Verdict {
        match &generic.enum_values {
            Some(values) if !values.iter().any(|v| equal(v, instance)) => self.fail(
                Keyword::Enum,
                format!("{} is not one of {}", preview(instance), preview_list(values)),
            ),
            _ => Verdict::Valid,
        }
    }

    fn check_const(&self, generic: &Generic, instance: &Value) -> Verdict {
        match &generic.const_value {
            Some(expected)
                if InstanceKind::of(expected) == InstanceKind::of(instance)
                    && !equal(expected, instance) =>
            {
                self.fail(
                    Keyword::Const,
                    format!("{} is not equal to {}", preview(instance), preview(expected)),
                )
            }
            _ => Verdict::Valid,
        }
    }

    fn check_all_of(&mut self, generic: &'s Generic, instance: &Value) -> Result<Verdict, SchemaError> {
        for (i, branch) in generic.all_of.iter().enumerate() {
            if let Verdict::Invalid(mut trail) = self.check(branch, instance)? {
                trail.push(Failure::new(
                    self.path.clone(),
                    Keyword::AllOf,
                    format!("branch {i} of allOf rejected the instance"),
                ));
                return Ok(Verdict::Invalid(trail));
            }
        }
        Ok(Verdict::Valid)
    }

    fn check_not(&mut self, generic: &'s Generic, instance: &Value) -> Result<Verdict, SchemaError> {
        let Some(inner) = &generic.not else {
            return Ok(Verdict::Valid);
        };
        if self.check(inner, instance)?.is_valid() {
            return Ok(self.fail(
                Keyword::Not,
                format!("{} matches the schema under not", preview(instance)),
            ));
        }
        Ok(Verdict::Valid)
    }

    fn check_any_of(&mut self, generic: &'s Generic, instance: &Value) -> Result<Verdict, SchemaError> {
        if generic.any_of.is_empty() {
            return Ok(Verdict::Valid);
        }
        let mut matched = false;
        let mut rejections = Vec::new();
        for branch in &generic.any_of {
            match self.check(branch, instance)? {
                Verdict::Valid => matched = true,
                Verdict::Invalid(trail) => rejections.push(trail),
            }
        }
        if matched {
            return Ok(Verdict::Valid);
        }
        Ok(Verdict::Invalid(self.composite(
            Keyword::AnyOf,
            format!("no branch of anyOf matched ({} branches)", rejections.len()),
            rejections,
        )))
    }

    fn check_one_of(&mut self, generic: &'s Generic, instance: &Value) -> Result<Verdict, SchemaError> {
        if generic.one_of.is_empty() {
            return Ok(Verdict::Valid);
        }
        let mut matched = Vec::new();
        let mut rejections = Vec::new();
        for (i, branch) in generic.one_of.iter().enumerate() {
            match self.check(branch, instance)? {
                Verdict::Valid => matched.push(i),
                Verdict::Invalid(trail) => rejections.push(trail),
            }
        }
        match matched.len() {
            1 => Ok(Verdict::Valid),
            0 => Ok(Verdict::Invalid(self.composite(
                Keyword::OneOf,
                "no branch matched".to_string(),
                rejections,
            ))),
            n => Ok(self.fail(
                Keyword::OneOf,
                format!("ambiguous: {n} branches matched (branches {matched:?})"),
            )),
        }
    }

    /// A combinator record followed by each branch's trail.
    fn composite(&self, keyword: Keyword, message: String, branches: Vec<FailureTrail>) -> FailureTrail {
        let mut trail = FailureTrail::new(Failure::new(self.path.clone(), keyword, message));
        for branch in branches {
            trail.append(branch);
        }
        trail
    }

    // -----------------------------------------------------------------------
    // Variant keywords
    // -----------------------------------------------------------------------

    fn check_string(&mut self, schema: &'s StringSchema, text: &str) -> Result<Verdict, SchemaError> {
        let length = text.chars().count() as u64;
        if length < schema.min_length {
            return Ok(self.fail(
                Keyword::MinLength,
                format!("length {length} is shorter than {}", schema.min_length),
            ));
        }
        if let Some(max) = bounded(schema.max_length) {
            if length > max {
                return Ok(self.fail(
                    Keyword::MaxLength,
                    format!("length {length} is longer than {max}"),
                ));
            }
        }
        if let Some(pattern) = &schema.pattern {
            if !self.compiled(pattern)?.is_match(text) {
                return Ok(self.fail(
                    Keyword::Pattern,
                    format!("{} does not contain a match for '{pattern}'", preview_str(text)),
                ));
            }
        }
        Ok(Verdict::Valid)
    }

    fn compiled(&mut self, pattern: &'s str) -> Result<&regex::Regex, SchemaError> {
        use std::collections::hash_map::Entry;

        match self.patterns.entry(pattern) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let regex = regex::Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(entry.insert(regex))
            }
        }
    }

    fn check_numeric(&self, bounds: &NumericBounds, n: &Number) -> Verdict {
        if let Some(divisor) = &bounds.multiple_of {
            if number::is_positive(divisor) && !number::is_multiple_of(n, divisor) {
                return self.fail(
                    Keyword::MultipleOf,
                    format!("{n} is not a multiple of {divisor}"),
                );
            }
        }
        if let Some(minimum) = &bounds.minimum {
            let ordering = number::compare(n, minimum);
            if bounds.exclusive_minimum && ordering.is_le() {
                return self.fail(
                    Keyword::Minimum,
                    format!("{n} is not greater than {minimum}"),
                );
            }
            if ordering.is_lt() {
                return self.fail(Keyword::Minimum, format!("{n} is less than {minimum}"));
            }
        }
        if let Some(maximum) = &bounds.maximum {
            let ordering = number::compare(n, maximum);
            if bounds.exclusive_maximum && ordering.is_ge() {
                return self.fail(
                    Keyword::Maximum,
                    format!("{n} is not less than {maximum}"),
                );
            }
            if ordering.is_gt() {
                return self.fail(Keyword::Maximum, format!("{n} is greater than {maximum}"));
            }
        }
        Verdict::Valid
    }

    fn check_object(
        &mut self,
        schema: &'s ObjectSchema,
        map: &serde_json::Map<String, Value>,
    ) -> Result<Verdict, SchemaError> {
        let count = map.len() as u64;
        if count < schema.min_properties {
            return Ok(self.fail(
                Keyword::MinProperties,
                format!("{count} properties, fewer than {}", schema.min_properties),
            ));
        }
        if let Some(max) = bounded(schema.max_properties) {
            if count > max {
                return Ok(self.fail(
                    Keyword::MaxProperties,
                    format!("{count} properties, more than {max}"),
                ));
            }
        }
        if let Some(missing) = schema.required.iter().find(|name| !map.contains_key(*name)) {
            return Ok(self.fail(
                Keyword::Required,
                format!("missing required property '{missing}'"),
            ));
        }
        for (name, property) in &schema.properties {
            if let Some(child) = map.get(name) {
                if let invalid @ Verdict::Invalid(_) = self.descend(name.as_str(), property, child)? {
                    return Ok(invalid);
                }
            }
        }
        Ok(Verdict::Valid)
    }

    fn check_array(&mut self, schema: &'s ArraySchema, items: &[Value]) -> Result<Verdict, SchemaError> {
        let count = items.len() as u64;
        if count < schema.min_items {
            return Ok(self.fail(
                Keyword::MinItems,
                format!("{count} items, fewer than {}", schema.min_items),
            ));
        }
        if let Some(max) = bounded(schema.max_items) {
            if count > max {
                return Ok(self.fail(
                    Keyword::MaxItems,
                    format!("{count} items, more than {max}"),
                ));
            }
        }
        if schema.unique_items {
            if let Some((first, second)) = find_duplicate(items) {
                return Ok(self.fail(
                    Keyword::UniqueItems,
                    format!("items {first} and {second} are equal"),
                ));
            }
        }

        match &schema.items {
            None => {}
            Some(Items::Uniform(each)) => {
                for (i, item) in items.iter().enumerate() {
                    if let invalid @ Verdict::Invalid(_) = self.descend(i, each, item)? {
                        return Ok(invalid);
                    }
                }
            }
            Some(Items::Positional(positional)) => {
                for (i, (item, node)) in items.iter().zip(positional).enumerate() {
                    if let invalid @ Verdict::Invalid(_) = self.descend(i, node, item)? {
                        return Ok(invalid);
                    }
                }
                let extra = items.len().saturating_sub(positional.len());
                match &schema.additional_items {
                    None => {}
                    Some(AdditionalItems::Forbidden) if extra > 0 => {
                        return Ok(self.fail(
                            Keyword::AdditionalItems,
                            format!(
                                "{extra} items beyond the {} positional schemas are not allowed",
                                positional.len()
                            ),
                        ));
                    }
                    Some(AdditionalItems::Forbidden) => {}
                    Some(AdditionalItems::Schema(node)) => {
                        for (i, item) in items.iter().enumerate().skip(positional.len()) {
                            if let invalid @ Verdict::Invalid(_) = self.descend(i, node, item)? {
                                return Ok(invalid);
                            }
                        }
                    }
                }
            }
        }

        if let Some(node) = &schema.contains {
            let mut found = false;
            for (i, item) in items.iter().enumerate() {
                if self.descend(i, node, item)?.is_valid() {
                    found = true;
                    break;
                }
            }
            if !found {
                return Ok(self.fail(Keyword::Contains, "no item matches the contains schema"));
            }
        }
        Ok(Verdict::Valid)
    }
}

/// `maxLength`/`maxItems`/`maxProperties` of zero mean unbounded.
fn bounded(limit: Option<u64>) -> Option<u64> {
    limit.filter(|&max| max > 0)
}

/// First pair of structurally equal items, by index.
///
/// Canonical bytes bucket the candidates; `equal` confirms each match.
fn find_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    let mut seen: HashMap<CanonicalBytes, Vec<usize>> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        let Ok(key) = CanonicalBytes::new(item) else {
            return find_duplicate_pairwise(items);
        };
        let bucket = seen.entry(key).or_default();
        if let Some(&j) = bucket.iter().find(|&&j| equal(&items[j], item)) {
            return Some((j, i));
        }
        bucket.push(i);
    }
    None
}

fn find_duplicate_pairwise(items: &[Value]) -> Option<(usize, usize)> {
    (0..items.len()).find_map(|i| {
        (0..i)
            .find(|&j| equal(&items[j], &items[i]))
            .map(|j| (j, i))
    })
}

const PREVIEW_LIMIT: usize = 64;

fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= PREVIEW_LIMIT {
        return text;
    }
    let truncated: String = text.chars().take(PREVIEW_LIMIT).collect();
    format!("{truncated}...")
}

fn preview_str(text: &str) -> String {
    preview(&Value::String(text.to_string()))
}

fn preview_list(values: &[Value]) -> String {
    preview(&Value::Array(values.to_vec()))
}
