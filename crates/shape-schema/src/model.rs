//! # Node Model
//!
//! The closed set of schema node variants. Nodes are pure data: building
//! one never validates it, so contradictory keywords (`minLength: 5`,
//! `maxLength: 2`) are representable and simply reject every string.
//!
//! ## Construction
//!
//! Each variant has a `new()` constructor that stamps its declared `type`
//! tag (`"string"`, `"integer"`, ...) and a set of consuming builder
//! methods applied in call order:
//!
//! ```
//! use shape_schema::model::{GenericKeywords, ObjectSchema, StringSchema};
//!
//! let person = ObjectSchema::new()
//!     .required(["firstName"])
//!     .property("firstName", StringSchema::new().max_length(20))
//!     .title("Person");
//! assert_eq!(person.generic.type_name.as_deref(), Some("object"));
//! ```
//!
//! Generic keywords (`enum`, `const`, `allOf`, `anyOf`, `oneOf`, `not`,
//! `definitions`, annotations) come from the [`GenericKeywords`] trait,
//! shared by every variant except [`Reference`], which carries nothing
//! but its pointer.
//!
//! ## Unsupported keywords
//!
//! `patternProperties`, `additionalProperties`, `dependencies` and
//! `propertyNames` have no representation here. Object nodes are open:
//! keys not named in `properties` are unconstrained. The decoder rejects
//! schemas that use these keywords unless told to ignore them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

/// Property name → sub-schema.
pub type Properties = BTreeMap<String, Schema>;

/// Definition name → sub-schema; the target table for references.
pub type Definitions = BTreeMap<String, Schema>;

/// Inert metadata carried by every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub examples: Vec<Value>,
}

/// Keywords that apply to an instance of any kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generic {
    /// Permitted literal values (`enum`).
    pub enum_values: Option<Vec<Value>>,
    /// Single permitted literal value (`const`).
    pub const_value: Option<Value>,
    /// Declared kind name. Informational only.
    pub type_name: Option<String>,
    pub all_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub one_of: Vec<Schema>,
    pub not: Option<Box<Schema>>,
    pub definitions: Definitions,
    pub annotations: Annotations,
}

impl Generic {
    fn typed(type_name: &str) -> Self {
        Self {
            type_name: Some(type_name.to_string()),
            ..Self::default()
        }
    }
}

/// Bounds shared by the `integer` and `number` variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericBounds {
    /// Constrains only when strictly positive.
    pub multiple_of: Option<Number>,
    pub minimum: Option<Number>,
    /// Makes `minimum` a strict bound.
    pub exclusive_minimum: bool,
    pub maximum: Option<Number>,
    /// Makes `maximum` a strict bound.
    pub exclusive_maximum: bool,
}

/// A node with generic keywords only, e.g. a bare `{"anyOf": [...]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnySchema {
    pub generic: Generic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringSchema {
    pub generic: Generic,
    /// Minimum length in Unicode scalar values.
    pub min_length: u64,
    /// Maximum length in Unicode scalar values; `None` or `Some(0)` is unbounded.
    pub max_length: Option<u64>,
    /// Regular expression the string must contain a match of.
    pub pattern: Option<String>,
}

/// Matches numbers with no fractional part.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerSchema {
    pub generic: Generic,
    pub bounds: NumericBounds,
}

/// Matches every number.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSchema {
    pub generic: Generic,
    pub bounds: NumericBounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub generic: Generic,
    pub min_properties: u64,
    /// `None` or `Some(0)` is unbounded.
    pub max_properties: Option<u64>,
    pub required: Vec<String>,
    pub properties: Properties,
}

/// The `items` keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema applied to every element.
    Uniform(Box<Schema>),
    /// `items[i]` applied to element `i`.
    Positional(Vec<Schema>),
}

/// The `additionalItems` keyword, consulted only for positional `items`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalItems {
    /// No elements beyond the positional list are allowed.
    Forbidden,
    /// Elements beyond the positional list must match this schema.
    Schema(Box<Schema>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub generic: Generic,
    pub items: Option<Items>,
    pub additional_items: Option<AdditionalItems>,
    pub min_items: u64,
    /// `None` or `Some(0)` is unbounded.
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub contains: Option<Box<Schema>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanSchema {
    pub generic: Generic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullSchema {
    pub generic: Generic,
}

/// A pointer to another node, resolved through a definitions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub pointer: String,
}

/// One node of a schema graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Any(AnySchema),
    String(StringSchema),
    Integer(IntegerSchema),
    Number(NumberSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Boolean(BooleanSchema),
    Null(NullSchema),
    Reference(Reference),
}

/// Variant tag of a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Any,
    String,
    Integer,
    Number,
    Object,
    Array,
    Boolean,
    Null,
    Reference,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Object => "object",
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Schema {
    /// A node that accepts every instance.
    pub fn any() -> Self {
        Self::Any(AnySchema::new())
    }

    /// A node that rejects every instance.
    pub fn nothing() -> Self {
        Self::Any(AnySchema::new().not(Schema::any()))
    }

    /// A reference node.
    pub fn reference(pointer: impl Into<String>) -> Self {
        Self::Reference(Reference::new(pointer))
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Any(_) => SchemaKind::Any,
            Self::String(_) => SchemaKind::String,
            Self::Integer(_) => SchemaKind::Integer,
            Self::Number(_) => SchemaKind::Number,
            Self::Object(_) => SchemaKind::Object,
            Self::Array(_) => SchemaKind::Array,
            Self::Boolean(_) => SchemaKind::Boolean,
            Self::Null(_) => SchemaKind::Null,
            Self::Reference(_) => SchemaKind::Reference,
        }
    }

    /// Generic keywords, absent only for references.
    pub fn generic(&self) -> Option<&Generic> {
        match self {
            Self::Any(s) => Some(&s.generic),
            Self::String(s) => Some(&s.generic),
            Self::Integer(s) => Some(&s.generic),
            Self::Number(s) => Some(&s.generic),
            Self::Object(s) => Some(&s.generic),
            Self::Array(s) => Some(&s.generic),
            Self::Boolean(s) => Some(&s.generic),
            Self::Null(s) => Some(&s.generic),
            Self::Reference(_) => None,
        }
    }

    /// The declared `type` tag, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.generic().and_then(|g| g.type_name.as_deref())
    }

    /// The definitions table declared on this node.
    pub fn definitions(&self) -> Option<&Definitions> {
        self.generic()
            .map(|g| &g.definitions)
            .filter(|d| !d.is_empty())
    }
}

/// Builder methods for the keywords every non-reference node carries.
pub trait GenericKeywords: Sized {
    fn generic_mut(&mut self) -> &mut Generic;

    /// Apply a field-setting closure, for options that have no builder method.
    fn with(mut self, option: impl FnOnce(&mut Self)) -> Self {
        option(&mut self);
        self
    }

    fn title(mut self, title: impl Into<String>) -> Self {
        self.generic_mut().annotations.title = Some(title.into());
        self
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.generic_mut().annotations.description = Some(description.into());
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.generic_mut().annotations.default = Some(value);
        self
    }

    fn example(mut self, value: Value) -> Self {
        self.generic_mut().annotations.examples.push(value);
        self
    }

    fn enum_values<I: IntoIterator<Item = Value>>(mut self, values: I) -> Self {
        self.generic_mut().enum_values = Some(values.into_iter().collect());
        self
    }

    fn const_value(mut self, value: Value) -> Self {
        self.generic_mut().const_value = Some(value);
        self
    }

    fn all_of<I: IntoIterator<Item = Schema>>(mut self, branches: I) -> Self {
        self.generic_mut().all_of.extend(branches);
        self
    }

    fn any_of<I: IntoIterator<Item = Schema>>(mut self, branches: I) -> Self {
        self.generic_mut().any_of.extend(branches);
        self
    }

    fn one_of<I: IntoIterator<Item = Schema>>(mut self, branches: I) -> Self {
        self.generic_mut().one_of.extend(branches);
        self
    }

    fn not(mut self, schema: impl Into<Schema>) -> Self {
        self.generic_mut().not = Some(Box::new(schema.into()));
        self
    }

    fn definition(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.generic_mut()
            .definitions
            .insert(name.into(), schema.into());
        self
    }
}

/// Builder methods for `integer` and `number` nodes.
pub trait NumericKeywords: GenericKeywords {
    fn bounds_mut(&mut self) -> &mut NumericBounds;

    fn multiple_of(mut self, divisor: impl Into<Number>) -> Self {
        self.bounds_mut().multiple_of = Some(divisor.into());
        self
    }

    fn minimum(mut self, minimum: impl Into<Number>) -> Self {
        self.bounds_mut().minimum = Some(minimum.into());
        self
    }

    fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.bounds_mut().exclusive_minimum = exclusive;
        self
    }

    fn maximum(mut self, maximum: impl Into<Number>) -> Self {
        self.bounds_mut().maximum = Some(maximum.into());
        self
    }

    fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.bounds_mut().exclusive_maximum = exclusive;
        self
    }
}

macro_rules! node {
    ($ty:ident => $variant:ident) => {
        impl GenericKeywords for $ty {
            fn generic_mut(&mut self) -> &mut Generic {
                &mut self.generic
            }
        }

        impl From<$ty> for Schema {
            fn from(node: $ty) -> Self {
                Schema::$variant(node)
            }
        }
    };
}

node!(AnySchema => Any);
node!(StringSchema => String);
node!(IntegerSchema => Integer);
node!(NumberSchema => Number);
node!(ObjectSchema => Object);
node!(ArraySchema => Array);
node!(BooleanSchema => Boolean);
node!(NullSchema => Null);

impl From<Reference> for Schema {
    fn from(node: Reference) -> Self {
        Schema::Reference(node)
    }
}

impl NumericKeywords for IntegerSchema {
    fn bounds_mut(&mut self) -> &mut NumericBounds {
        &mut self.bounds
    }
}

impl NumericKeywords for NumberSchema {
    fn bounds_mut(&mut self) -> &mut NumericBounds {
        &mut self.bounds
    }
}

impl AnySchema {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("string"),
            min_length: 0,
            max_length: None,
            pattern: None,
        }
    }

    pub fn min_length(mut self, min: u64) -> Self {
        self.min_length = min;
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("integer"),
            bounds: NumericBounds::default(),
        }
    }
}

impl Default for IntegerSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberSchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("number"),
            bounds: NumericBounds::default(),
        }
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("object"),
            min_properties: 0,
            max_properties: None,
            required: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn min_properties(mut self, min: u64) -> Self {
        self.min_properties = min;
        self
    }

    pub fn max_properties(mut self, max: u64) -> Self {
        self.max_properties = Some(max);
        self
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn property(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ArraySchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("array"),
            items: None,
            additional_items: None,
            min_items: 0,
            max_items: None,
            unique_items: false,
            contains: None,
        }
    }

    /// Apply one schema to every element.
    pub fn items(mut self, schema: impl Into<Schema>) -> Self {
        self.items = Some(Items::Uniform(Box::new(schema.into())));
        self
    }

    /// Apply schemas by position.
    pub fn positional_items<I: IntoIterator<Item = Schema>>(mut self, schemas: I) -> Self {
        self.items = Some(Items::Positional(schemas.into_iter().collect()));
        self
    }

    pub fn additional_items(mut self, schema: impl Into<Schema>) -> Self {
        self.additional_items = Some(AdditionalItems::Schema(Box::new(schema.into())));
        self
    }

    pub fn no_additional_items(mut self) -> Self {
        self.additional_items = Some(AdditionalItems::Forbidden);
        self
    }

    pub fn min_items(mut self, min: u64) -> Self {
        self.min_items = min;
        self
    }

    pub fn max_items(mut self, max: u64) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = unique;
        self
    }

    pub fn contains(mut self, schema: impl Into<Schema>) -> Self {
        self.contains = Some(Box::new(schema.into()));
        self
    }
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("boolean"),
        }
    }
}

impl Default for BooleanSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl NullSchema {
    pub fn new() -> Self {
        Self {
            generic: Generic::typed("null"),
        }
    }
}

impl Default for NullSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl Reference {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
        }
    }

    /// A same-document reference to `#/definitions/<name>`, escaping the
    /// name as a JSON Pointer token.
    pub fn to_definition(name: &str) -> Self {
        Self::new(format!(
            "#/definitions/{}",
            name.replace('~', "~0").replace('/', "~1")
        ))
    }
}
