//! # Schema Decoder
//!
//! Builds a [`Schema`] graph from a JSON or YAML schema document using the
//! draft-06 keyword spellings (`minLength`, `exclusiveMaximum`, `$ref`,
//! `definitions`, ...).
//!
//! ## Variant Selection
//!
//! - A `$ref` makes a [`Reference`], whatever else the object holds.
//! - Otherwise `type` selects the variant. A one-element type array is
//!   accepted; longer type arrays are rejected.
//! - Without `type` or `$ref`, the variant is inferred from the keywords
//!   present: `{"properties": ...}` decodes as an untyped object node,
//!   which constrains objects and passes everything else, exactly as the
//!   untyped document would. Keywords from two variant families at once
//!   cannot be represented and are an error. No variant keywords at all
//!   gives [`Schema::Any`].
//! - `true` decodes to a node accepting everything, `false` to one
//!   rejecting everything.
//!
//! ## Strictness
//!
//! Keywords the node model cannot represent (`additionalProperties`,
//! `patternProperties`, `dependencies`, `propertyNames`, `format`, unknown
//! keys, or variant keywords under the wrong `type`) are rejected with
//! [`DecodeError::UnsupportedKeyword`]. With [`DecodeOptions::lenient`]
//! they are dropped and logged at `warn` instead. A lenient decode can
//! therefore accept instances the document would reject.
//!
//! `$schema`, `$id`, `id` and `$comment` are accepted and discarded.
//! Keywords beside `$ref`, `type` included, are ignored with a warning as
//! draft-06 prescribes, in strict mode too. The one exception is
//! `definitions`, which stays in scope for the reference.

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use shape_core::{number, InstanceKind};
use thiserror::Error;
use tracing::warn;

use crate::model::{
    AdditionalItems, AnySchema, ArraySchema, BooleanSchema, Definitions, Generic, GenericKeywords,
    IntegerSchema, Items, NullSchema, NumberSchema, NumericBounds, ObjectSchema, Properties,
    Reference, Schema, SchemaKind, StringSchema,
};

/// Decoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Drop unsupported keywords with a warning instead of failing.
    pub lenient: bool,
}

/// A schema document could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The text is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The YAML document uses values JSON cannot represent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    YamlConversion(String),

    /// A schema position holds something other than an object or boolean.
    #[error("schema at '{location}' must be an object or boolean, found {found}")]
    NotASchema {
        /// Location within the schema document.
        location: String,
        /// Kind of the value found there.
        found: InstanceKind,
    },

    /// A keyword's value has the wrong shape.
    #[error("keyword '{keyword}' at '{location}': {reason}")]
    InvalidKeyword {
        /// Location of the schema object within the document.
        location: String,
        /// The offending keyword.
        keyword: String,
        /// What was expected.
        reason: String,
    },

    /// `type` names no known variant.
    #[error("unknown type '{type_name}' at '{location}'")]
    UnknownType {
        /// Location of the schema object within the document.
        location: String,
        /// The declared type.
        type_name: String,
    },

    /// The keyword cannot be represented by the node model.
    #[error("unsupported keyword '{keyword}' at '{location}'")]
    UnsupportedKeyword {
        /// Location of the schema object within the document.
        location: String,
        /// The unsupported keyword.
        keyword: String,
    },

    /// Untyped schema mixing keywords of several variants.
    #[error("schema at '{location}' mixes keywords for {first} and {second} without a 'type'")]
    MixedKeywords {
        /// Location of the schema object within the document.
        location: String,
        first: SchemaKind,
        second: SchemaKind,
    },
}

/// Keywords accepted and discarded.
const METADATA: &[&str] = &["$schema", "$id", "id", "$comment"];
/// Keywords every variant accepts.
const GENERIC: &[&str] = &[
    "title",
    "description",
    "default",
    "examples",
    "enum",
    "const",
    "type",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "definitions",
];
const STRING: &[&str] = &["minLength", "maxLength", "pattern"];
const NUMERIC: &[&str] = &[
    "multipleOf",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
];
const OBJECT: &[&str] = &["minProperties", "maxProperties", "required", "properties"];
const ARRAY: &[&str] = &[
    "items",
    "additionalItems",
    "minItems",
    "maxItems",
    "uniqueItems",
    "contains",
];

/// Decode a parsed JSON schema document.
///
/// # Errors
///
/// Returns a [`DecodeError`] naming the first offending location.
pub fn from_json(document: &Value, options: &DecodeOptions) -> Result<Schema, DecodeError> {
    Decoder { options }.decode(document, "#")
}

/// Parse and decode JSON schema text.
pub fn from_json_str(text: &str, options: &DecodeOptions) -> Result<Schema, DecodeError> {
    let document: Value = serde_json::from_str(text)?;
    from_json(&document, options)
}

/// Parse and decode YAML schema text.
pub fn from_yaml_str(text: &str, options: &DecodeOptions) -> Result<Schema, DecodeError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    let document = crate::loader::json_from_yaml(&yaml).map_err(DecodeError::YamlConversion)?;
    from_json(&document, options)
}

struct Decoder<'o> {
    options: &'o DecodeOptions,
}

impl Decoder<'_> {
    fn decode(&self, value: &Value, location: &str) -> Result<Schema, DecodeError> {
        match value {
            Value::Bool(true) => Ok(Schema::any()),
            Value::Bool(false) => Ok(Schema::nothing()),
            Value::Object(map) => self.decode_object(map, location),
            other => Err(DecodeError::NotASchema {
                location: location.to_string(),
                found: InstanceKind::of(other),
            }),
        }
    }

    fn decode_object(&self, map: &Map<String, Value>, location: &str) -> Result<Schema, DecodeError> {
        if let Some(pointer) = map.get("$ref") {
            return self.decode_reference(map, pointer, location);
        }
        let declared = self.declared_kind(map, location)?;

        let kind = match declared {
            Some(kind) => kind,
            None => self.inferred_kind(map, location)?,
        };
        self.check_keys(map, kind, location)?;

        let mut generic = self.decode_generic(map, location)?;
        if declared.is_none() {
            generic.type_name = None;
        } else {
            generic.type_name = Some(kind.as_str().to_string());
        }

        let schema = match kind {
            SchemaKind::String => {
                let mut node = StringSchema::new();
                node.generic = generic;
                node.min_length = self.count(map, "minLength", location)?.unwrap_or(0);
                node.max_length = self.count(map, "maxLength", location)?;
                node.pattern = self.string(map, "pattern", location)?;
                Schema::String(node)
            }
            SchemaKind::Integer => {
                let mut node = IntegerSchema::new();
                node.generic = generic;
                node.bounds = self.decode_bounds(map, location)?;
                Schema::Integer(node)
            }
            SchemaKind::Number => {
                let mut node = NumberSchema::new();
                node.generic = generic;
                node.bounds = self.decode_bounds(map, location)?;
                Schema::Number(node)
            }
            SchemaKind::Object => {
                let mut node = ObjectSchema::new();
                node.generic = generic;
                node.min_properties = self.count(map, "minProperties", location)?.unwrap_or(0);
                node.max_properties = self.count(map, "maxProperties", location)?;
                node.required = self.string_list(map, "required", location)?;
                node.properties = self.schema_table(map, "properties", location)?;
                Schema::Object(node)
            }
            SchemaKind::Array => Schema::Array(self.decode_array(map, generic, location)?),
            SchemaKind::Boolean => {
                let mut node = BooleanSchema::new();
                node.generic = generic;
                Schema::Boolean(node)
            }
            SchemaKind::Null => {
                let mut node = NullSchema::new();
                node.generic = generic;
                Schema::Null(node)
            }
            SchemaKind::Any | SchemaKind::Reference => Schema::Any(AnySchema { generic }),
        };
        Ok(schema)
    }

    fn declared_kind(
        &self,
        map: &Map<String, Value>,
        location: &str,
    ) -> Result<Option<SchemaKind>, DecodeError> {
        let name = match map.get("type") {
            None => return Ok(None),
            Some(Value::String(name)) => name.as_str(),
            Some(Value::Array(names)) => match names.as_slice() {
                [Value::String(name)] => name.as_str(),
                _ => {
                    return Err(self.invalid(
                        location,
                        "type",
                        "only a single type name is supported",
                    ))
                }
            },
            Some(_) => return Err(self.invalid(location, "type", "must be a string")),
        };
        let kind = match name {
            "string" => SchemaKind::String,
            "integer" => SchemaKind::Integer,
            "number" => SchemaKind::Number,
            "object" => SchemaKind::Object,
            "array" => SchemaKind::Array,
            "boolean" => SchemaKind::Boolean,
            "null" => SchemaKind::Null,
            other => {
                return Err(DecodeError::UnknownType {
                    location: location.to_string(),
                    type_name: other.to_string(),
                })
            }
        };
        Ok(Some(kind))
    }

    fn inferred_kind(&self, map: &Map<String, Value>, location: &str) -> Result<SchemaKind, DecodeError> {
        let mut found: Option<SchemaKind> = None;
        for key in map.keys() {
            let family = match family_of(key) {
                Some(family) => family,
                None => continue,
            };
            match found {
                None => found = Some(family),
                Some(first) if first != family => {
                    return Err(DecodeError::MixedKeywords {
                        location: location.to_string(),
                        first,
                        second: family,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(found.unwrap_or(SchemaKind::Any))
    }

    /// Reject (or, when lenient, drop) keys the chosen variant cannot hold.
    fn check_keys(&self, map: &Map<String, Value>, kind: SchemaKind, location: &str) -> Result<(), DecodeError> {
        for key in map.keys() {
            let key = key.as_str();
            if METADATA.contains(&key) || GENERIC.contains(&key) {
                continue;
            }
            let applies = match family_of(key) {
                Some(SchemaKind::Number) => {
                    matches!(kind, SchemaKind::Integer | SchemaKind::Number)
                }
                Some(family) => family == kind,
                None => false,
            };
            if !applies {
                self.unsupported(location, key)?;
            }
        }
        Ok(())
    }

    fn decode_reference(
        &self,
        map: &Map<String, Value>,
        pointer: &Value,
        location: &str,
    ) -> Result<Schema, DecodeError> {
        let pointer = pointer
            .as_str()
            .ok_or_else(|| self.invalid(location, "$ref", "must be a string"))?;
        let reference = Schema::Reference(Reference::new(pointer));

        for key in map.keys() {
            let key = key.as_str();
            if key != "$ref" && key != "definitions" && !METADATA.contains(&key) {
                warn!(location, keyword = key, "ignoring keyword beside $ref");
            }
        }

        let definitions = self.schema_table(map, "definitions", location)?;
        if definitions.is_empty() {
            return Ok(reference);
        }
        let mut wrapper = AnySchema::new().all_of([reference]);
        wrapper.generic.definitions = definitions;
        Ok(Schema::Any(wrapper))
    }

    fn decode_generic(&self, map: &Map<String, Value>, location: &str) -> Result<Generic, DecodeError> {
        let mut generic = Generic {
            enum_values: match map.get("enum") {
                None => None,
                Some(Value::Array(values)) => Some(values.clone()),
                Some(_) => return Err(self.invalid(location, "enum", "must be an array")),
            },
            const_value: map.get("const").cloned(),
            all_of: self.schema_list(map, "allOf", location)?,
            any_of: self.schema_list(map, "anyOf", location)?,
            one_of: self.schema_list(map, "oneOf", location)?,
            not: match map.get("not") {
                None => None,
                Some(value) => Some(Box::new(self.decode(value, &format!("{location}/not"))?)),
            },
            definitions: self.schema_table(map, "definitions", location)?,
            ..Generic::default()
        };
        generic.annotations.title = self.string(map, "title", location)?;
        generic.annotations.description = self.string(map, "description", location)?;
        generic.annotations.default = map.get("default").cloned();
        generic.annotations.examples = match map.get("examples") {
            None => Vec::new(),
            Some(Value::Array(values)) => values.clone(),
            Some(_) => return Err(self.invalid(location, "examples", "must be an array")),
        };
        Ok(generic)
    }

    fn decode_bounds(&self, map: &Map<String, Value>, location: &str) -> Result<NumericBounds, DecodeError> {
        let mut bounds = NumericBounds {
            multiple_of: self.number(map, "multipleOf", location)?,
            minimum: self.number(map, "minimum", location)?,
            maximum: self.number(map, "maximum", location)?,
            ..NumericBounds::default()
        };
        if let Some(divisor) = &bounds.multiple_of {
            if !number::is_positive(divisor) {
                return Err(self.invalid(location, "multipleOf", "must be greater than zero"));
            }
        }

        match map.get("exclusiveMinimum") {
            None => {}
            Some(Value::Bool(flag)) => bounds.exclusive_minimum = *flag,
            Some(Value::Number(limit)) => {
                let stricter = match &bounds.minimum {
                    Some(minimum) => number::compare(limit, minimum).is_ge(),
                    None => true,
                };
                if stricter {
                    bounds.minimum = Some(limit.clone());
                    bounds.exclusive_minimum = true;
                }
            }
            Some(_) => {
                return Err(self.invalid(location, "exclusiveMinimum", "must be a boolean or number"))
            }
        }
        match map.get("exclusiveMaximum") {
            None => {}
            Some(Value::Bool(flag)) => bounds.exclusive_maximum = *flag,
            Some(Value::Number(limit)) => {
                let stricter = match &bounds.maximum {
                    Some(maximum) => number::compare(limit, maximum).is_le(),
                    None => true,
                };
                if stricter {
                    bounds.maximum = Some(limit.clone());
                    bounds.exclusive_maximum = true;
                }
            }
            Some(_) => {
                return Err(self.invalid(location, "exclusiveMaximum", "must be a boolean or number"))
            }
        }
        Ok(bounds)
    }

    fn decode_array(
        &self,
        map: &Map<String, Value>,
        generic: Generic,
        location: &str,
    ) -> Result<ArraySchema, DecodeError> {
        let mut node = ArraySchema::new();
        node.generic = generic;
        node.min_items = self.count(map, "minItems", location)?.unwrap_or(0);
        node.max_items = self.count(map, "maxItems", location)?;
        node.unique_items = match map.get("uniqueItems") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(self.invalid(location, "uniqueItems", "must be a boolean")),
        };
        node.items = match map.get("items") {
            None => None,
            Some(Value::Array(_)) => Some(Items::Positional(self.schema_list(map, "items", location)?)),
            Some(value) => Some(Items::Uniform(Box::new(
                self.decode(value, &format!("{location}/items"))?,
            ))),
        };
        node.additional_items = match map.get("additionalItems") {
            None | Some(Value::Bool(true)) => None,
            Some(Value::Bool(false)) => Some(AdditionalItems::Forbidden),
            Some(value) => Some(AdditionalItems::Schema(Box::new(
                self.decode(value, &format!("{location}/additionalItems"))?,
            ))),
        };
        node.contains = match map.get("contains") {
            None => None,
            Some(value) => Some(Box::new(self.decode(value, &format!("{location}/contains"))?)),
        };
        Ok(node)
    }

    // -----------------------------------------------------------------------
    // Keyword value helpers
    // -----------------------------------------------------------------------

    fn count(&self, map: &Map<String, Value>, keyword: &str, location: &str) -> Result<Option<u64>, DecodeError> {
        match map.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) if n.as_u64().is_some() => Ok(n.as_u64()),
            Some(Value::Number(n)) if number::is_integral(n) && n.as_f64().is_some_and(|f| f >= 0.0) => {
                Ok(n.as_f64().map(|f| f as u64))
            }
            Some(_) => Err(self.invalid(location, keyword, "must be a non-negative integer")),
        }
    }

    fn number(&self, map: &Map<String, Value>, keyword: &str, location: &str) -> Result<Option<Number>, DecodeError> {
        match map.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(_) => Err(self.invalid(location, keyword, "must be a number")),
        }
    }

    fn string(&self, map: &Map<String, Value>, keyword: &str, location: &str) -> Result<Option<String>, DecodeError> {
        match map.get(keyword) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(location, keyword, "must be a string")),
        }
    }

    fn string_list(&self, map: &Map<String, Value>, keyword: &str, location: &str) -> Result<Vec<String>, DecodeError> {
        let Some(value) = map.get(keyword) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.invalid(location, keyword, "must be an array of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(location, keyword, "must be an array of strings"))
            })
            .collect()
    }

    fn schema_list(&self, map: &Map<String, Value>, keyword: &str, location: &str) -> Result<Vec<Schema>, DecodeError> {
        let Some(value) = map.get(keyword) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.invalid(location, keyword, "must be an array of schemas"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.decode(item, &format!("{location}/{keyword}/{i}")))
            .collect()
    }

    fn schema_table(&self, map: &Map<String, Value>, keyword: &str, location: &str) -> Result<Properties, DecodeError> {
        let Some(value) = map.get(keyword) else {
            return Ok(Definitions::new());
        };
        let entries = value
            .as_object()
            .ok_or_else(|| self.invalid(location, keyword, "must be an object of schemas"))?;
        entries
            .iter()
            .map(|(name, item)| {
                let child = format!("{location}/{keyword}/{}", escape_token(name));
                Ok((name.clone(), self.decode(item, &child)?))
            })
            .collect()
    }

    fn invalid(&self, location: &str, keyword: &str, reason: &str) -> DecodeError {
        DecodeError::InvalidKeyword {
            location: location.to_string(),
            keyword: keyword.to_string(),
            reason: reason.to_string(),
        }
    }

    fn unsupported(&self, location: &str, keyword: &str) -> Result<(), DecodeError> {
        if self.options.lenient {
            warn!(location, keyword, "ignoring unsupported keyword");
            Ok(())
        } else {
            Err(DecodeError::UnsupportedKeyword {
                location: location.to_string(),
                keyword: keyword.to_string(),
            })
        }
    }
}

/// The variant a kind-specific keyword belongs to. Numeric keywords report
/// [`SchemaKind::Number`].
fn family_of(keyword: &str) -> Option<SchemaKind> {
    if STRING.contains(&keyword) {
        Some(SchemaKind::String)
    } else if NUMERIC.contains(&keyword) {
        Some(SchemaKind::Number)
    } else if OBJECT.contains(&keyword) {
        Some(SchemaKind::Object)
    } else if ARRAY.contains(&keyword) {
        Some(SchemaKind::Array)
    } else {
        None
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
