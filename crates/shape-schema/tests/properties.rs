//! Integration test: algebraic properties of the validation engine.
//!
//! Combinators must agree with the boolean logic they name, references
//! must be indistinguishable from inlining, and the verdict must depend
//! only on the schema and the instance.

use proptest::prelude::*;
use serde_json::{json, Value};
use shape_schema::model::{
    AnySchema, ArraySchema, GenericKeywords, IntegerSchema, NumberSchema, NumericKeywords,
    ObjectSchema, StringSchema,
};
use shape_schema::{validate, Schema};

fn instance() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(|n| json!(n)),
        "[a-c]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Constrained nodes of every variant, so that most instances land on
/// both sides of some schema.
fn leaf_schema() -> impl Strategy<Value = Schema> {
    let scalars = prop_oneof![
        (0u64..5).prop_map(|n| Schema::from(StringSchema::new().max_length(n))),
        (0u64..5).prop_map(|n| Schema::from(StringSchema::new().min_length(n))),
        Just(Schema::from(StringSchema::new().pattern("^a"))),
        (-20i64..20).prop_map(|n| Schema::from(IntegerSchema::new().minimum(n))),
        (-20i64..20).prop_map(|n| Schema::from(IntegerSchema::new().maximum(n))),
        (1u64..5).prop_map(|n| Schema::from(NumberSchema::new().multiple_of(n))),
    ];
    let others = prop_oneof![
        (0u64..3).prop_map(|n| Schema::from(ArraySchema::new().max_items(n))),
        Just(Schema::from(ArraySchema::new().unique_items(true))),
        Just(Schema::from(ObjectSchema::new().required(["a"]))),
        Just(Schema::from(
            AnySchema::new().enum_values([json!(null), json!(1), json!("a")])
        )),
        Just(Schema::from(AnySchema::new().const_value(json!(true)))),
        Just(Schema::any()),
        Just(Schema::nothing()),
    ];
    prop_oneof![scalars, others]
}

fn schema() -> impl Strategy<Value = Schema> {
    leaf_schema().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|b| Schema::from(AnySchema::new().all_of(b))),
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|b| Schema::from(AnySchema::new().any_of(b))),
            inner.clone().prop_map(|s| Schema::from(AnySchema::new().not(s))),
            inner.clone().prop_map(|s| Schema::from(ArraySchema::new().items(s))),
            inner.prop_map(|s| Schema::from(ObjectSchema::new().property("a", s))),
        ]
    })
}

fn accepts(schema: &Schema, instance: &Value) -> bool {
    validate(schema, instance)
        .expect("generated schemas are well formed")
        .is_valid()
}

proptest! {
    /// The same schema and instance always produce the same verdict.
    #[test]
    fn verdict_is_deterministic(node in schema(), value in instance()) {
        prop_assert_eq!(validate(&node, &value), validate(&node, &value));
    }

    /// allOf accepts exactly when every branch does, in any order.
    #[test]
    fn all_of_is_conjunction(
        branches in prop::collection::vec(schema(), 1..4),
        value in instance(),
    ) {
        let expected = branches.iter().all(|b| accepts(b, &value));
        let mut reversed = branches.clone();
        reversed.reverse();
        let forward: Schema = AnySchema::new().all_of(branches).into();
        let backward: Schema = AnySchema::new().all_of(reversed).into();
        prop_assert_eq!(accepts(&forward, &value), expected);
        prop_assert_eq!(accepts(&backward, &value), expected);
    }

    /// anyOf accepts exactly when some branch does.
    #[test]
    fn any_of_is_disjunction(
        branches in prop::collection::vec(schema(), 1..4),
        value in instance(),
    ) {
        let expected = branches.iter().any(|b| accepts(b, &value));
        let combined: Schema = AnySchema::new().any_of(branches).into();
        prop_assert_eq!(accepts(&combined, &value), expected);
    }

    /// oneOf accepts exactly when a single branch does.
    #[test]
    fn one_of_is_exclusive(
        branches in prop::collection::vec(schema(), 1..4),
        value in instance(),
    ) {
        let matched = branches.iter().filter(|b| accepts(b, &value)).count();
        let combined: Schema = AnySchema::new().one_of(branches).into();
        prop_assert_eq!(accepts(&combined, &value), matched == 1);
    }

    /// A schema and its negation are always exactly one match apart.
    #[test]
    fn one_of_schema_and_negation_always_accepts(node in schema(), value in instance()) {
        let either: Schema = AnySchema::new()
            .one_of([node.clone(), AnySchema::new().not(node).into()])
            .into();
        prop_assert!(accepts(&either, &value));
    }

    /// Double negation restores the original decision.
    #[test]
    fn double_negation(node in schema(), value in instance()) {
        let twice: Schema = AnySchema::new().not(AnySchema::new().not(node.clone())).into();
        prop_assert_eq!(accepts(&twice, &value), accepts(&node, &value));
    }

    /// Moving a sub-schema into definitions and referring to it changes
    /// nothing, trail included.
    #[test]
    fn reference_matches_inlining(node in schema(), value in instance()) {
        let inlined: Schema = AnySchema::new().all_of([node.clone()]).into();
        let referenced: Schema = AnySchema::new()
            .definition("target", node)
            .all_of([Schema::reference("#/definitions/target")])
            .into();
        prop_assert_eq!(validate(&referenced, &value), validate(&inlined, &value));
    }
}
