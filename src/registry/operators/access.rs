//! Property and array access

use super::{eval_number, eval_string};
use crate::compiler::{CompiledExpr, compiled};
use crate::evaluator::{EvaluationError, helpers};
use crate::model::{Type, Value};
use crate::registry::{
    Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

const FEATURE_PROPERTIES: &str = "feature.properties";

/// Register `get`, `has`, `length` and `at`
pub(super) fn register_access_operators(registry: &mut OperatorRegistry) {
    let lookup_signatures = || {
        vec![
            Signature::fixed([Type::String]),
            Signature::fixed([Type::String, Type::Object]),
        ]
    };
    registry.register(OperatorDescriptor::new(
        "get",
        OperatorCategory::Access,
        ResultType::Fixed(Type::Value),
        lookup_signatures(),
        lower_get,
    ));
    registry.register(OperatorDescriptor::new(
        "has",
        OperatorCategory::Access,
        ResultType::Fixed(Type::Boolean),
        lookup_signatures(),
        lower_has,
    ));
    registry.register(OperatorDescriptor::new(
        "length",
        OperatorCategory::Access,
        ResultType::Fixed(Type::Number),
        vec![
            Signature::fixed([Type::any_array()]),
            Signature::fixed([Type::String]),
        ],
        lower_length,
    ));
    registry.register(OperatorDescriptor::new(
        "at",
        OperatorCategory::Access,
        ResultType::FromArgs(item_type_of_second),
        vec![Signature::fixed([Type::Number, Type::any_array()])],
        lower_at,
    ));
}

fn item_type_of_second(arg_types: &[Type]) -> Type {
    arg_types
        .get(1)
        .and_then(Type::item_type)
        .cloned()
        .unwrap_or(Type::Value)
}

/// One argument reads the feature's properties, two read the given object
fn lower_get(lowering: Lowering) -> CompiledExpr {
    let property = lowering.arg(0);
    let object = lowering.args.get(1).cloned();
    let key = lowering.key;
    compiled(move |ctx| {
        let name = eval_string(&property, ctx)?;
        match &object {
            None => helpers::lookup(
                &ctx.feature.properties,
                &name,
                Some(FEATURE_PROPERTIES),
                &key,
            ),
            Some(object) => match object(ctx)? {
                Value::Object(map) => helpers::lookup(&map, &name, None, &key),
                _ => Ok(Value::Null),
            },
        }
    })
}

fn lower_has(lowering: Lowering) -> CompiledExpr {
    let property = lowering.arg(0);
    let object = lowering.args.get(1).cloned();
    compiled(move |ctx| {
        let name = eval_string(&property, ctx)?;
        let found = match &object {
            None => helpers::contains(&ctx.feature.properties, &name),
            Some(object) => match object(ctx)? {
                Value::Object(map) => helpers::contains(&map, &name),
                _ => false,
            },
        };
        Ok(Value::Boolean(found))
    })
}

/// Item count of an array, or character count of a string
fn lower_length(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    if lowering.arg_types.first() == Some(&Type::String) {
        return compiled(move |ctx| {
            let length = match arg(ctx)? {
                Value::String(s) => s.chars().count() as f64,
                _ => f64::NAN,
            };
            Ok(Value::Number(length))
        });
    }
    compiled(move |ctx| {
        let length = match arg(ctx)? {
            Value::Array(items) => items.len() as f64,
            _ => f64::NAN,
        };
        Ok(Value::Number(length))
    })
}

fn lower_at(lowering: Lowering) -> CompiledExpr {
    let (index, array) = (lowering.arg(0), lowering.arg(1));
    let key = lowering.key;
    compiled(move |ctx| {
        let i = eval_number(&index, ctx)?;
        let items = match array(ctx)? {
            Value::Array(items) => items,
            _ => return Ok(Value::Null),
        };
        if i < 0.0 || i.fract() != 0.0 || i >= items.len() as f64 {
            return Err(EvaluationError::IndexOutOfBounds {
                key: key.clone(),
                index: i,
                length: items.len(),
            });
        }
        Ok(items[i as usize].clone())
    })
}

#[cfg(test)]
mod tests {
    use crate::evaluator::EvaluationError;
    use crate::model::Value;
    use crate::test_utils::{check_errors, eval, eval_with};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn props() -> serde_json::Value {
        json!({"name": "Elm", "rank": 3, "tags": ["a", "b"], "meta": {"lit": true}})
    }

    #[rstest]
    #[case(json!(["get", "name"]), Value::string("Elm"))]
    #[case(json!(["get", "lit", ["object", ["get", "meta"]]]), Value::Boolean(true))]
    #[case(json!(["get", "nope", ["object", ["get", "meta"]]]), Value::Null)]
    #[case(json!(["has", "rank"]), Value::Boolean(true))]
    #[case(json!(["has", "nope"]), Value::Boolean(false))]
    #[case(json!(["has", "lit", ["object", ["get", "meta"]]]), Value::Boolean(true))]
    #[case(json!(["length", ["array", ["get", "tags"]]]), Value::Number(2.0))]
    #[case(json!(["length", "héllo"]), Value::Number(5.0))]
    #[case(json!(["at", 1, ["array", ["get", "tags"]]]), Value::string("b"))]
    fn test_access(#[case] expr: serde_json::Value, #[case] expected: Value) {
        assert_eq!(eval_with(&expr, props()), Ok(expected));
    }

    #[test]
    fn test_missing_feature_property() {
        assert_eq!(
            eval_with(&json!(["get", "nope"]), props()),
            Err(EvaluationError::PropertyNotFound {
                key: String::new(),
                property: "nope".to_string(),
                context: "feature.properties".to_string(),
            })
        );
    }

    #[rstest]
    #[case(json!(["at", 2, ["literal", [1, 2]]]), 2.0)]
    #[case(json!(["at", -1, ["literal", [1, 2]]]), -1.0)]
    #[case(json!(["at", 0.5, ["literal", [1, 2]]]), 0.5)]
    fn test_at_out_of_bounds(#[case] expr: serde_json::Value, #[case] index: f64) {
        assert_eq!(
            eval(&expr),
            Err(EvaluationError::IndexOutOfBounds {
                key: String::new(),
                index,
                length: 2,
            })
        );
    }

    #[test]
    fn test_at_result_type_follows_items() {
        // `at` over a number array yields a number, so it can feed `+` directly.
        assert_eq!(
            eval(&json!(["+", ["at", 0, ["literal", [4, 5]]], 1])),
            Ok(Value::Number(5.0))
        );
        assert_eq!(check_errors(&json!(["+", ["at", 0, ["literal", ["a"]]], 1])).len(), 1);
    }
}
