//! Comparison operators
//!
//! Both operands must share one of the basic types `number`, `string`,
//! `boolean` or `null`. Equality is strict: no operand is coerced.

use std::cmp::Ordering;

use crate::compiler::{CompiledExpr, compiled};
use crate::model::{Type, Value};
use crate::registry::{
    LowerFn, Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register comparison operators
pub(super) fn register_comparison_operators(registry: &mut OperatorRegistry) {
    let comparison = |name: &'static str, lower: LowerFn| {
        OperatorDescriptor::new(
            name,
            OperatorCategory::Comparison,
            ResultType::Fixed(Type::Boolean),
            vec![
                Signature::fixed([Type::Number, Type::Number]),
                Signature::fixed([Type::String, Type::String]),
                Signature::fixed([Type::Boolean, Type::Boolean]),
                Signature::fixed([Type::Null, Type::Null]),
            ],
            lower,
        )
    };
    registry.register(comparison("==", lower_equal));
    registry.register(comparison("!=", lower_not_equal));
    registry.register(comparison(">", lower_greater));
    registry.register(comparison("<", lower_less));
    registry.register(comparison(">=", lower_greater_or_equal));
    registry.register(comparison("<=", lower_less_or_equal));
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn lower_with(lowering: Lowering, test: fn(&Value, &Value) -> bool) -> CompiledExpr {
    let (lhs, rhs) = (lowering.arg(0), lowering.arg(1));
    compiled(move |ctx| {
        let a = lhs(ctx)?;
        let b = rhs(ctx)?;
        Ok(Value::Boolean(test(&a, &b)))
    })
}

fn lower_equal(l: Lowering) -> CompiledExpr {
    lower_with(l, |a, b| a == b)
}

fn lower_not_equal(l: Lowering) -> CompiledExpr {
    lower_with(l, |a, b| a != b)
}

fn lower_greater(l: Lowering) -> CompiledExpr {
    lower_with(l, |a, b| compare(a, b) == Some(Ordering::Greater))
}

fn lower_less(l: Lowering) -> CompiledExpr {
    lower_with(l, |a, b| compare(a, b) == Some(Ordering::Less))
}

fn lower_greater_or_equal(l: Lowering) -> CompiledExpr {
    lower_with(l, |a, b| {
        matches!(compare(a, b), Some(Ordering::Greater | Ordering::Equal))
    })
}

fn lower_less_or_equal(l: Lowering) -> CompiledExpr {
    lower_with(l, |a, b| {
        matches!(compare(a, b), Some(Ordering::Less | Ordering::Equal))
    })
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::test_utils::{check_errors, eval};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(["==", 1, 1]), true)]
    #[case(json!(["==", "a", "b"]), false)]
    #[case(json!(["!=", true, false]), true)]
    #[case(json!(["==", null, null]), true)]
    #[case(json!([">", 2, 1]), true)]
    #[case(json!(["<", "abc", "abd"]), true)]
    #[case(json!([">=", 3, 3]), true)]
    #[case(json!(["<=", true, false]), false)]
    #[case(json!([">", ["/", 0, 0], 1]), false)]
    #[case(json!(["==", ["/", 0, 0], ["/", 0, 0]]), false)]
    fn test_comparisons(#[case] expr: serde_json::Value, #[case] expected: bool) {
        assert_eq!(eval(&expr), Ok(Value::Boolean(expected)));
    }

    #[test]
    fn test_mixed_operands_rejected() {
        let errors = check_errors(&json!(["==", 1, "a"]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("=="));
    }
}
