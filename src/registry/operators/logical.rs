//! Logical operators for style expressions

use super::eval_bool;
use crate::compiler::{CompiledExpr, compiled};
use crate::model::{Type, Value};
use crate::registry::{
    Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register `&&`, `||` and `!`
pub(super) fn register_logical_operators(registry: &mut OperatorRegistry) {
    registry.register(OperatorDescriptor::new(
        "&&",
        OperatorCategory::Boolean,
        ResultType::Fixed(Type::Boolean),
        vec![Signature::variadic(Type::Boolean, 0)],
        lower_and,
    ));
    registry.register(OperatorDescriptor::new(
        "||",
        OperatorCategory::Boolean,
        ResultType::Fixed(Type::Boolean),
        vec![Signature::variadic(Type::Boolean, 0)],
        lower_or,
    ));
    registry.register(OperatorDescriptor::new(
        "!",
        OperatorCategory::Boolean,
        ResultType::Fixed(Type::Boolean),
        vec![Signature::fixed([Type::Boolean])],
        lower_not,
    ));
}

/// Evaluates operands left to right and stops at the first `false`
fn lower_and(lowering: Lowering) -> CompiledExpr {
    let args = lowering.args;
    compiled(move |ctx| {
        for arg in &args {
            if !eval_bool(arg, ctx)? {
                return Ok(Value::Boolean(false));
            }
        }
        Ok(Value::Boolean(true))
    })
}

/// Evaluates operands left to right and stops at the first `true`
fn lower_or(lowering: Lowering) -> CompiledExpr {
    let args = lowering.args;
    compiled(move |ctx| {
        for arg in &args {
            if eval_bool(arg, ctx)? {
                return Ok(Value::Boolean(true));
            }
        }
        Ok(Value::Boolean(false))
    })
}

fn lower_not(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::Boolean(!eval_bool(&arg, ctx)?)))
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::test_utils::{eval, eval_with};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(["&&", true, true]), true)]
    #[case(json!(["&&", true, false]), false)]
    #[case(json!(["&&"]), true)]
    #[case(json!(["||", false, true]), true)]
    #[case(json!(["||"]), false)]
    #[case(json!(["!", false]), true)]
    fn test_logical(#[case] expr: serde_json::Value, #[case] expected: bool) {
        assert_eq!(eval(&expr), Ok(Value::Boolean(expected)));
    }

    #[test]
    fn test_short_circuit_skips_failing_operand() {
        // The second operand would raise PropertyNotFound if evaluated.
        let missing = json!(["boolean", ["get", "missing"]]);
        assert_eq!(
            eval_with(&json!(["&&", false, missing]), json!({})),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            eval_with(&json!(["||", true, missing]), json!({})),
            Ok(Value::Boolean(true))
        );
        assert!(eval_with(&json!(["&&", true, missing]), json!({})).is_err());
    }
}
