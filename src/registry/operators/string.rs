//! String operators

use super::eval_string;
use crate::compiler::{CompiledExpr, compiled};
use crate::evaluator::helpers;
use crate::model::{Type, Value};
use crate::registry::{
    Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register `upcase`, `downcase` and `concat`
pub(super) fn register_string_operators(registry: &mut OperatorRegistry) {
    registry.register(OperatorDescriptor::new(
        "upcase",
        OperatorCategory::String,
        ResultType::Fixed(Type::String),
        vec![Signature::fixed([Type::String])],
        lower_upcase,
    ));
    registry.register(OperatorDescriptor::new(
        "downcase",
        OperatorCategory::String,
        ResultType::Fixed(Type::String),
        vec![Signature::fixed([Type::String])],
        lower_downcase,
    ));
    registry.register(OperatorDescriptor::new(
        "concat",
        OperatorCategory::String,
        ResultType::Fixed(Type::String),
        vec![Signature::variadic(Type::Value, 0)],
        lower_concat,
    ));
}

fn lower_upcase(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::String(eval_string(&arg, ctx)?.to_uppercase())))
}

fn lower_downcase(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::String(eval_string(&arg, ctx)?.to_lowercase())))
}

/// Joins the string coercion of every operand
fn lower_concat(lowering: Lowering) -> CompiledExpr {
    let args = lowering.args;
    compiled(move |ctx| {
        let mut out = String::new();
        for arg in &args {
            out.push_str(&helpers::to_string(&arg(ctx)?));
        }
        Ok(Value::String(out))
    })
}

#[cfg(test)]
mod tests {
    use crate::model::Value;
    use crate::test_utils::eval;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(["upcase", "Main St"]), "MAIN ST")]
    #[case(json!(["downcase", "Main St"]), "main st")]
    #[case(json!(["concat", "a", 1, true, null]), "a1true")]
    #[case(json!(["concat"]), "")]
    #[case(json!(["concat", ["+", 0.5, 1]]), "1.5")]
    fn test_strings(#[case] expr: serde_json::Value, #[case] expected: &str) {
        assert_eq!(eval(&expr), Ok(Value::string(expected)));
    }
}
