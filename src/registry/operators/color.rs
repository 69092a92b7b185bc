//! Color construction and decomposition

use super::{eval_number, eval_string};
use crate::compiler::{CompiledExpr, compiled};
use crate::evaluator::helpers;
use crate::model::{Type, Value};
use crate::registry::{
    Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register `parse_color`, `rgb`, `rgba` and `to_rgba`
pub(super) fn register_color_operators(registry: &mut OperatorRegistry) {
    registry.register(OperatorDescriptor::new(
        "parse_color",
        OperatorCategory::Color,
        ResultType::Fixed(Type::Color),
        vec![Signature::fixed([Type::String])],
        lower_parse_color,
    ));
    registry.register(OperatorDescriptor::new(
        "rgb",
        OperatorCategory::Color,
        ResultType::Fixed(Type::Color),
        vec![Signature::fixed([Type::Number, Type::Number, Type::Number])],
        lower_rgba,
    ));
    registry.register(OperatorDescriptor::new(
        "rgba",
        OperatorCategory::Color,
        ResultType::Fixed(Type::Color),
        vec![Signature::fixed([
            Type::Number,
            Type::Number,
            Type::Number,
            Type::Number,
        ])],
        lower_rgba,
    ));
    registry.register(OperatorDescriptor::new(
        "to_rgba",
        OperatorCategory::Color,
        ResultType::Fixed(Type::array(Type::Number, Some(4))),
        vec![Signature::fixed([Type::Color])],
        lower_to_rgba,
    ));
}

fn lower_parse_color(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    let key = lowering.key;
    compiled(move |ctx| {
        let input = eval_string(&arg, ctx)?;
        Ok(Value::Color(helpers::parse_color(&input, &key)?))
    })
}

/// Shared by `rgb` and `rgba`; alpha defaults to opaque when absent
fn lower_rgba(lowering: Lowering) -> CompiledExpr {
    let args = lowering.args;
    compiled(move |ctx| {
        let r = eval_number(&args[0], ctx)?;
        let g = eval_number(&args[1], ctx)?;
        let b = eval_number(&args[2], ctx)?;
        let a = match args.get(3) {
            Some(alpha) => Some(eval_number(alpha, ctx)?),
            None => None,
        };
        Ok(Value::Color(helpers::make_color(r, g, b, a)))
    })
}

fn lower_to_rgba(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| {
        let channels = match arg(ctx)? {
            Value::Color(color) => color.to_rgba8(),
            _ => [f64::NAN; 4],
        };
        Ok(Value::array(channels.into_iter().map(Value::Number).collect()))
    })
}
