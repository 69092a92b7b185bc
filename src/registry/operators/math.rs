//! Math constants, functions and arithmetic operators

use std::f64::consts;

use super::eval_number;
use crate::compiler::{CompiledExpr, compiled};
use crate::model::{Type, Value};
use crate::registry::{
    LowerFn, Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register math constants, functions and arithmetic operators
pub(super) fn register_math_operators(registry: &mut OperatorRegistry) {
    let math_constant = |name: &'static str, lower: LowerFn| {
        OperatorDescriptor::new(
            name,
            OperatorCategory::Math,
            ResultType::Fixed(Type::Number),
            vec![Signature::nullary()],
            lower,
        )
    };
    registry.register(math_constant("pi", lower_pi));
    registry.register(math_constant("e", lower_e));
    registry.register(math_constant("ln2", lower_ln2));

    let function = |name: &'static str, lower: LowerFn| {
        OperatorDescriptor::new(
            name,
            OperatorCategory::Math,
            ResultType::Fixed(Type::Number),
            vec![Signature::fixed([Type::Number])],
            lower,
        )
    };
    registry.register(function("log10", lower_log10));
    registry.register(function("ln", lower_ln));
    registry.register(function("log2", lower_log2));
    registry.register(function("sin", lower_sin));
    registry.register(function("cos", lower_cos));
    registry.register(function("tan", lower_tan));
    registry.register(function("asin", lower_asin));
    registry.register(function("acos", lower_acos));
    registry.register(function("atan", lower_atan));

    let associative = |name: &'static str, lower: LowerFn| {
        OperatorDescriptor::new(
            name,
            OperatorCategory::Arithmetic,
            ResultType::Fixed(Type::Number),
            vec![Signature::variadic(Type::Number, 1)],
            lower,
        )
    };
    registry.register(associative("+", lower_add));
    registry.register(associative("*", lower_multiply));

    let binary = |name: &'static str, lower: LowerFn| {
        OperatorDescriptor::new(
            name,
            OperatorCategory::Arithmetic,
            ResultType::Fixed(Type::Number),
            vec![Signature::fixed([Type::Number, Type::Number])],
            lower,
        )
    };
    registry.register(binary("-", lower_subtract));
    registry.register(binary("/", lower_divide));
    registry.register(binary("%", lower_remainder));
    registry.register(binary("^", lower_power));
}

fn constant(value: f64) -> CompiledExpr {
    compiled(move |_| Ok(Value::Number(value)))
}

fn lower_pi(_: Lowering) -> CompiledExpr {
    constant(consts::PI)
}

fn lower_e(_: Lowering) -> CompiledExpr {
    constant(consts::E)
}

fn lower_ln2(_: Lowering) -> CompiledExpr {
    constant(consts::LN_2)
}

fn unary(lowering: Lowering, f: fn(f64) -> f64) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::Number(f(eval_number(&arg, ctx)?))))
}

fn lower_log10(l: Lowering) -> CompiledExpr {
    unary(l, f64::log10)
}

fn lower_ln(l: Lowering) -> CompiledExpr {
    unary(l, f64::ln)
}

fn lower_log2(l: Lowering) -> CompiledExpr {
    unary(l, f64::log2)
}

fn lower_sin(l: Lowering) -> CompiledExpr {
    unary(l, f64::sin)
}

fn lower_cos(l: Lowering) -> CompiledExpr {
    unary(l, f64::cos)
}

fn lower_tan(l: Lowering) -> CompiledExpr {
    unary(l, f64::tan)
}

fn lower_asin(l: Lowering) -> CompiledExpr {
    unary(l, f64::asin)
}

fn lower_acos(l: Lowering) -> CompiledExpr {
    unary(l, f64::acos)
}

fn lower_atan(l: Lowering) -> CompiledExpr {
    unary(l, f64::atan)
}

fn fold(lowering: Lowering, init: f64, f: fn(f64, f64) -> f64) -> CompiledExpr {
    let args = lowering.args;
    compiled(move |ctx| {
        let mut acc = init;
        for arg in &args {
            acc = f(acc, eval_number(arg, ctx)?);
        }
        Ok(Value::Number(acc))
    })
}

fn lower_add(l: Lowering) -> CompiledExpr {
    fold(l, 0.0, |a, b| a + b)
}

fn lower_multiply(l: Lowering) -> CompiledExpr {
    fold(l, 1.0, |a, b| a * b)
}

fn binary(lowering: Lowering, f: fn(f64, f64) -> f64) -> CompiledExpr {
    let (lhs, rhs) = (lowering.arg(0), lowering.arg(1));
    compiled(move |ctx| {
        let a = eval_number(&lhs, ctx)?;
        let b = eval_number(&rhs, ctx)?;
        Ok(Value::Number(f(a, b)))
    })
}

fn lower_subtract(l: Lowering) -> CompiledExpr {
    binary(l, |a, b| a - b)
}

fn lower_divide(l: Lowering) -> CompiledExpr {
    binary(l, |a, b| a / b)
}

fn lower_remainder(l: Lowering) -> CompiledExpr {
    binary(l, |a, b| a % b)
}

fn lower_power(l: Lowering) -> CompiledExpr {
    binary(l, f64::powf)
}
