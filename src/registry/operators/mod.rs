//! Built-in operator definitions, grouped by category

mod access;
mod color;
mod comparison;
mod feature;
mod logical;
mod math;
mod string;
mod types;

use super::OperatorRegistry;
use crate::compiler::CompiledExpr;
use crate::evaluator::{EvaluationContext, EvaluationResult};

/// Register all built-in operators
pub fn register_builtin_operators(registry: &mut OperatorRegistry) {
    math::register_math_operators(registry);
    comparison::register_comparison_operators(registry);
    logical::register_logical_operators(registry);
    types::register_type_operators(registry);
    color::register_color_operators(registry);
    access::register_access_operators(registry);
    feature::register_feature_operators(registry);
    string::register_string_operators(registry);
}

// Argument types are checked before lowering, so the fallbacks below are
// never observed for well-typed trees.

fn eval_number(arg: &CompiledExpr, ctx: &EvaluationContext<'_>) -> EvaluationResult<f64> {
    Ok(arg(ctx)?.as_number().unwrap_or(f64::NAN))
}

fn eval_bool(arg: &CompiledExpr, ctx: &EvaluationContext<'_>) -> EvaluationResult<bool> {
    Ok(arg(ctx)?.as_bool().unwrap_or(false))
}

fn eval_string(arg: &CompiledExpr, ctx: &EvaluationContext<'_>) -> EvaluationResult<String> {
    match arg(ctx)? {
        crate::model::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}
