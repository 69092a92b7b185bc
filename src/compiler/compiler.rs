// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Closure compiler for checked expression trees
//!
//! Each node is lowered once, bottom-up, into a shared closure. Special
//! forms are lowered here; registry operators delegate to the lowering rule
//! of their descriptor. `let` references are resolved to a `(depth, slot)`
//! pair against a compile-time stack of frames that mirrors the runtime
//! [`Frame`](crate::evaluator::Frame) chain.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::error::{CompileError, CompileResult};
use crate::ast::{
    CaseData, CurveData, ExpressionKind, ExpressionNode, Interpolation, LetData, MatchData,
    MatchLabel,
};
use crate::evaluator::{EvaluationContext, EvaluationError, EvaluationResult};
use crate::model::{Feature, PropertyMap, Type, Value};
use crate::registry::Lowering;

/// A compiled expression node
pub type CompiledExpr =
    Arc<dyn Fn(&EvaluationContext<'_>) -> EvaluationResult<Value> + Send + Sync>;

/// Wrap a closure as a [`CompiledExpr`]
pub fn compiled<F>(f: F) -> CompiledExpr
where
    F: Fn(&EvaluationContext<'_>) -> EvaluationResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Executable form of a checked expression
#[derive(Clone)]
pub struct CompiledExpression {
    root: CompiledExpr,
    result_type: Type,
    zoom_dependent: bool,
    feature_dependent: bool,
}

impl CompiledExpression {
    /// Evaluate against a feature at a zoom level
    pub fn evaluate(
        &self,
        feature: &Feature,
        zoom: f64,
        map_properties: &PropertyMap,
    ) -> EvaluationResult<Value> {
        self.evaluate_in(&EvaluationContext::new(feature, zoom, map_properties))
    }

    /// Evaluate with a prepared context
    pub fn evaluate_in(&self, context: &EvaluationContext<'_>) -> EvaluationResult<Value> {
        (self.root)(context)
    }

    /// Checked type of the root expression
    pub fn result_type(&self) -> &Type {
        &self.result_type
    }

    /// Whether the result can change with zoom
    pub fn is_zoom_dependent(&self) -> bool {
        self.zoom_dependent
    }

    /// Whether the result can change between features
    pub fn is_feature_dependent(&self) -> bool {
        self.feature_dependent
    }

    /// Whether the result is the same for every feature and zoom
    pub fn is_constant(&self) -> bool {
        !self.zoom_dependent && !self.feature_dependent
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("result_type", &self.result_type)
            .field("zoom_dependent", &self.zoom_dependent)
            .field("feature_dependent", &self.feature_dependent)
            .finish_non_exhaustive()
    }
}

/// Compile a checked tree
pub fn compile(node: &ExpressionNode) -> CompileResult<CompiledExpression> {
    let result_type = node.ty.clone().ok_or_else(|| CompileError::Unchecked {
        key: node.key.clone(),
    })?;
    let root = Compiler::default().lower(node)?;
    let compiled = CompiledExpression {
        root,
        result_type,
        zoom_dependent: node.is_zoom_dependent(),
        feature_dependent: node.is_feature_dependent(),
    };
    log::debug!("compiled expression: {compiled:?}");
    Ok(compiled)
}

#[derive(Default)]
struct Compiler {
    /// Names bound so far by each enclosing `let`, outermost first
    frames: Vec<Vec<String>>,
}

impl Compiler {
    fn lower(&mut self, node: &ExpressionNode) -> CompileResult<CompiledExpr> {
        let ty = node.ty.clone().ok_or_else(|| CompileError::Unchecked {
            key: node.key.clone(),
        })?;

        match &node.kind {
            ExpressionKind::Literal(value) => {
                let value = value.clone();
                Ok(compiled(move |_| Ok(value.clone())))
            }
            ExpressionKind::Reference(name) => self.lower_reference(&node.key, name),
            ExpressionKind::Let(data) => {
                self.frames.push(Vec::with_capacity(data.bindings.len()));
                let lowered = self.lower_let(data);
                self.frames.pop();
                lowered
            }
            ExpressionKind::Case(data) => self.lower_case(data),
            ExpressionKind::Match(data) => self.lower_match(data),
            ExpressionKind::Coalesce(branches) => self.lower_coalesce(branches),
            ExpressionKind::Curve(data) => self.lower_curve(data),
            ExpressionKind::Compound(data) => {
                let args = data
                    .args
                    .iter()
                    .map(|arg| self.lower(arg))
                    .collect::<CompileResult<SmallVec<[CompiledExpr; 4]>>>()?;
                let arg_types = data
                    .args
                    .iter()
                    .map(|arg| arg.ty.clone().unwrap_or(Type::Value))
                    .collect();
                Ok((data.descriptor.lower)(Lowering {
                    key: node.key.clone(),
                    ty,
                    arg_types,
                    args,
                }))
            }
        }
    }

    fn lower_reference(&self, key: &str, name: &str) -> CompileResult<CompiledExpr> {
        let slot = self
            .frames
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, names)| {
                names
                    .iter()
                    .rposition(|bound| bound == name)
                    .map(|index| (depth, index))
            });
        let Some((depth, index)) = slot else {
            return Err(CompileError::UnresolvedReference {
                key: key.to_string(),
                name: name.to_string(),
            });
        };

        let (key, name) = (key.to_string(), name.to_string());
        Ok(compiled(move |ctx| {
            ctx.binding(depth, index)
                .cloned()
                .ok_or_else(|| EvaluationError::BindingNotFound {
                    key: key.clone(),
                    name: name.clone(),
                })
        }))
    }

    /// Expects the frame for this `let` to be on top of the stack
    fn lower_let(&mut self, data: &LetData) -> CompileResult<CompiledExpr> {
        let mut bindings = Vec::with_capacity(data.bindings.len());
        for (name, value) in &data.bindings {
            bindings.push(self.lower(value)?);
            if let Some(frame) = self.frames.last_mut() {
                frame.push(name.clone());
            }
        }
        let result = self.lower(&data.result)?;

        Ok(compiled(move |ctx| {
            let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(bindings.len());
            for binding in &bindings {
                let value = {
                    let frame = ctx.child_frame(&values);
                    binding(&ctx.with_frame(&frame))?
                };
                values.push(value);
            }
            let frame = ctx.child_frame(&values);
            result(&ctx.with_frame(&frame))
        }))
    }

    fn lower_case(&mut self, data: &CaseData) -> CompileResult<CompiledExpr> {
        let branches = data
            .branches
            .iter()
            .map(|(condition, output)| Ok((self.lower(condition)?, self.lower(output)?)))
            .collect::<CompileResult<Vec<_>>>()?;
        let otherwise = self.lower(&data.otherwise)?;

        Ok(compiled(move |ctx| {
            for (condition, output) in &branches {
                if condition(ctx)?.as_bool() == Some(true) {
                    return output(ctx);
                }
            }
            otherwise(ctx)
        }))
    }

    fn lower_match(&mut self, data: &MatchData) -> CompileResult<CompiledExpr> {
        let input = self.lower(&data.input)?;
        let mut table = MatchTable::default();
        let mut outputs = Vec::with_capacity(data.branches.len());
        for (index, branch) in data.branches.iter().enumerate() {
            for label in &branch.labels {
                table.insert(label, index);
            }
            outputs.push(self.lower(&branch.output)?);
        }
        let otherwise = self.lower(&data.otherwise)?;

        Ok(compiled(move |ctx| match table.find(&input(ctx)?) {
            Some(index) => outputs[index](ctx),
            None => otherwise(ctx),
        }))
    }

    fn lower_coalesce(&mut self, branches: &[ExpressionNode]) -> CompileResult<CompiledExpr> {
        let branches = branches
            .iter()
            .map(|branch| self.lower(branch))
            .collect::<CompileResult<Vec<_>>>()?;

        Ok(compiled(move |ctx| {
            let mut last_error = None;
            let mut all_failed = true;
            for branch in &branches {
                match branch(ctx) {
                    Ok(Value::Null) => all_failed = false,
                    Ok(value) => return Ok(value),
                    Err(error) => last_error = Some(error),
                }
            }
            match last_error {
                Some(error) if all_failed => Err(error),
                _ => Ok(Value::Null),
            }
        }))
    }

    fn lower_curve(&mut self, data: &CurveData) -> CompileResult<CompiledExpr> {
        let input = self.lower(&data.input)?;
        let stops: Vec<f64> = data.stops.iter().map(|(stop, _)| *stop).collect();
        let outputs = data
            .stops
            .iter()
            .map(|(_, output)| self.lower(output))
            .collect::<CompileResult<Vec<_>>>()?;
        let interpolation = data.interpolation;

        Ok(compiled(move |ctx| {
            let x = input(ctx)?.as_number().unwrap_or(f64::NAN);
            // Number of stops at or below the input.
            let above = stops.partition_point(|stop| *stop <= x);
            let last = stops.len() - 1;

            if above == 0 {
                return outputs[0](ctx);
            }
            let lower = above - 1;
            if interpolation == Interpolation::Step || lower == last || stops[lower] == x {
                return outputs[lower](ctx);
            }

            let t = interpolation_factor(interpolation, x, stops[lower], stops[above]);
            let from = outputs[lower](ctx)?;
            let to = outputs[above](ctx)?;
            Ok(interpolate(&from, &to, t))
        }))
    }
}

/// Label lookup for `match`; `-0` and `0` share a slot
#[derive(Default)]
struct MatchTable {
    numbers: FxHashMap<u64, usize>,
    strings: FxHashMap<String, usize>,
}

impl MatchTable {
    fn insert(&mut self, label: &MatchLabel, index: usize) {
        match label {
            MatchLabel::Number(n) => {
                self.numbers.entry(number_bits(*n)).or_insert(index);
            }
            MatchLabel::String(s) => {
                self.strings.entry(s.clone()).or_insert(index);
            }
        }
    }

    fn find(&self, input: &Value) -> Option<usize> {
        match input {
            Value::Number(n) => self.numbers.get(&number_bits(*n)).copied(),
            Value::String(s) => self.strings.get(s.as_str()).copied(),
            _ => None,
        }
    }
}

fn number_bits(n: f64) -> u64 {
    if n == 0.0 { 0f64.to_bits() } else { n.to_bits() }
}

/// Position of `x` between `lower` and `upper`, in `[0, 1]`
fn interpolation_factor(interpolation: Interpolation, x: f64, lower: f64, upper: f64) -> f64 {
    let progress = x - lower;
    let range = upper - lower;
    match interpolation {
        Interpolation::Exponential(base) if base != 1.0 => {
            let denominator = base.powf(range) - 1.0;
            if denominator.is_finite() {
                (base.powf(progress) - 1.0) / denominator
            } else {
                // base^range overflowed; the -1 terms are negligible
                base.powf(progress - range)
            }
        }
        _ => progress / range,
    }
}

fn interpolate(from: &Value, to: &Value, t: f64) -> Value {
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
        (Value::Color(a), Value::Color(b)) => Value::Color(a.interpolate(b, t)),
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => Value::array(
            a.iter()
                .zip(b.iter())
                .map(|(a, b)| interpolate(a, b, t))
                .collect(),
        ),
        _ => from.clone(),
    }
}
