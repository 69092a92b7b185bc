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

//! Type checking for parsed expression trees
//!
//! Checking is bottom-up and never stops at the first problem: each node
//! checks all of its children, records its own errors and returns `None`
//! if anything below it failed. A node whose children failed does not add
//! an error of its own, so every failing node reports exactly once.

use smallvec::SmallVec;
use std::sync::Arc;

use super::error::TypeError;
use crate::ast::{
    CaseData, CompoundData, CurveData, ExpressionKind, ExpressionNode, Interpolation, LetData,
    MatchBranch, MatchData,
};
use crate::model::Type;
use crate::parser::Scope;
use crate::registry::resolve_overload;
use crate::registry::signature::{join_signatures, join_types};

impl ExpressionNode {
    /// Check this node and its subtree
    ///
    /// Returns a copy with every `ty` filled in, or `None` after pushing at
    /// least one error (or after meeting a reference to a binding that failed
    /// to check, which was already reported at the binding).
    pub fn typecheck(
        &self,
        scope: &Arc<Scope>,
        errors: &mut Vec<TypeError>,
    ) -> Option<ExpressionNode> {
        let (kind, ty) = match &self.kind {
            ExpressionKind::Literal(value) => (self.kind.clone(), value.type_of()),
            ExpressionKind::Reference(name) => match scope.get(name) {
                Some(bound) => (self.kind.clone(), bound.ty.clone()?),
                None => {
                    errors.push(TypeError::UnboundReference {
                        key: self.key.clone(),
                        name: name.clone(),
                    });
                    return None;
                }
            },
            ExpressionKind::Let(data) => {
                let (data, ty) = check_let(data, scope, errors)?;
                (ExpressionKind::Let(Box::new(data)), ty)
            }
            ExpressionKind::Case(data) => {
                let (data, ty) = check_case(data, scope, errors)?;
                (ExpressionKind::Case(Box::new(data)), ty)
            }
            ExpressionKind::Match(data) => {
                let (data, ty) = check_match(data, scope, errors)?;
                (ExpressionKind::Match(Box::new(data)), ty)
            }
            ExpressionKind::Coalesce(branches) => {
                let checked = check_all(branches.iter(), scope, errors)?;
                let ty = unify_outputs(&checked, errors)?;
                (ExpressionKind::Coalesce(checked), ty)
            }
            ExpressionKind::Curve(data) => {
                let (data, ty) = check_curve(&self.key, data, scope, errors)?;
                (ExpressionKind::Curve(Box::new(data)), ty)
            }
            ExpressionKind::Compound(data) => {
                let (data, ty) = check_compound(&self.key, data, scope, errors)?;
                (ExpressionKind::Compound(Box::new(data)), ty)
            }
        };

        Some(ExpressionNode {
            key: self.key.clone(),
            ty: Some(ty),
            kind,
        })
    }
}

/// Check every node, keeping going after failures
fn check_all<'a>(
    nodes: impl Iterator<Item = &'a ExpressionNode>,
    scope: &Arc<Scope>,
    errors: &mut Vec<TypeError>,
) -> Option<Vec<ExpressionNode>> {
    let mut checked = Vec::new();
    let mut failed = false;
    for node in nodes {
        match node.typecheck(scope, errors) {
            Some(node) => checked.push(node),
            None => failed = true,
        }
    }
    (!failed).then_some(checked)
}

fn node_type(node: &ExpressionNode) -> Type {
    node.ty.clone().unwrap_or(Type::Value)
}

/// Common type of checked outputs; each output that fits neither the type
/// so far nor widens it is reported
fn unify_outputs(outputs: &[ExpressionNode], errors: &mut Vec<TypeError>) -> Option<Type> {
    let (first, rest) = outputs.split_first()?;
    let mut ty = node_type(first);
    let mut failed = false;
    for output in rest {
        let actual = node_type(output);
        match ty.unify(&actual) {
            Some(unified) => ty = unified,
            None => {
                errors.push(TypeError::Mismatch {
                    key: output.key.clone(),
                    expected: ty.clone(),
                    actual,
                });
                failed = true;
            }
        }
    }
    (!failed).then_some(ty)
}

/// Fails with a mismatch unless `expected` accepts the node's type
fn expect_type(node: &ExpressionNode, expected: &Type, errors: &mut Vec<TypeError>) -> bool {
    let actual = node_type(node);
    if expected.is_compatible(&actual) {
        true
    } else {
        errors.push(TypeError::Mismatch {
            key: node.key.clone(),
            expected: expected.clone(),
            actual,
        });
        false
    }
}

fn check_let(
    data: &LetData,
    scope: &Arc<Scope>,
    errors: &mut Vec<TypeError>,
) -> Option<(LetData, Type)> {
    let mut scope = Arc::clone(scope);
    let mut bindings = Vec::with_capacity(data.bindings.len());
    let mut failed = false;

    for (name, value) in &data.bindings {
        // A failed binding stays in scope unchecked so that references to
        // it fail without another error.
        let bound = match value.typecheck(&scope, errors) {
            Some(checked) => checked,
            None => {
                failed = true;
                value.clone()
            }
        };
        scope = scope.bind(name.clone(), bound.clone());
        bindings.push((name.clone(), bound));
    }

    let result = data.result.typecheck(&scope, errors);
    if failed {
        return None;
    }
    let result = result?;
    let ty = node_type(&result);
    Some((LetData { bindings, result }, ty))
}

fn check_case(
    data: &CaseData,
    scope: &Arc<Scope>,
    errors: &mut Vec<TypeError>,
) -> Option<(CaseData, Type)> {
    let mut branches = Vec::with_capacity(data.branches.len());
    let mut outputs = Vec::with_capacity(data.branches.len() + 1);
    let mut failed = false;

    for (condition, output) in &data.branches {
        let condition = condition
            .typecheck(scope, errors)
            .filter(|checked| expect_type(checked, &Type::Boolean, errors));
        let output = output.typecheck(scope, errors);
        match (condition, output) {
            (Some(condition), Some(output)) => {
                outputs.push(output.clone());
                branches.push((condition, output));
            }
            _ => failed = true,
        }
    }
    let otherwise = data.otherwise.typecheck(scope, errors);
    if failed {
        return None;
    }
    let otherwise = otherwise?;
    outputs.push(otherwise.clone());

    let ty = unify_outputs(&outputs, errors)?;
    Some((CaseData { branches, otherwise }, ty))
}

fn check_match(
    data: &MatchData,
    scope: &Arc<Scope>,
    errors: &mut Vec<TypeError>,
) -> Option<(MatchData, Type)> {
    let input = data.input.typecheck(scope, errors).filter(|checked| {
        data.label_type()
            .is_none_or(|label_type| expect_type(checked, &label_type, errors))
    });
    let outputs = check_all(
        data.branches
            .iter()
            .map(|branch| &branch.output)
            .chain(std::iter::once(&data.otherwise)),
        scope,
        errors,
    );
    let (input, mut outputs) = (input?, outputs?);
    let ty = unify_outputs(&outputs, errors)?;

    let otherwise = outputs.pop()?;
    let branches = data
        .branches
        .iter()
        .zip(outputs)
        .map(|(branch, output)| MatchBranch {
            labels: branch.labels.clone(),
            grouped: branch.grouped,
            output,
        })
        .collect();
    Some((
        MatchData {
            input,
            branches,
            otherwise,
        },
        ty,
    ))
}

fn check_curve(
    key: &str,
    data: &CurveData,
    scope: &Arc<Scope>,
    errors: &mut Vec<TypeError>,
) -> Option<(CurveData, Type)> {
    let input = data
        .input
        .typecheck(scope, errors)
        .filter(|checked| expect_type(checked, &Type::Number, errors));
    let outputs = check_all(data.stops.iter().map(|(_, output)| output), scope, errors);
    let (input, outputs) = (input?, outputs?);
    let ty = unify_outputs(&outputs, errors)?;

    if data.interpolation != Interpolation::Step && !ty.is_interpolatable() {
        errors.push(TypeError::NotInterpolatable {
            key: key.to_string(),
            ty,
        });
        return None;
    }

    let stops = data
        .stops
        .iter()
        .zip(outputs)
        .map(|((stop, _), output)| (*stop, output))
        .collect();
    Some((
        CurveData {
            interpolation: data.interpolation,
            input,
            stops,
        },
        ty,
    ))
}

fn check_compound(
    key: &str,
    data: &CompoundData,
    scope: &Arc<Scope>,
    errors: &mut Vec<TypeError>,
) -> Option<(CompoundData, Type)> {
    let args: SmallVec<[ExpressionNode; 4]> =
        check_all(data.args.iter(), scope, errors)?.into_iter().collect();
    let arg_types: Vec<Type> = args.iter().map(node_type).collect();
    let descriptor = data.descriptor;

    if resolve_overload(&descriptor.signatures, &arg_types).is_none() {
        errors.push(TypeError::NoMatchingSignature {
            key: key.to_string(),
            operator: descriptor.name.to_string(),
            expected: join_signatures(&descriptor.signatures),
            actual: format!("({})", join_types(&arg_types)),
        });
        return None;
    }

    let ty = data
        .result
        .clone()
        .unwrap_or_else(|| descriptor.result.resolve(&arg_types));
    Some((
        CompoundData {
            descriptor,
            options: data.options.clone(),
            args,
            result: data.result.clone(),
        },
        ty,
    ))
}
