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

//! Expression node definitions

use serde_json::Value as JsonValue;
use smallvec::SmallVec;

use crate::model::value::number_to_json;
use crate::model::{Type, Value};
use crate::registry::OperatorDescriptor;

/// A parsed expression node
///
/// `ty` stays `None` until the node has been type checked; the checker
/// returns a new node with every `ty` in the subtree filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    /// Diagnostic path of the node, e.g. `[2][1]`; empty for the root
    pub key: String,
    /// Resolved type, set only by the type checker
    pub ty: Option<Type>,
    /// Variant data
    pub kind: ExpressionKind,
}

/// Expression variants: one per special form plus compound operator calls
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// Constant value
    Literal(Value),
    /// Reference to a `let` binding by name
    Reference(String),
    /// `["let", name, value, ..., result]`
    Let(Box<LetData>),
    /// `["case", condition, output, ..., otherwise]`
    Case(Box<CaseData>),
    /// `["match", input, label, output, ..., otherwise]`
    Match(Box<MatchData>),
    /// `["coalesce", branch, ...]`
    Coalesce(Vec<ExpressionNode>),
    /// `["curve", interpolation, input, stop, output, ...]`
    Curve(Box<CurveData>),
    /// Operator from the registry
    Compound(Box<CompoundData>),
}

/// Bindings and result of a `let` expression
#[derive(Debug, Clone, PartialEq)]
pub struct LetData {
    /// Bindings in declaration order
    pub bindings: Vec<(String, ExpressionNode)>,
    /// Expression evaluated with every binding in scope
    pub result: ExpressionNode,
}

/// Branches of a `case` expression
#[derive(Debug, Clone, PartialEq)]
pub struct CaseData {
    /// `(condition, output)` pairs tried in order
    pub branches: Vec<(ExpressionNode, ExpressionNode)>,
    /// Output when no condition holds
    pub otherwise: ExpressionNode,
}

/// Literal label of a `match` branch
#[derive(Debug, Clone, PartialEq)]
pub enum MatchLabel {
    /// Number label
    Number(f64),
    /// String label
    String(String),
}

impl MatchLabel {
    /// Static type of the label
    pub fn label_type(&self) -> Type {
        match self {
            MatchLabel::Number(_) => Type::Number,
            MatchLabel::String(_) => Type::String,
        }
    }

    /// JSON form of the label
    pub fn to_json(&self) -> JsonValue {
        match self {
            MatchLabel::Number(n) => number_to_json(*n),
            MatchLabel::String(s) => JsonValue::String(s.clone()),
        }
    }
}

/// One branch of a `match` expression
#[derive(Debug, Clone, PartialEq)]
pub struct MatchBranch {
    /// Labels selecting this branch
    pub labels: Vec<MatchLabel>,
    /// Whether the labels were written as an array
    pub grouped: bool,
    /// Output of the branch
    pub output: ExpressionNode,
}

/// Input and branches of a `match` expression
#[derive(Debug, Clone, PartialEq)]
pub struct MatchData {
    /// Value compared against the labels
    pub input: ExpressionNode,
    /// Branches in declaration order
    pub branches: Vec<MatchBranch>,
    /// Output when no label matches
    pub otherwise: ExpressionNode,
}

impl MatchData {
    /// Type shared by every label; `None` when there are no branches
    pub fn label_type(&self) -> Option<Type> {
        self.branches
            .first()
            .and_then(|branch| branch.labels.first())
            .map(MatchLabel::label_type)
    }
}

/// Curve interpolation method
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    /// Output of the closest stop at or below the input
    Step,
    /// Linear interpolation between the bracketing stops
    Linear,
    /// Exponential interpolation with the given base
    Exponential(f64),
}

impl Interpolation {
    /// JSON form, e.g. `["exponential", 2]`
    pub fn to_json(&self) -> JsonValue {
        match self {
            Interpolation::Step => JsonValue::Array(vec!["step".into()]),
            Interpolation::Linear => JsonValue::Array(vec!["linear".into()]),
            Interpolation::Exponential(base) => JsonValue::Array(vec![
                "exponential".into(),
                number_to_json(*base),
            ]),
        }
    }
}

/// Interpolation, input and stops of a `curve` expression
#[derive(Debug, Clone, PartialEq)]
pub struct CurveData {
    /// Interpolation method
    pub interpolation: Interpolation,
    /// Numeric input, usually `["zoom"]`
    pub input: ExpressionNode,
    /// `(stop input, output)` pairs in strictly ascending stop order
    pub stops: Vec<(f64, ExpressionNode)>,
}

/// Operator call resolved against the registry
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundData {
    /// Operator descriptor
    pub descriptor: &'static OperatorDescriptor,
    /// Literal arguments consumed by a custom parse, emitted before `args`
    pub options: Vec<JsonValue>,
    /// Sub-expression arguments
    pub args: SmallVec<[ExpressionNode; 4]>,
    /// Result type fixed at parse time, overriding the descriptor's
    pub result: Option<Type>,
}

impl ExpressionNode {
    /// Create an unchecked node
    pub fn new(key: impl Into<String>, kind: ExpressionKind) -> Self {
        Self {
            key: key.into(),
            ty: None,
            kind,
        }
    }

    /// Create an unchecked literal node
    pub fn literal(key: impl Into<String>, value: Value) -> Self {
        Self::new(key, ExpressionKind::Literal(value))
    }

    /// Copy of this node carrying a resolved type
    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Whether the node has been type checked
    pub fn is_checked(&self) -> bool {
        self.ty.is_some()
    }

    /// Operator or special form name, `None` for literals and references
    pub fn operator_name(&self) -> Option<&'static str> {
        match &self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::Reference(_) => None,
            ExpressionKind::Let(_) => Some("let"),
            ExpressionKind::Case(_) => Some("case"),
            ExpressionKind::Match(_) => Some("match"),
            ExpressionKind::Coalesce(_) => Some("coalesce"),
            ExpressionKind::Curve(_) => Some("curve"),
            ExpressionKind::Compound(data) => Some(data.descriptor.name),
        }
    }

    /// Literal value, if this is a literal
    pub fn as_literal(&self) -> Option<&Value> {
        match &self.kind {
            ExpressionKind::Literal(value) => Some(value),
            _ => None,
        }
    }
}
