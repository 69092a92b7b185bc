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

//! Operator descriptors held by the registry

use serde_json::Value as JsonValue;
use smallvec::SmallVec;
use std::fmt;

use super::signature::Signature;
use crate::ast::ExpressionNode;
use crate::compiler::CompiledExpr;
use crate::model::Type;
use crate::parser::{ParseResult, ParsingContext};

/// Operator grouping, used for documentation and listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    /// Math constants and functions
    Math,
    /// Arithmetic operators
    Arithmetic,
    /// Comparison operators
    Comparison,
    /// Boolean operators
    Boolean,
    /// Runtime type assertions
    Assertion,
    /// Total coercions
    Coercion,
    /// Type reflection
    Reflection,
    /// Color construction and decomposition
    Color,
    /// Object and array access
    Access,
    /// Feature and evaluation context data
    Feature,
    /// String manipulation
    String,
}

/// How the result type of an operator is determined
#[derive(Clone)]
pub enum ResultType {
    /// Always the same type
    Fixed(Type),
    /// Computed from the checked argument types
    FromArgs(fn(&[Type]) -> Type),
}

impl ResultType {
    /// Resolve the result type for the given argument types
    pub fn resolve(&self, arg_types: &[Type]) -> Type {
        match self {
            ResultType::Fixed(ty) => ty.clone(),
            ResultType::FromArgs(f) => f(arg_types),
        }
    }
}

/// Custom parse routine; receives the arguments after the operator name
pub type CustomParse =
    fn(&'static OperatorDescriptor, &[JsonValue], &ParsingContext) -> ParseResult<ExpressionNode>;

/// Lowering rule turning compiled arguments into the compiled operator
pub type LowerFn = fn(Lowering) -> CompiledExpr;

/// Input to a lowering rule
pub struct Lowering {
    /// Key of the node being lowered
    pub key: String,
    /// Checked type of the node
    pub ty: Type,
    /// Checked types of the arguments
    pub arg_types: Vec<Type>,
    /// Compiled arguments, in order
    pub args: SmallVec<[CompiledExpr; 4]>,
}

impl Lowering {
    /// Compiled argument at `index`
    ///
    /// Arity was validated at parse time, so `index` is always in range for
    /// the signature a lowering rule is written against.
    pub fn arg(&self, index: usize) -> CompiledExpr {
        self.args[index].clone()
    }
}

/// Immutable description of one operator
pub struct OperatorDescriptor {
    /// Operator name as written in expressions
    pub name: &'static str,
    /// Category of the operator
    pub category: OperatorCategory,
    /// Result type rule
    pub result: ResultType,
    /// Accepted signatures, tried in order
    pub signatures: Vec<Signature>,
    /// Parse routine replacing the default one
    pub custom_parse: Option<CustomParse>,
    /// Lowering rule
    pub lower: LowerFn,
}

impl OperatorDescriptor {
    /// Create a descriptor using the default parse routine
    pub fn new(
        name: &'static str,
        category: OperatorCategory,
        result: ResultType,
        signatures: Vec<Signature>,
        lower: LowerFn,
    ) -> Self {
        Self {
            name,
            category,
            result,
            signatures,
            custom_parse: None,
            lower,
        }
    }

    /// Replace the default parse routine
    pub fn with_parse(mut self, parse: CustomParse) -> Self {
        self.custom_parse = Some(parse);
        self
    }

    /// Check if any signature accepts the given number of arguments
    pub fn accepts_arity(&self, count: usize) -> bool {
        self.signatures
            .iter()
            .any(|signature| signature.accepts_arity(count))
    }
}

impl fmt::Debug for OperatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("signatures", &self.signatures)
            .finish()
    }
}

impl PartialEq for OperatorDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
