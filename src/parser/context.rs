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

//! Parsing context: node path, enclosing forms and lexical scope

use std::fmt;
use std::sync::Arc;

use super::error::{ParseResult, ParsingError};
use super::scope::Scope;
use crate::registry::registry;

/// Default limit on expression nesting
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Tag of an enclosing form, pushed when parsing descends into it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ancestor {
    /// Value of a `let` binding
    LetBinding,
    /// Result of a `let`
    LetResult,
    /// Condition or output of a `case`
    Case,
    /// Input or output of a `match`
    Match,
    /// Branch of a `coalesce`
    Coalesce,
    /// Input or output of a `curve`
    Curve,
    /// Argument of a registry operator
    Compound(&'static str),
}

impl fmt::Display for Ancestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ancestor::LetBinding => write!(f, "let.binding"),
            Ancestor::LetResult => write!(f, "let.result"),
            Ancestor::Case => write!(f, "case"),
            Ancestor::Match => write!(f, "match"),
            Ancestor::Coalesce => write!(f, "coalesce"),
            Ancestor::Curve => write!(f, "curve"),
            Ancestor::Compound(name) => write!(f, "compound:{name}"),
        }
    }
}

/// Where in the tree parsing currently is
#[derive(Debug, Clone)]
pub struct ParsingContext {
    path: Vec<usize>,
    ancestry: Vec<Ancestor>,
    scope: Arc<Scope>,
    max_depth: usize,
}

impl Default for ParsingContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl ParsingContext {
    /// Root context with an empty scope
    pub fn new(max_depth: usize) -> Self {
        Self {
            path: Vec::new(),
            ancestry: Vec::new(),
            scope: Scope::new(),
            max_depth,
        }
    }

    /// Diagnostic key of the current node, e.g. `[2][1]`
    pub fn key(&self) -> String {
        render_key(&self.path)
    }

    /// Key of the element at `index` of the current array
    pub fn child_key(&self, index: usize) -> String {
        format!("{}[{index}]", self.key())
    }

    /// Enclosing forms, outermost first
    pub fn ancestry(&self) -> &[Ancestor] {
        &self.ancestry
    }

    /// Bindings visible at this point
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// Context for the element at `index`, inside a form tagged `ancestor`
    pub fn concat(&self, index: usize, ancestor: Ancestor) -> ParseResult<ParsingContext> {
        let mut path = self.path.clone();
        path.push(index);
        if path.len() > self.max_depth {
            return Err(ParsingError::MaxDepthExceeded {
                key: render_key(&path),
                max: self.max_depth,
            });
        }
        let mut ancestry = self.ancestry.clone();
        ancestry.push(ancestor);
        Ok(Self {
            path,
            ancestry,
            scope: Arc::clone(&self.scope),
            max_depth: self.max_depth,
        })
    }

    /// Same position with a different scope
    pub fn with_scope(mut self, scope: Arc<Scope>) -> Self {
        self.scope = scope;
        self
    }

    /// Whether `name` is an operator or special form name
    pub fn is_reserved(&self, name: &str) -> bool {
        registry().is_reserved(name)
    }

    /// Whether this position is the input of a top-level `curve`
    ///
    /// That is the element at index 2 of a `curve` whose enclosing forms
    /// are only `let` results and `coalesce` branches.
    pub fn is_curve_input(&self) -> bool {
        let Some((last, enclosing)) = self.ancestry.split_last() else {
            return false;
        };
        self.path.last() == Some(&2)
            && *last == Ancestor::Curve
            && enclosing
                .iter()
                .all(|ancestor| matches!(ancestor, Ancestor::LetResult | Ancestor::Coalesce))
    }
}

fn render_key(path: &[usize]) -> String {
    path.iter().map(|index| format!("[{index}]")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let root = ParsingContext::default();
        assert_eq!(root.key(), "");
        let child = root.concat(2, Ancestor::Compound("+")).unwrap();
        let grandchild = child.concat(1, Ancestor::Compound("get")).unwrap();
        assert_eq!(grandchild.key(), "[2][1]");
        assert_eq!(grandchild.child_key(3), "[2][1][3]");
        assert_eq!(grandchild.ancestry().len(), 2);
    }

    #[test]
    fn test_curve_input() {
        let root = ParsingContext::default();
        let direct = root.concat(2, Ancestor::Curve).unwrap();
        assert!(direct.is_curve_input());

        let nested = root
            .concat(3, Ancestor::LetResult)
            .and_then(|ctx| ctx.concat(1, Ancestor::Coalesce))
            .and_then(|ctx| ctx.concat(2, Ancestor::Curve))
            .unwrap();
        assert!(nested.is_curve_input());

        let output = root.concat(4, Ancestor::Curve).unwrap();
        assert!(!output.is_curve_input());

        let in_binding = root
            .concat(2, Ancestor::LetBinding)
            .and_then(|ctx| ctx.concat(2, Ancestor::Curve))
            .unwrap();
        assert!(!in_binding.is_curve_input());

        let in_operator = root
            .concat(2, Ancestor::Compound("+"))
            .unwrap();
        assert!(!in_operator.is_curve_input());
    }

    #[test]
    fn test_max_depth() {
        let root = ParsingContext::new(1);
        let child = root.concat(1, Ancestor::Case).unwrap();
        let err = child.concat(1, Ancestor::Case).unwrap_err();
        assert_eq!(
            err,
            ParsingError::MaxDepthExceeded {
                key: "[1][1]".to_string(),
                max: 1
            }
        );
    }

    #[test]
    fn test_ancestor_tags() {
        assert_eq!(Ancestor::LetResult.to_string(), "let.result");
        assert_eq!(Ancestor::Compound("+").to_string(), "compound:+");
    }
}
