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

//! Static analysis of parsed expressions
//!
//! The type checker lives on [`ExpressionNode::typecheck`](crate::ast::ExpressionNode::typecheck);
//! this module adds the error type and a root-level entry point.

pub mod error;
mod type_checker;

pub use error::TypeError;

use crate::ast::ExpressionNode;
use crate::model::Type;
use crate::parser::Scope;

/// Check a root expression, optionally against the type its host expects
pub fn check(node: &ExpressionNode, expected: Option<&Type>) -> Result<ExpressionNode, Vec<TypeError>> {
    let mut errors = Vec::new();
    let checked = node.typecheck(&Scope::new(), &mut errors);

    if let (Some(checked), Some(expected)) = (&checked, expected) {
        let actual = checked.ty.clone().unwrap_or(Type::Value);
        if !expected.is_compatible(&actual) {
            errors.push(TypeError::Mismatch {
                key: checked.key.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    match checked {
        Some(checked) if errors.is_empty() => Ok(checked),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    #[test]
    fn test_expected_root_type() {
        let node = parse(&json!(["rgb", 1, 2, 3])).unwrap();
        assert!(check(&node, Some(&Type::Color)).is_ok());
        assert!(check(&node, Some(&Type::Value)).is_ok());

        let errors = check(&node, Some(&Type::Number)).unwrap_err();
        assert_eq!(
            errors,
            vec![TypeError::Mismatch {
                key: String::new(),
                expected: Type::Number,
                actual: Type::Color,
            }]
        );
    }
}
