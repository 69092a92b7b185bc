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

//! Parser for JSON style expressions
//!
//! Turns a raw JSON value into an unchecked expression tree. Parsing is
//! structural and fail-fast: the first malformed element aborts with a
//! [`ParsingError`] carrying its key. Types are resolved afterwards by the
//! analyzer.

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod scope;
mod special_forms;

pub use context::{Ancestor, DEFAULT_MAX_DEPTH, ParsingContext};
pub use error::{ParseResult, ParsingError};
pub use scope::Scope;

use serde_json::Value as JsonValue;
use smallvec::SmallVec;

use crate::ast::{CompoundData, ExpressionKind, ExpressionNode};
use crate::model::Value;
use crate::registry::signature::join_signatures;
use crate::registry::{OperatorDescriptor, SpecialForm, registry};

/// Parse a raw expression at the position described by `context`
pub fn parse_expression(raw: &JsonValue, context: &ParsingContext) -> ParseResult<ExpressionNode> {
    match raw {
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => {
            Ok(ExpressionNode::literal(context.key(), Value::from(raw)))
        }
        JsonValue::String(s) if context.scope().contains(s) => Ok(ExpressionNode::new(
            context.key(),
            ExpressionKind::Reference(s.clone()),
        )),
        JsonValue::String(s) => Ok(ExpressionNode::literal(context.key(), Value::string(s))),
        JsonValue::Object(_) => Err(ParsingError::UnexpectedObject { key: context.key() }),
        JsonValue::Array(items) => {
            let Some((head, args)) = items.split_first() else {
                return Err(ParsingError::EmptyExpression { key: context.key() });
            };
            let JsonValue::String(name) = head else {
                return Err(ParsingError::InvalidOperatorName {
                    key: context.key(),
                    found: Value::from(head).kind_name().to_string(),
                });
            };

            if let Some(form) = SpecialForm::from_name(name) {
                log::trace!("parsing special form {name} at {:?}", context.key());
                return special_forms::parse(form, args, context);
            }

            let Some(descriptor) = registry().get(name) else {
                return Err(ParsingError::UnknownOperator {
                    key: context.key(),
                    name: name.clone(),
                });
            };
            log::trace!("parsing operator {name} at {:?}", context.key());
            match descriptor.custom_parse {
                Some(parse) => parse(descriptor, args, context),
                None => parse_compound(descriptor, args, context),
            }
        }
    }
}

/// Default parse routine for registry operators
///
/// Checks the argument count against every signature, then parses each
/// argument under a `compound:<name>` ancestor.
pub fn parse_compound(
    descriptor: &'static OperatorDescriptor,
    args: &[JsonValue],
    context: &ParsingContext,
) -> ParseResult<ExpressionNode> {
    if !descriptor.accepts_arity(args.len()) {
        return Err(ParsingError::InvalidArity {
            key: context.key(),
            operator: descriptor.name.to_string(),
            expected: format!("arguments {}", join_signatures(&descriptor.signatures)),
            actual: args.len(),
        });
    }

    let parsed = parse_arguments(descriptor, args, 1, context)?;
    Ok(ExpressionNode::new(
        context.key(),
        ExpressionKind::Compound(Box::new(CompoundData {
            descriptor,
            options: Vec::new(),
            args: parsed,
            result: None,
        })),
    ))
}

/// Parse `args` as the operator's sub-expressions, the first sitting at `first_index`
pub fn parse_arguments(
    descriptor: &'static OperatorDescriptor,
    args: &[JsonValue],
    first_index: usize,
    context: &ParsingContext,
) -> ParseResult<SmallVec<[ExpressionNode; 4]>> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            let child = context.concat(first_index + i, Ancestor::Compound(descriptor.name))?;
            parse_expression(arg, &child)
        })
        .collect()
}

/// Parse a root expression with an empty scope
pub fn parse(raw: &JsonValue) -> ParseResult<ExpressionNode> {
    parse_expression(raw, &ParsingContext::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_literals() {
        assert_eq!(parse(&json!(1.5)).unwrap().as_literal(), Some(&Value::Number(1.5)));
        assert_eq!(parse(&json!("a")).unwrap().as_literal(), Some(&Value::string("a")));
        assert_eq!(parse(&json!(null)).unwrap().as_literal(), Some(&Value::Null));
    }

    #[test]
    fn test_compound_keys() {
        let node = parse(&json!(["+", 1, ["get", "x"]])).unwrap();
        let ExpressionKind::Compound(data) = &node.kind else {
            panic!("expected compound");
        };
        assert_eq!(data.descriptor.name, "+");
        assert_eq!(data.args[0].key, "[1]");
        assert_eq!(data.args[1].key, "[2]");
        assert!(node.ty.is_none());
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            parse(&json!([])).unwrap_err(),
            ParsingError::EmptyExpression { key: String::new() }
        );
        assert_eq!(
            parse(&json!(["+", 1, ["nope"]])).unwrap_err(),
            ParsingError::UnknownOperator {
                key: "[2]".to_string(),
                name: "nope".to_string()
            }
        );
        assert!(matches!(
            parse(&json!([1, 2])),
            Err(ParsingError::InvalidOperatorName { .. })
        ));
        assert!(matches!(
            parse(&json!({"a": 1})),
            Err(ParsingError::UnexpectedObject { .. })
        ));
    }

    #[test]
    fn test_arity_is_structural() {
        let err = parse(&json!(["-", 1])).unwrap_err();
        assert!(matches!(err, ParsingError::InvalidArity { ref operator, actual: 1, .. } if operator == "-"));
        assert!(matches!(
            parse(&json!(["+"])),
            Err(ParsingError::InvalidArity { .. })
        ));
        assert!(parse(&json!(["concat"])).is_ok());
    }

    #[test]
    fn test_zoom_placement() {
        assert!(matches!(
            parse(&json!(["+", ["zoom"], 1])),
            Err(ParsingError::InvalidPlacement { ref key, .. }) if key == "[1]"
        ));
        assert!(parse(&json!(["curve", ["linear"], ["zoom"], 0, 1, 10, 100])).is_ok());
        assert!(parse(&json!(["zoom"])).is_err());
    }

    #[test]
    fn test_max_depth() {
        let context = ParsingContext::new(2);
        let raw = json!(["+", 1, ["+", 1, ["+", 1, 2]]]);
        assert!(matches!(
            parse_expression(&raw, &context),
            Err(ParsingError::MaxDepthExceeded { max: 2, .. })
        ));
    }
}
