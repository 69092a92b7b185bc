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

//! Type assertions, coercions and reflection

use serde_json::Value as JsonValue;
use smallvec::smallvec;

use crate::ast::{CompoundData, ExpressionKind, ExpressionNode};
use crate::compiler::{CompiledExpr, compiled};
use crate::evaluator::helpers;
use crate::model::{Type, Value};
use crate::parser::{Ancestor, ParseResult, ParsingContext, ParsingError, parse_expression};
use crate::registry::{
    Lowering, OperatorCategory, OperatorDescriptor, OperatorRegistry, ResultType, Signature,
};

/// Register assertions, coercions and `typeof`
pub(super) fn register_type_operators(registry: &mut OperatorRegistry) {
    for (name, ty) in [
        ("string", Type::String),
        ("number", Type::Number),
        ("boolean", Type::Boolean),
        ("object", Type::Object),
    ] {
        registry.register(OperatorDescriptor::new(
            name,
            OperatorCategory::Assertion,
            ResultType::Fixed(ty),
            vec![Signature::fixed([Type::Value])],
            lower_assertion,
        ));
    }

    registry.register(
        OperatorDescriptor::new(
            "array",
            OperatorCategory::Assertion,
            ResultType::Fixed(Type::any_array()),
            vec![Signature::fixed([Type::Value])],
            lower_assertion,
        )
        .with_parse(parse_array),
    );

    registry.register(OperatorDescriptor::new(
        "to_string",
        OperatorCategory::Coercion,
        ResultType::Fixed(Type::String),
        vec![Signature::fixed([Type::Value])],
        lower_to_string,
    ));
    registry.register(OperatorDescriptor::new(
        "to_number",
        OperatorCategory::Coercion,
        ResultType::Fixed(Type::Number),
        vec![Signature::fixed([Type::Value])],
        lower_to_number,
    ));
    registry.register(OperatorDescriptor::new(
        "to_boolean",
        OperatorCategory::Coercion,
        ResultType::Fixed(Type::Boolean),
        vec![Signature::fixed([Type::Value])],
        lower_to_boolean,
    ));

    registry.register(OperatorDescriptor::new(
        "typeof",
        OperatorCategory::Reflection,
        ResultType::Fixed(Type::String),
        vec![Signature::fixed([Type::Value])],
        lower_typeof,
    ));
}

/// `["array", value]`, `["array", itemType, value]` or `["array", itemType, length, value]`
fn parse_array(
    descriptor: &'static OperatorDescriptor,
    args: &[JsonValue],
    context: &ParsingContext,
) -> ParseResult<ExpressionNode> {
    let Some((value, options)) = args.split_last().filter(|(_, options)| options.len() <= 2)
    else {
        return Err(ParsingError::InvalidArity {
            key: context.key(),
            operator: descriptor.name.to_string(),
            expected: "an optional item type, an optional length and a value".to_string(),
            actual: args.len(),
        });
    };

    let item = match options.first() {
        None => Type::Value,
        Some(raw) => raw.as_str().and_then(Type::from_item_name).ok_or_else(|| {
            ParsingError::InvalidArrayType {
                key: context.child_key(1),
                message: "The item type argument to \"array\" must be one of string, number, boolean"
                    .to_string(),
            }
        })?,
    };

    let length = match options.get(1) {
        None => None,
        Some(raw) => match raw.as_f64() {
            Some(n) if n >= 0.0 && n.fract() == 0.0 => Some(n as usize),
            _ => {
                return Err(ParsingError::InvalidArrayType {
                    key: context.child_key(2),
                    message: "The length argument to \"array\" must be a non-negative integer literal"
                        .to_string(),
                });
            }
        },
    };

    let value_context = context.concat(args.len(), Ancestor::Compound(descriptor.name))?;
    let value = parse_expression(value, &value_context)?;

    Ok(ExpressionNode::new(
        context.key(),
        ExpressionKind::Compound(Box::new(CompoundData {
            descriptor,
            options: options.to_vec(),
            args: smallvec![value],
            result: Some(Type::array(item, length)),
        })),
    ))
}

/// Checks the runtime value against the node's own type
fn lower_assertion(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    let (ty, key) = (lowering.ty, lowering.key);
    compiled(move |ctx| helpers::assert_type(arg(ctx)?, &ty, &key))
}

fn lower_to_string(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::String(helpers::to_string(&arg(ctx)?))))
}

fn lower_to_number(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::Number(helpers::to_number(&arg(ctx)?))))
}

fn lower_to_boolean(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::Boolean(helpers::to_boolean(&arg(ctx)?))))
}

fn lower_typeof(lowering: Lowering) -> CompiledExpr {
    let arg = lowering.arg(0);
    compiled(move |ctx| Ok(Value::String(arg(ctx)?.type_of().type_name())))
}
