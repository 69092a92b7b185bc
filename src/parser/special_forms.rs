//! Parse routines of the special forms

use serde_json::Value as JsonValue;

use super::context::{Ancestor, ParsingContext};
use super::error::{ParseResult, ParsingError};
use super::parse_expression;
use crate::ast::{
    CaseData, CurveData, ExpressionKind, ExpressionNode, Interpolation, LetData, MatchBranch,
    MatchData, MatchLabel,
};
use crate::model::Value;
use crate::registry::SpecialForm;

pub(super) fn parse(
    form: SpecialForm,
    args: &[JsonValue],
    context: &ParsingContext,
) -> ParseResult<ExpressionNode> {
    match form {
        SpecialForm::Let => parse_let(args, context),
        SpecialForm::Literal => parse_literal(args, context),
        SpecialForm::Case => parse_case(args, context),
        SpecialForm::Match => parse_match(args, context),
        SpecialForm::Coalesce => parse_coalesce(args, context),
        SpecialForm::Curve => parse_curve(args, context),
    }
}

fn arity_error(form: SpecialForm, expected: &str, actual: usize, context: &ParsingContext) -> ParsingError {
    ParsingError::InvalidArity {
        key: context.key(),
        operator: form.name().to_string(),
        expected: expected.to_string(),
        actual,
    }
}

/// `["let", name, value, ..., result]`
fn parse_let(args: &[JsonValue], context: &ParsingContext) -> ParseResult<ExpressionNode> {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(arity_error(
            SpecialForm::Let,
            "name/value pairs followed by a result",
            args.len(),
            context,
        ));
    }

    let (pairs, result) = args.split_at(args.len() - 1);
    let mut scope = context.scope().clone();
    let mut bindings = Vec::with_capacity(pairs.len() / 2);

    for (i, pair) in pairs.chunks(2).enumerate() {
        let name_index = 1 + i * 2;
        let JsonValue::String(name) = &pair[0] else {
            return Err(ParsingError::InvalidLiteral {
                key: context.child_key(name_index),
                message: "Binding names must be string literals".to_string(),
            });
        };
        if context.is_reserved(name) {
            return Err(ParsingError::ReservedName {
                key: context.child_key(name_index),
                name: name.clone(),
            });
        }

        let value_context = context
            .concat(name_index + 1, Ancestor::LetBinding)?
            .with_scope(scope.clone());
        let value = parse_expression(&pair[1], &value_context)?;
        scope = scope.bind(name.clone(), value.clone());
        bindings.push((name.clone(), value));
    }

    let result_context = context
        .concat(args.len(), Ancestor::LetResult)?
        .with_scope(scope);
    let result = parse_expression(&result[0], &result_context)?;

    Ok(ExpressionNode::new(
        context.key(),
        ExpressionKind::Let(Box::new(LetData { bindings, result })),
    ))
}

/// `["literal", json]`
fn parse_literal(args: &[JsonValue], context: &ParsingContext) -> ParseResult<ExpressionNode> {
    match args {
        [value] => Ok(ExpressionNode::literal(context.key(), Value::from(value))),
        _ => Err(arity_error(SpecialForm::Literal, "exactly one argument", args.len(), context)),
    }
}

/// `["case", condition, output, ..., otherwise]`
fn parse_case(args: &[JsonValue], context: &ParsingContext) -> ParseResult<ExpressionNode> {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(arity_error(
            SpecialForm::Case,
            "condition/output pairs followed by a fallback",
            args.len(),
            context,
        ));
    }

    let (pairs, otherwise) = args.split_at(args.len() - 1);
    let mut branches = Vec::with_capacity(pairs.len() / 2);
    for (i, pair) in pairs.chunks(2).enumerate() {
        let index = 1 + i * 2;
        let condition = parse_expression(&pair[0], &context.concat(index, Ancestor::Case)?)?;
        let output = parse_expression(&pair[1], &context.concat(index + 1, Ancestor::Case)?)?;
        branches.push((condition, output));
    }
    let otherwise = parse_expression(&otherwise[0], &context.concat(args.len(), Ancestor::Case)?)?;

    Ok(ExpressionNode::new(
        context.key(),
        ExpressionKind::Case(Box::new(CaseData { branches, otherwise })),
    ))
}

/// `["match", input, label, output, ..., otherwise]`
fn parse_match(args: &[JsonValue], context: &ParsingContext) -> ParseResult<ExpressionNode> {
    if args.len() < 4 || args.len() % 2 == 1 {
        return Err(arity_error(
            SpecialForm::Match,
            "an input, label/output pairs and a fallback",
            args.len(),
            context,
        ));
    }

    let input = parse_expression(&args[0], &context.concat(1, Ancestor::Match)?)?;
    let (pairs, otherwise) = args[1..].split_at(args.len() - 2);

    let mut seen: Vec<MatchLabel> = Vec::new();
    let mut branches = Vec::with_capacity(pairs.len() / 2);
    for (i, pair) in pairs.chunks(2).enumerate() {
        let index = 2 + i * 2;
        let label_key = context.child_key(index);
        let (labels, grouped) = parse_labels(&pair[0], &label_key)?;

        for label in &labels {
            if let Some(first) = seen.first() {
                if first.label_type() != label.label_type() {
                    return Err(ParsingError::InvalidLiteral {
                        key: label_key,
                        message: "Branch labels must all be of the same type".to_string(),
                    });
                }
            }
            if seen.contains(label) {
                return Err(ParsingError::DuplicateLabel {
                    key: label_key,
                    label: label.to_json().to_string(),
                });
            }
            seen.push(label.clone());
        }

        let output = parse_expression(&pair[1], &context.concat(index + 1, Ancestor::Match)?)?;
        branches.push(MatchBranch {
            labels,
            grouped,
            output,
        });
    }
    let otherwise =
        parse_expression(&otherwise[0], &context.concat(args.len(), Ancestor::Match)?)?;

    Ok(ExpressionNode::new(
        context.key(),
        ExpressionKind::Match(Box::new(MatchData {
            input,
            branches,
            otherwise,
        })),
    ))
}

fn parse_label(raw: &JsonValue, key: &str) -> ParseResult<MatchLabel> {
    match raw {
        JsonValue::Number(n) => Ok(MatchLabel::Number(n.as_f64().unwrap_or(f64::NAN))),
        JsonValue::String(s) => Ok(MatchLabel::String(s.clone())),
        _ => Err(ParsingError::InvalidLiteral {
            key: key.to_string(),
            message: "Branch labels must be numbers or strings".to_string(),
        }),
    }
}

fn parse_labels(raw: &JsonValue, key: &str) -> ParseResult<(Vec<MatchLabel>, bool)> {
    match raw {
        JsonValue::Array(items) if items.is_empty() => Err(ParsingError::InvalidLiteral {
            key: key.to_string(),
            message: "Expected at least one branch label".to_string(),
        }),
        JsonValue::Array(items) => {
            let labels = items
                .iter()
                .map(|item| parse_label(item, key))
                .collect::<ParseResult<Vec<_>>>()?;
            Ok((labels, true))
        }
        _ => Ok((vec![parse_label(raw, key)?], false)),
    }
}

/// `["coalesce", branch, ...]`
fn parse_coalesce(args: &[JsonValue], context: &ParsingContext) -> ParseResult<ExpressionNode> {
    if args.is_empty() {
        return Err(arity_error(SpecialForm::Coalesce, "at least one argument", 0, context));
    }

    let branches = args
        .iter()
        .enumerate()
        .map(|(i, arg)| parse_expression(arg, &context.concat(i + 1, Ancestor::Coalesce)?))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(ExpressionNode::new(context.key(), ExpressionKind::Coalesce(branches)))
}

/// `["curve", interpolation, input, stop, output, ...]`
fn parse_curve(args: &[JsonValue], context: &ParsingContext) -> ParseResult<ExpressionNode> {
    if args.len() < 4 || args.len() % 2 == 1 {
        return Err(arity_error(
            SpecialForm::Curve,
            "an interpolation, an input and at least one stop/output pair",
            args.len(),
            context,
        ));
    }

    let interpolation = parse_interpolation(&args[0], &context.child_key(1))?;
    let input = parse_expression(&args[1], &context.concat(2, Ancestor::Curve)?)?;

    let mut stops: Vec<(f64, ExpressionNode)> = Vec::with_capacity((args.len() - 2) / 2);
    for (i, pair) in args[2..].chunks(2).enumerate() {
        let index = 3 + i * 2;
        let Some(stop) = pair[0].as_f64() else {
            return Err(ParsingError::InvalidLiteral {
                key: context.child_key(index),
                message: "Curve stop inputs must be number literals".to_string(),
            });
        };
        if stops.last().is_some_and(|(previous, _)| stop <= *previous) {
            return Err(ParsingError::UnsortedStops {
                key: context.child_key(index),
            });
        }
        let output = parse_expression(&pair[1], &context.concat(index + 1, Ancestor::Curve)?)?;
        stops.push((stop, output));
    }

    Ok(ExpressionNode::new(
        context.key(),
        ExpressionKind::Curve(Box::new(CurveData {
            interpolation,
            input,
            stops,
        })),
    ))
}

fn parse_interpolation(raw: &JsonValue, key: &str) -> ParseResult<Interpolation> {
    let invalid = |message: &str| ParsingError::InvalidInterpolation {
        key: key.to_string(),
        message: message.to_string(),
    };

    let Some(items) = raw.as_array() else {
        return Err(invalid(
            "Expected an interpolation such as [\"linear\"], [\"step\"] or [\"exponential\", base]",
        ));
    };
    match items.as_slice() {
        [JsonValue::String(name)] if name == "step" => Ok(Interpolation::Step),
        [JsonValue::String(name)] if name == "linear" => Ok(Interpolation::Linear),
        [JsonValue::String(name), base] if name == "exponential" => match base.as_f64() {
            Some(base) if base > 0.0 => Ok(Interpolation::Exponential(base)),
            _ => Err(invalid("Exponential interpolation requires a positive numeric base")),
        },
        [JsonValue::String(name), ..] => Err(invalid(&format!("Unknown interpolation type {name}"))),
        _ => Err(invalid("Interpolation must be an array headed by its type name")),
    }
}
