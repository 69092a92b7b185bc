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

//! Helper primitives compiled expressions call at evaluation time
//!
//! Property access, runtime type assertions, the total coercion functions
//! and color construction. Every fallible helper takes the key of the node
//! it runs for, so errors point back at the source expression.

use super::error::{EvaluationError, EvaluationResult};
use crate::model::{Color, PropertyMap, Type, Value};

/// Read `property` from `object`
///
/// With an error context (e.g. `feature.properties`) a missing property is
/// an error; without one it reads as null.
pub fn lookup(
    object: &PropertyMap,
    property: &str,
    context: Option<&str>,
    key: &str,
) -> EvaluationResult<Value> {
    match (object.get(property), context) {
        (Some(value), _) => Ok(value.clone()),
        (None, None) => Ok(Value::Null),
        (None, Some(context)) => Err(EvaluationError::PropertyNotFound {
            key: key.to_string(),
            property: property.to_string(),
            context: context.to_string(),
        }),
    }
}

/// Whether `object` has `property`
pub fn contains(object: &PropertyMap, property: &str) -> bool {
    object.contains_key(property)
}

/// Pass `value` through if it is an instance of `expected`, fail otherwise
pub fn assert_type(value: Value, expected: &Type, key: &str) -> EvaluationResult<Value> {
    if is_instance(&value, expected) {
        Ok(value)
    } else {
        Err(EvaluationError::AssertionFailed {
            key: key.to_string(),
            expected: expected.type_name(),
            actual: value.type_of().type_name(),
        })
    }
}

/// Whether a runtime value inhabits a static type
pub fn is_instance(value: &Value, ty: &Type) -> bool {
    match (ty, value) {
        (Type::Value, _) => true,
        (Type::Null, Value::Null)
        | (Type::Number, Value::Number(_))
        | (Type::String, Value::String(_))
        | (Type::Boolean, Value::Boolean(_))
        | (Type::Color, Value::Color(_))
        | (Type::Object, Value::Object(_)) => true,
        (Type::Array(array), Value::Array(items)) => {
            array.length.is_none_or(|n| n == items.len())
                && items.iter().all(|item| is_instance(item, &array.item))
        }
        _ => false,
    }
}

/// Coerce to a string
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Color(c) => c.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_json().to_string(),
    }
}

/// Format a number the way it is written in expressions: `3`, `0.5`, `1e-7`, `NaN`
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if !(1e-6..1e21).contains(&n.abs()) {
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Coerce to a number
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Boolean(true) => 1.0,
        Value::Boolean(false) => 0.0,
        Value::Number(n) => *n,
        Value::String(s) => parse_number(s),
        Value::Color(_) | Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    match s {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) =>
        {
            s.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Coerce to a boolean
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Color(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a CSS color string
pub fn parse_color(input: &str, key: &str) -> EvaluationResult<Color> {
    Color::parse(input).ok_or_else(|| EvaluationError::InvalidColor {
        key: key.to_string(),
        input: input.to_string(),
    })
}

/// Build a color from 0-255 channels and an optional unit alpha (default opaque)
pub fn make_color(r: f64, g: f64, b: f64, a: Option<f64>) -> Color {
    Color::from_rgba8(r, g, b, a.unwrap_or(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn props() -> PropertyMap {
        let mut map = PropertyMap::new();
        map.insert("x".to_string(), Value::Number(7.0));
        map
    }

    #[test]
    fn test_lookup() {
        let map = props();
        assert_eq!(
            lookup(&map, "x", Some("feature.properties"), "").unwrap(),
            Value::Number(7.0)
        );
        assert_eq!(lookup(&map, "y", None, "[1]").unwrap(), Value::Null);
        let err = lookup(&map, "y", Some("feature.properties"), "[1]").unwrap_err();
        assert_eq!(err.key(), "[1]");
        assert!(contains(&map, "x"));
        assert!(!contains(&map, "y"));
    }

    #[test]
    fn test_assert_type() {
        let pair = Value::from(json!([1, 2]));
        assert!(assert_type(pair.clone(), &Type::array(Type::Number, Some(2)), "").is_ok());
        assert!(assert_type(pair.clone(), &Type::array(Type::Number, Some(3)), "").is_err());
        assert!(assert_type(pair, &Type::array(Type::String, None), "").is_err());
        assert!(assert_type(Value::from(json!([])), &Type::array(Type::Number, None), "").is_ok());

        let err = assert_type(Value::string("a"), &Type::Number, "[2]").unwrap_err();
        assert_eq!(
            err,
            EvaluationError::AssertionFailed {
                key: "[2]".to_string(),
                expected: "number".to_string(),
                actual: "string".to_string(),
            }
        );
    }

    #[rstest]
    #[case(Value::Null, "")]
    #[case(Value::Boolean(true), "true")]
    #[case(Value::Number(3.0), "3")]
    #[case(Value::Number(-0.0), "0")]
    #[case(Value::Number(0.5), "0.5")]
    #[case(Value::Number(1e-7), "1e-7")]
    #[case(Value::Number(-2.5e-9), "-2.5e-9")]
    #[case(Value::Number(0.000001), "0.000001")]
    #[case(Value::Number(1.5e21), "1.5e+21")]
    #[case(Value::Number(123456.0), "123456")]
    #[case(Value::Number(f64::NAN), "NaN")]
    #[case(Value::Number(f64::NEG_INFINITY), "-Infinity")]
    #[case(Value::Color(Color::new(1.0, 0.0, 0.0, 1.0)), "rgba(255, 0, 0, 1)")]
    #[case(Value::from(json!([1, "a"])), "[1,\"a\"]")]
    fn test_to_string(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(to_string(&value), expected);
    }

    #[rstest]
    #[case(Value::Null, 0.0)]
    #[case(Value::Boolean(true), 1.0)]
    #[case(Value::string(""), 0.0)]
    #[case(Value::string("  42 "), 42.0)]
    #[case(Value::string("1e3"), 1000.0)]
    #[case(Value::string("-Infinity"), f64::NEG_INFINITY)]
    fn test_to_number(#[case] value: Value, #[case] expected: f64) {
        assert_eq!(to_number(&value), expected);
    }

    #[rstest]
    #[case(Value::string("abc"))]
    #[case(Value::string("inf"))]
    #[case(Value::string("1.2.3"))]
    #[case(Value::from(json!({"a": 1})))]
    fn test_to_number_nan(#[case] value: Value) {
        assert!(to_number(&value).is_nan());
    }

    #[rstest]
    #[case(Value::Null, false)]
    #[case(Value::Number(0.0), false)]
    #[case(Value::Number(f64::NAN), false)]
    #[case(Value::Number(2.0), true)]
    #[case(Value::string(""), false)]
    #[case(Value::string("false"), true)]
    #[case(Value::from(json!([])), true)]
    fn test_to_boolean(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(to_boolean(&value), expected);
    }

    #[test]
    fn test_colors() {
        assert_eq!(make_color(255.0, 0.0, 0.0, None), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(parse_color("red", "").unwrap(), Color::new(1.0, 0.0, 0.0, 1.0));
        assert!(matches!(
            parse_color("nope", "[1]"),
            Err(EvaluationError::InvalidColor { .. })
        ));
    }
}
