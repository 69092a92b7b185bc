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

//! Conversion of expression trees back to their JSON form

use serde_json::Value as JsonValue;

use super::expression::{ExpressionKind, ExpressionNode};
use crate::model::Value;
use crate::model::value::number_to_json;

impl ExpressionNode {
    /// Serialize the tree to the nested-array form it was parsed from
    ///
    /// Array and object constants are wrapped in `["literal", ...]`, as are
    /// string constants that would otherwise be read back as a binding name.
    pub fn serialize(&self) -> JsonValue {
        let mut bound = Vec::new();
        self.serialize_in(&mut bound)
    }

    fn serialize_in<'a>(&'a self, bound: &mut Vec<&'a str>) -> JsonValue {
        match &self.kind {
            ExpressionKind::Literal(value) => serialize_literal(value, bound),
            ExpressionKind::Reference(name) => JsonValue::String(name.clone()),
            ExpressionKind::Let(data) => {
                let mut out = vec![JsonValue::from("let")];
                let depth = bound.len();
                for (name, value) in &data.bindings {
                    out.push(JsonValue::String(name.clone()));
                    out.push(value.serialize_in(bound));
                    bound.push(name);
                }
                out.push(data.result.serialize_in(bound));
                bound.truncate(depth);
                JsonValue::Array(out)
            }
            ExpressionKind::Case(data) => {
                let mut out = vec![JsonValue::from("case")];
                for (condition, output) in &data.branches {
                    out.push(condition.serialize_in(bound));
                    out.push(output.serialize_in(bound));
                }
                out.push(data.otherwise.serialize_in(bound));
                JsonValue::Array(out)
            }
            ExpressionKind::Match(data) => {
                let mut out = vec![JsonValue::from("match"), data.input.serialize_in(bound)];
                for branch in &data.branches {
                    let labels: Vec<JsonValue> =
                        branch.labels.iter().map(|label| label.to_json()).collect();
                    match (branch.grouped, labels.as_slice()) {
                        (false, [single]) => out.push(single.clone()),
                        _ => out.push(JsonValue::Array(labels)),
                    }
                    out.push(branch.output.serialize_in(bound));
                }
                out.push(data.otherwise.serialize_in(bound));
                JsonValue::Array(out)
            }
            ExpressionKind::Coalesce(branches) => {
                let mut out = vec![JsonValue::from("coalesce")];
                out.extend(branches.iter().map(|branch| branch.serialize_in(bound)));
                JsonValue::Array(out)
            }
            ExpressionKind::Curve(data) => {
                let mut out = vec![
                    JsonValue::from("curve"),
                    data.interpolation.to_json(),
                    data.input.serialize_in(bound),
                ];
                for (stop, output) in &data.stops {
                    out.push(number_to_json(*stop));
                    out.push(output.serialize_in(bound));
                }
                JsonValue::Array(out)
            }
            ExpressionKind::Compound(data) => {
                let mut out = vec![JsonValue::from(data.descriptor.name)];
                out.extend(data.options.iter().cloned());
                out.extend(data.args.iter().map(|arg| arg.serialize_in(bound)));
                JsonValue::Array(out)
            }
        }
    }
}

fn serialize_literal(value: &Value, bound: &[&str]) -> JsonValue {
    let wrap = match value {
        Value::Array(_) | Value::Object(_) => true,
        Value::String(s) => bound.contains(&s.as_str()),
        _ => false,
    };
    if wrap {
        JsonValue::Array(vec![JsonValue::from("literal"), value.to_json()])
    } else {
        value.to_json()
    }
}
