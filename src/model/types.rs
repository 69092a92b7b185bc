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

//! Type system definitions for style expressions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of an expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// The `null` value
    Null,
    /// 64-bit floating point number
    Number,
    /// UTF-8 string
    String,
    /// Boolean value (true/false)
    Boolean,
    /// RGBA color
    Color,
    /// String-keyed map of values
    Object,
    /// Top type, accepts a value of any other type
    Value,
    /// Array with an item type and an optional fixed length
    Array(ArrayType),
}

/// Item type and length of an array type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayType {
    /// Type of every item; `Value` when unconstrained
    pub item: Box<Type>,
    /// Fixed length, if known
    pub length: Option<usize>,
}

impl Type {
    /// Create an array type
    pub fn array(item: Type, length: Option<usize>) -> Self {
        Type::Array(ArrayType {
            item: Box::new(item),
            length,
        })
    }

    /// Array type accepting any array
    pub fn any_array() -> Self {
        Type::array(Type::Value, None)
    }

    /// Check whether a value of type `actual` may be used where `self` is declared.
    ///
    /// `value` accepts anything. An array declared with item type `value` and
    /// no length accepts any array; otherwise the item types must be compatible
    /// and a declared length must match exactly.
    pub fn is_compatible(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Value, _) => true,
            (Type::Array(declared), Type::Array(actual)) => {
                let items_match = declared.item.is_compatible(&actual.item);
                let length_matches = match declared.length {
                    Some(n) => actual.length == Some(n),
                    None => true,
                };
                items_match && length_matches
            }
            _ => self == actual,
        }
    }

    /// Pick the type accepting both `self` and `other`, if either accepts the other
    pub fn unify(&self, other: &Type) -> Option<Type> {
        if self.is_compatible(other) {
            Some(self.clone())
        } else if other.is_compatible(self) {
            Some(other.clone())
        } else {
            None
        }
    }

    /// Element type if this is an array type
    pub fn item_type(&self) -> Option<&Type> {
        match self {
            Type::Array(array) => Some(&array.item),
            _ => None,
        }
    }

    /// Whether a curve may interpolate between two values of this type
    pub fn is_interpolatable(&self) -> bool {
        match self {
            Type::Number | Type::Color => true,
            Type::Array(array) => *array.item == Type::Number && array.length.is_some(),
            _ => false,
        }
    }

    /// Name used in diagnostics and by `typeof`
    pub fn type_name(&self) -> String {
        match self {
            Type::Null => "null".to_string(),
            Type::Number => "number".to_string(),
            Type::String => "string".to_string(),
            Type::Boolean => "boolean".to_string(),
            Type::Color => "color".to_string(),
            Type::Object => "object".to_string(),
            Type::Value => "value".to_string(),
            Type::Array(array) => match (array.item.as_ref(), array.length) {
                (Type::Value, None) => "array".to_string(),
                (item, None) => format!("array<{item}>"),
                (item, Some(n)) => format!("array<{item}, {n}>"),
            },
        }
    }

    /// Parse the item type names accepted by the `array` assertion
    pub fn from_item_name(name: &str) -> Option<Type> {
        match name {
            "string" => Some(Type::String),
            "number" => Some(Type::Number),
            "boolean" => Some(Type::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accepts_everything() {
        assert!(Type::Value.is_compatible(&Type::Number));
        assert!(Type::Value.is_compatible(&Type::array(Type::String, Some(2))));
        assert!(!Type::Number.is_compatible(&Type::Value));
    }

    #[test]
    fn test_array_compatibility() {
        let any = Type::any_array();
        let numbers = Type::array(Type::Number, None);
        let pair = Type::array(Type::Number, Some(2));

        assert!(any.is_compatible(&pair));
        assert!(numbers.is_compatible(&pair));
        assert!(!pair.is_compatible(&numbers));
        assert!(!pair.is_compatible(&Type::array(Type::Number, Some(3))));
        assert!(!numbers.is_compatible(&Type::array(Type::String, None)));
        assert!(!any.is_compatible(&Type::String));
    }

    #[test]
    fn test_unify() {
        assert_eq!(Type::Number.unify(&Type::Value), Some(Type::Value));
        assert_eq!(Type::Value.unify(&Type::Number), Some(Type::Value));
        assert_eq!(Type::Number.unify(&Type::Number), Some(Type::Number));
        assert_eq!(Type::Number.unify(&Type::String), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Type::any_array().to_string(), "array");
        assert_eq!(Type::array(Type::Number, None).to_string(), "array<number>");
        assert_eq!(
            Type::array(Type::Number, Some(4)).to_string(),
            "array<number, 4>"
        );
    }

    #[test]
    fn test_interpolatable() {
        assert!(Type::Number.is_interpolatable());
        assert!(Type::Color.is_interpolatable());
        assert!(Type::array(Type::Number, Some(2)).is_interpolatable());
        assert!(!Type::array(Type::Number, None).is_interpolatable());
        assert!(!Type::String.is_interpolatable());
    }
}
