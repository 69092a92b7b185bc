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

//! Type errors collected by the checker

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::model::Type;
use thiserror::Error;

/// Type error; checking continues so that every failing node reports once
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    /// No signature of an operator accepts the argument types
    #[error("{}Expected arguments for \"{operator}\" of type {expected}, but found {actual} instead", prefix(.key))]
    NoMatchingSignature {
        /// Key of the operator node
        key: String,
        /// Operator name
        operator: String,
        /// Accepted signatures, e.g. `(number, number) | (string, string)`
        expected: String,
        /// Argument types found, e.g. `(number, string)`
        actual: String,
    },

    /// Expression of the wrong type for its position
    #[error("{}Expected {expected} but found {actual} instead", prefix(.key))]
    Mismatch {
        /// Key of the offending node
        key: String,
        /// Required type
        expected: Type,
        /// Type found
        actual: Type,
    },

    /// Reference to a name no enclosing `let` binds
    #[error("{}Unknown variable \"{name}\"", prefix(.key))]
    UnboundReference {
        /// Key of the reference
        key: String,
        /// Referenced name
        name: String,
    },

    /// Interpolated curve whose outputs cannot be interpolated
    #[error("{}Type {ty} is not interpolatable; use a \"step\" curve instead", prefix(.key))]
    NotInterpolatable {
        /// Key of the curve
        key: String,
        /// Output type of the curve
        ty: Type,
    },
}

fn prefix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{key}: ")
    }
}

impl TypeError {
    /// Key of the offending node
    pub fn key(&self) -> &str {
        match self {
            TypeError::NoMatchingSignature { key, .. }
            | TypeError::Mismatch { key, .. }
            | TypeError::UnboundReference { key, .. }
            | TypeError::NotInterpolatable { key, .. } => key,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            TypeError::NoMatchingSignature { .. } => DiagnosticCode::NoMatchingSignature,
            TypeError::Mismatch { .. } => DiagnosticCode::TypeMismatch,
            TypeError::UnboundReference { .. } => DiagnosticCode::UndefinedVariable,
            TypeError::NotInterpolatable { .. } => DiagnosticCode::NotInterpolatable,
        };
        let text = self.to_string();
        let message = text.strip_prefix(&prefix(self.key())).unwrap_or(&text);
        Diagnostic::error(code, message, self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_and_diagnostic() {
        let error = TypeError::NoMatchingSignature {
            key: "[2]".to_string(),
            operator: "==".to_string(),
            expected: "(number, number)".to_string(),
            actual: "(number, string)".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "[2]: Expected arguments for \"==\" of type (number, number), but found (number, string) instead"
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, DiagnosticCode::NoMatchingSignature);
        assert_eq!(diagnostic.key, "[2]");
        assert!(diagnostic.message.starts_with("Expected arguments"));
    }

    #[test]
    fn test_root_key_has_no_prefix() {
        let error = TypeError::Mismatch {
            key: String::new(),
            expected: Type::Color,
            actual: Type::Number,
        };
        assert_eq!(error.to_string(), "Expected color but found number instead");
    }
}
