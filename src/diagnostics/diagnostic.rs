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

//! Core diagnostic types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Severity {
    /// Hint - subtle suggestion for improvement
    Hint,
    /// Information - provides helpful information
    #[default]
    Info,
    /// Warning - may indicate a problem but doesn't prevent evaluation
    Warning,
    /// Error - prevents successful compilation or evaluation
    Error,
}

/// Diagnostic error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Parsing errors
    /// Operator name not present in the registry
    UnknownOperator,
    /// Wrong number of arguments
    InvalidArity,
    /// Value of the wrong shape where an expression or literal was required
    InvalidLiteral,
    /// Binding name collides with an operator name
    ReservedName,
    /// Expression used outside of its allowed position
    InvalidPlacement,
    /// The same label appears twice in a `match`
    DuplicateLabel,
    /// Curve stop inputs are not strictly ascending
    UnsortedStops,
    /// Unknown or malformed curve interpolation
    InvalidInterpolation,
    /// Expression nesting exceeds the configured limit
    MaxDepthExceeded,

    // Type errors
    /// No declared signature accepts the argument types
    NoMatchingSignature,
    /// Type mismatch
    TypeMismatch,
    /// Curve outputs cannot be interpolated
    NotInterpolatable,
    /// Reference to a name with no binding in scope
    UndefinedVariable,

    // Compile errors
    /// Tree was compiled before being type checked
    Unchecked,

    // Runtime errors
    /// Property not found
    PropertyNotFound,
    /// Runtime value did not match an asserted type
    AssertionFailed,
    /// String could not be parsed as a color
    InvalidColor,
    /// Index out of bounds
    IndexOutOfBounds,
}

impl DiagnosticCode {
    /// Stable code string, e.g. `E101`
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::UnknownOperator => "E001",
            DiagnosticCode::InvalidArity => "E002",
            DiagnosticCode::InvalidLiteral => "E003",
            DiagnosticCode::ReservedName => "E004",
            DiagnosticCode::InvalidPlacement => "E005",
            DiagnosticCode::DuplicateLabel => "E006",
            DiagnosticCode::UnsortedStops => "E007",
            DiagnosticCode::InvalidInterpolation => "E008",
            DiagnosticCode::MaxDepthExceeded => "E009",
            DiagnosticCode::NoMatchingSignature => "E101",
            DiagnosticCode::TypeMismatch => "E102",
            DiagnosticCode::NotInterpolatable => "E103",
            DiagnosticCode::UndefinedVariable => "E104",
            DiagnosticCode::Unchecked => "E201",
            DiagnosticCode::PropertyNotFound => "E301",
            DiagnosticCode::AssertionFailed => "E302",
            DiagnosticCode::InvalidColor => "E303",
            DiagnosticCode::IndexOutOfBounds => "E304",
        }
    }
}

/// A diagnostic message attributed to an expression node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the diagnostic
    pub severity: Severity,
    /// Error code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Path of the offending node, e.g. `[2][1]`
    pub key: String,
    /// Simple contextual help message
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        code: DiagnosticCode,
        severity: Severity,
        message: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            key: key.into(),
            help: Self::generate_help(&code),
        }
    }

    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message, key)
    }

    /// Generate simple contextual help based on diagnostic code
    fn generate_help(code: &DiagnosticCode) -> Option<String> {
        match code {
            DiagnosticCode::ReservedName => {
                Some("Rename the binding; operator names cannot be bound".to_string())
            }
            DiagnosticCode::InvalidPlacement => {
                Some("Use [\"zoom\"] only as the input of a top-level curve".to_string())
            }
            DiagnosticCode::NoMatchingSignature => Some(
                "Wrap the argument in an assertion such as [\"number\", ...] or a coercion"
                    .to_string(),
            ),
            DiagnosticCode::UndefinedVariable => {
                Some("Define the name with let or check its spelling".to_string())
            }
            DiagnosticCode::PropertyNotFound => {
                Some("Guard the lookup with [\"has\", ...] or wrap it in coalesce".to_string())
            }
            _ => None,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key.is_empty() { "<root>" } else { &self.key };
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity,
            self.code.code(),
            key,
            self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, " (help: {help})")?;
        }
        Ok(())
    }
}
