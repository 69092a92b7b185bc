//! Error types for style expression evaluation

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors raised while a compiled expression runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Property absent where the lookup assumes presence
    #[error("Property \"{property}\" not found in {context}{}", at(.key))]
    PropertyNotFound {
        /// Key of the failing node
        key: String,
        /// Property name
        property: String,
        /// Object the property was read from, e.g. `feature.properties`
        context: String,
    },

    /// Runtime value does not match an asserted type
    #[error("Expected value of type {expected}, found {actual}{}", at(.key))]
    AssertionFailed {
        /// Key of the failing node
        key: String,
        /// Asserted type
        expected: String,
        /// Type of the actual value
        actual: String,
    },

    /// String could not be parsed as a color
    #[error("Could not parse color from \"{input}\"{}", at(.key))]
    InvalidColor {
        /// Key of the failing node
        key: String,
        /// Offending input
        input: String,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for array of length {length}{}", at(.key))]
    IndexOutOfBounds {
        /// Key of the failing node
        key: String,
        /// Requested index
        index: f64,
        /// Array length
        length: usize,
    },

    /// Binding slot missing from the runtime frame
    #[error("No value bound to \"{name}\"{}", at(.key))]
    BindingNotFound {
        /// Key of the failing node
        key: String,
        /// Binding name
        name: String,
    },
}

fn at(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!(" at {key}")
    }
}

impl EvaluationError {
    /// Key of the node that raised the error
    pub fn key(&self) -> &str {
        match self {
            EvaluationError::PropertyNotFound { key, .. }
            | EvaluationError::AssertionFailed { key, .. }
            | EvaluationError::InvalidColor { key, .. }
            | EvaluationError::IndexOutOfBounds { key, .. }
            | EvaluationError::BindingNotFound { key, .. } => key,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            EvaluationError::PropertyNotFound { .. } => DiagnosticCode::PropertyNotFound,
            EvaluationError::AssertionFailed { .. } => DiagnosticCode::AssertionFailed,
            EvaluationError::InvalidColor { .. } => DiagnosticCode::InvalidColor,
            EvaluationError::IndexOutOfBounds { .. } => DiagnosticCode::IndexOutOfBounds,
            EvaluationError::BindingNotFound { .. } => DiagnosticCode::UndefinedVariable,
        };
        let text = self.to_string();
        let message = text.strip_suffix(&at(self.key())).unwrap_or(&text);
        Diagnostic::error(code, message, self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_includes_key() {
        let err = EvaluationError::PropertyNotFound {
            key: "[1]".to_string(),
            property: "x".to_string(),
            context: "feature.properties".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Property \"x\" not found in feature.properties at [1]"
        );
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code, DiagnosticCode::PropertyNotFound);
        assert_eq!(diagnostic.message, "Property \"x\" not found in feature.properties");
    }

    #[test]
    fn test_root_key_omitted() {
        let err = EvaluationError::InvalidColor {
            key: String::new(),
            input: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "Could not parse color from \"nope\"");
    }
}
