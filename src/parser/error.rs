//! Structural errors raised while parsing expressions

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParsingError>;

/// Structural error; aborts parsing of the expression immediately
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    /// Operator name not present in the registry
    #[error("{}Unknown expression \"{name}\"", prefix(.key))]
    UnknownOperator {
        /// Key of the offending node
        key: String,
        /// Operator name as written
        name: String,
    },

    /// Wrong number of arguments
    #[error("{}Expected {expected} for \"{operator}\", found {actual}", prefix(.key))]
    InvalidArity {
        /// Key of the offending node
        key: String,
        /// Operator or special form name
        operator: String,
        /// Accepted argument counts or signatures
        expected: String,
        /// Number of arguments found
        actual: usize,
    },

    /// `[]`
    #[error("{}Expected an array with at least one element", prefix(.key))]
    EmptyExpression {
        /// Key of the offending node
        key: String,
    },

    /// Array whose first element is not an operator name
    #[error("{}Expression name must be a string, found {found}", prefix(.key))]
    InvalidOperatorName {
        /// Key of the offending node
        key: String,
        /// Kind of value found instead
        found: String,
    },

    /// Bare JSON object where an expression was expected
    #[error("{}Bare objects are not expressions; wrap them as [\"literal\", {{...}}]", prefix(.key))]
    UnexpectedObject {
        /// Key of the offending node
        key: String,
    },

    /// Value of the wrong shape where a literal argument was required
    #[error("{}{message}", prefix(.key))]
    InvalidLiteral {
        /// Key of the offending element
        key: String,
        /// Description of the expected shape
        message: String,
    },

    /// Binding name collides with an operator name
    #[error("{}\"{name}\" is a reserved expression name and cannot be bound", prefix(.key))]
    ReservedName {
        /// Key of the binding name
        key: String,
        /// Binding name
        name: String,
    },

    /// Expression used outside of its allowed position
    #[error("{}{message}", prefix(.key))]
    InvalidPlacement {
        /// Key of the offending node
        key: String,
        /// Operator name
        operator: String,
        /// Description of the allowed placement
        message: String,
    },

    /// Label appearing in more than one `match` branch
    #[error("{}Branch labels must be unique, found duplicate {label}", prefix(.key))]
    DuplicateLabel {
        /// Key of the label
        key: String,
        /// Duplicated label
        label: String,
    },

    /// Curve stops not in strictly ascending order
    #[error("{}Input values for curve stops must be in strictly ascending order", prefix(.key))]
    UnsortedStops {
        /// Key of the offending stop
        key: String,
    },

    /// Unknown or malformed curve interpolation
    #[error("{}{message}", prefix(.key))]
    InvalidInterpolation {
        /// Key of the interpolation argument
        key: String,
        /// Description of the problem
        message: String,
    },

    /// Invalid item type or length argument of `array`
    #[error("{}{message}", prefix(.key))]
    InvalidArrayType {
        /// Key of the offending argument
        key: String,
        /// Description of the problem
        message: String,
    },

    /// Nesting deeper than the configured limit
    #[error("{}Expression nesting exceeds the maximum depth of {max}", prefix(.key))]
    MaxDepthExceeded {
        /// Key of the first node past the limit
        key: String,
        /// Configured limit
        max: usize,
    },
}

fn prefix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{key}: ")
    }
}

impl ParsingError {
    /// Key of the offending node
    pub fn key(&self) -> &str {
        match self {
            ParsingError::UnknownOperator { key, .. }
            | ParsingError::InvalidArity { key, .. }
            | ParsingError::EmptyExpression { key }
            | ParsingError::InvalidOperatorName { key, .. }
            | ParsingError::UnexpectedObject { key }
            | ParsingError::InvalidLiteral { key, .. }
            | ParsingError::ReservedName { key, .. }
            | ParsingError::InvalidPlacement { key, .. }
            | ParsingError::DuplicateLabel { key, .. }
            | ParsingError::UnsortedStops { key }
            | ParsingError::InvalidInterpolation { key, .. }
            | ParsingError::InvalidArrayType { key, .. }
            | ParsingError::MaxDepthExceeded { key, .. } => key,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            ParsingError::UnknownOperator { .. } => DiagnosticCode::UnknownOperator,
            ParsingError::InvalidArity { .. } => DiagnosticCode::InvalidArity,
            ParsingError::EmptyExpression { .. }
            | ParsingError::InvalidOperatorName { .. }
            | ParsingError::UnexpectedObject { .. }
            | ParsingError::InvalidLiteral { .. }
            | ParsingError::InvalidArrayType { .. } => DiagnosticCode::InvalidLiteral,
            ParsingError::ReservedName { .. } => DiagnosticCode::ReservedName,
            ParsingError::InvalidPlacement { .. } => DiagnosticCode::InvalidPlacement,
            ParsingError::DuplicateLabel { .. } => DiagnosticCode::DuplicateLabel,
            ParsingError::UnsortedStops { .. } => DiagnosticCode::UnsortedStops,
            ParsingError::InvalidInterpolation { .. } => DiagnosticCode::InvalidInterpolation,
            ParsingError::MaxDepthExceeded { .. } => DiagnosticCode::MaxDepthExceeded,
        };
        let text = self.to_string();
        let message = text.strip_prefix(&prefix(self.key())).unwrap_or(&text);
        Diagnostic::error(code, message, self.key())
    }
}
