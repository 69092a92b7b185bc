//! Error types for the expression engine
//!
//! Each phase has its own error enum; [`ExpressionError`] wraps the ones
//! produced before an expression can run.

use thiserror::Error;

use crate::analyzer::TypeError;
use crate::compiler::CompileError;
use crate::diagnostics::Diagnostic;
use crate::parser::ParsingError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Vec<ExpressionError>>;

/// Error raised while turning JSON into a compiled expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Structural error
    #[error(transparent)]
    Parse(#[from] ParsingError),

    /// Type error
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Lowering error
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl ExpressionError {
    /// Key of the offending node
    pub fn key(&self) -> &str {
        match self {
            ExpressionError::Parse(error) => error.key(),
            ExpressionError::Type(error) => error.key(),
            ExpressionError::Compile(error) => error.key(),
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ExpressionError::Parse(error) => error.to_diagnostic(),
            ExpressionError::Type(error) => error.to_diagnostic(),
            ExpressionError::Compile(error) => error.to_diagnostic(),
        }
    }
}
