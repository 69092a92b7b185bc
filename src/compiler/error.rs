//! Errors raised while lowering a checked tree

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use thiserror::Error;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Lowering failure; only reachable when a tree skipped type checking
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Node without a resolved type
    #[error("Expression at {} has not been type checked", display_key(.key))]
    Unchecked {
        /// Key of the node
        key: String,
    },

    /// Reference with no enclosing binding
    #[error("Reference \"{name}\" at {} is not bound by an enclosing let", display_key(.key))]
    UnresolvedReference {
        /// Key of the reference
        key: String,
        /// Referenced name
        name: String,
    },
}

fn display_key(key: &str) -> &str {
    if key.is_empty() { "<root>" } else { key }
}

impl CompileError {
    /// Key of the offending node
    pub fn key(&self) -> &str {
        match self {
            CompileError::Unchecked { key } | CompileError::UnresolvedReference { key, .. } => key,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            CompileError::Unchecked { .. } => DiagnosticCode::Unchecked,
            CompileError::UnresolvedReference { .. } => DiagnosticCode::UndefinedVariable,
        };
        Diagnostic::error(code, self.to_string(), self.key())
    }
}
