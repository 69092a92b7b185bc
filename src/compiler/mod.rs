//! Compiler module for style expressions
//!
//! Lowers a type-checked expression tree into closures that evaluate it
//! against a feature, a zoom level and host-supplied map properties.

pub mod compiler;
pub mod error;

pub use compiler::{CompiledExpr, CompiledExpression, compile, compiled};
pub use error::{CompileError, CompileResult};
