//! Diagnostic system for style expression errors
//!
//! Every parse, type, compile and evaluation error converts into a
//! [`Diagnostic`] carrying a stable code and the key of the offending node.

#![warn(missing_docs)]

pub mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
