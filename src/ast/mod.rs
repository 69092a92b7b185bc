//! Expression tree definitions
//!
//! Nodes are produced by the parser, copied with resolved types by the
//! type checker, and consumed by the compiler.

#![warn(missing_docs)]

mod expression;
mod serialize;
mod visitor;

pub use expression::*;
