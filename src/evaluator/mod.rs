//! Runtime surface of compiled style expressions
//!
//! The evaluation context handed to every compiled closure, the runtime
//! error type, and the helper primitives lowering rules call into.

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod helpers;

pub use context::{EvaluationContext, Frame};
pub use error::{EvaluationError, EvaluationResult};
