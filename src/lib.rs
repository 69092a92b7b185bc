//! Style expressions in Rust
//!
//! A compiler for the JSON expression language used to compute data-driven
//! map styling values. Expressions are parsed into a typed tree, checked
//! against operator signatures and lowered into closures evaluated per
//! feature and zoom level.
//!
//! ```
//! use serde_json::json;
//! use style_expressions::{ExpressionEngine, Feature, PropertyMap, Value};
//!
//! let engine = ExpressionEngine::new();
//! let compiled = engine
//!     .parse_and_compile(&json!(["let", "a", 5, "b", 10, ["+", "a", "b"]]))
//!     .unwrap();
//! let value = compiled.evaluate(&Feature::default(), 0.0, &PropertyMap::new());
//! assert_eq!(value, Ok(Value::Number(15.0)));
//! ```

pub mod analyzer;
pub mod ast;
pub mod compiler;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod registry;

// Re-export main types
pub use analyzer::TypeError;
pub use ast::ExpressionNode;
pub use compiler::{CompileError, CompiledExpression};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use engine::{EngineConfig, ExpressionEngine};
pub use error::ExpressionError;
pub use evaluator::{EvaluationContext, EvaluationError};
pub use model::{Color, Feature, GeometryType, PropertyMap, Type, Value};
pub use parser::{ParsingError, parse};
pub use registry::{OperatorRegistry, registry};

#[cfg(test)]
pub(crate) mod test_utils {
    use serde_json::Value as JsonValue;

    use crate::analyzer::{self, TypeError};
    use crate::engine::ExpressionEngine;
    use crate::evaluator::EvaluationError;
    use crate::model::{Feature, PropertyMap, Value};
    use crate::parser::parse;

    /// Compile `expr` and evaluate it against an empty feature at zoom 0
    pub fn eval(expr: &JsonValue) -> Result<Value, EvaluationError> {
        eval_with(expr, JsonValue::Object(Default::default()))
    }

    /// Compile `expr` and evaluate it against a feature with `properties`
    pub fn eval_with(expr: &JsonValue, properties: JsonValue) -> Result<Value, EvaluationError> {
        let compiled = ExpressionEngine::new()
            .parse_and_compile(expr)
            .unwrap_or_else(|errors| panic!("{expr} did not compile: {errors:?}"));
        compiled.evaluate(&Feature::from_json(&properties), 0.0, &PropertyMap::new())
    }

    /// Type errors of a structurally valid expression
    pub fn check_errors(expr: &JsonValue) -> Vec<TypeError> {
        let node = parse(expr).unwrap_or_else(|error| panic!("{expr} did not parse: {error}"));
        analyzer::check(&node, None).err().unwrap_or_default()
    }
}
