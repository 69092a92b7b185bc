//! Expression engine - the main entry point for compiling style expressions

use serde_json::Value as JsonValue;

use crate::analyzer;
use crate::ast::ExpressionNode;
use crate::compiler::{self, CompileResult, CompiledExpression};
use crate::diagnostics::Diagnostic;
use crate::error::{ExpressionError, Result};
use crate::model::Type;
use crate::parser::{DEFAULT_MAX_DEPTH, ParsingContext, parse_expression};

/// Configuration for the expression engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum nesting depth accepted by the parser
    pub max_depth: usize,
    /// Type the root expression must produce, if any
    pub expected_type: Option<Type>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            expected_type: None,
        }
    }
}

impl EngineConfig {
    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Require the root expression to produce `ty`
    pub fn with_expected_type(mut self, ty: Type) -> Self {
        self.expected_type = Some(ty);
        self
    }
}

/// Parses, checks and compiles expressions
#[derive(Debug, Clone, Default)]
pub struct ExpressionEngine {
    config: EngineConfig,
}

impl ExpressionEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse and type check a raw expression
    ///
    /// A structural error stops parsing and is returned alone; type errors
    /// are all collected.
    pub fn parse(&self, raw: &JsonValue) -> Result<ExpressionNode> {
        let context = ParsingContext::new(self.config.max_depth);
        let parsed = parse_expression(raw, &context).map_err(|error| {
            log::debug!("parse failed: {error}");
            vec![ExpressionError::from(error)]
        })?;

        analyzer::check(&parsed, self.config.expected_type.as_ref()).map_err(|errors| {
            log::debug!("type check failed with {} error(s)", errors.len());
            errors.into_iter().map(ExpressionError::from).collect()
        })
    }

    /// Compile a checked tree
    pub fn compile(&self, node: &ExpressionNode) -> CompileResult<CompiledExpression> {
        compiler::compile(node)
    }

    /// Parse, check and compile in one step
    pub fn parse_and_compile(&self, raw: &JsonValue) -> Result<CompiledExpression> {
        let checked = self.parse(raw)?;
        self.compile(&checked)
            .map_err(|error| vec![ExpressionError::from(error)])
    }

    /// Every diagnostic for a raw expression; empty when it compiles
    pub fn diagnose(&self, raw: &JsonValue) -> Vec<Diagnostic> {
        match self.parse_and_compile(raw) {
            Ok(_) => Vec::new(),
            Err(errors) => errors.iter().map(ExpressionError::to_diagnostic).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use crate::model::{Feature, PropertyMap, Value};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_and_evaluate() {
        let engine = ExpressionEngine::new();
        let compiled = engine
            .parse_and_compile(&json!(["concat", "a", "b", "c"]))
            .unwrap();
        assert_eq!(
            compiled.evaluate(&Feature::default(), 0.0, &PropertyMap::new()),
            Ok(Value::string("abc"))
        );
    }

    #[test]
    fn test_structural_error_is_alone() {
        let engine = ExpressionEngine::new();
        let errors = engine.parse(&json!(["+", ["nope"], ["-", "a", 1]])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ExpressionError::Parse(_)));
        assert_eq!(errors[0].key(), "[1]");
    }

    #[test]
    fn test_type_errors_collected() {
        let engine = ExpressionEngine::new();
        let errors = engine
            .parse(&json!(["case", ["==", 1, "a"], ["-", "b", 1], 2]))
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ExpressionError::Type(_))));
    }

    #[test]
    fn test_expected_type() {
        let engine = ExpressionEngine::with_config(EngineConfig::default().with_expected_type(Type::Color));
        assert!(engine.parse(&json!(["rgb", 0, 0, 0])).is_ok());
        assert!(engine.parse(&json!("red")).is_err());
    }

    #[test]
    fn test_max_depth() {
        let engine = ExpressionEngine::with_config(EngineConfig::default().with_max_depth(2));
        assert!(engine.parse(&json!(["+", ["+", 1, 2], 3])).is_ok());
        let errors = engine.parse(&json!(["+", ["+", ["+", ["-", 1, 1], 2], 3], 4])).unwrap_err();
        assert!(matches!(errors[0], ExpressionError::Parse(_)));
    }

    #[test]
    fn test_diagnose() {
        let engine = ExpressionEngine::new();
        assert!(engine.diagnose(&json!(["+", 1, 2])).is_empty());

        let diagnostics = engine.diagnose(&json!(["let", "get", 1, ["+", "get", 1]]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ReservedName);
        assert_eq!(diagnostics[0].key, "[1]");
    }
}
