//! Operator registry for style expressions
//!
//! A fixed table of operator descriptors, built once on first use and never
//! mutated afterwards. Special form names live alongside the operators so
//! that every name the parser dispatches on is reserved.

#![warn(missing_docs)]

pub mod descriptor;
pub mod operators;
pub mod signature;

pub use descriptor::{
    CustomParse, LowerFn, Lowering, OperatorCategory, OperatorDescriptor, ResultType,
};
pub use signature::{Signature, resolve_overload};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Expressions with their own parse and evaluation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialForm {
    /// `let`
    Let,
    /// `literal`
    Literal,
    /// `case`
    Case,
    /// `match`
    Match,
    /// `coalesce`
    Coalesce,
    /// `curve`
    Curve,
}

impl SpecialForm {
    /// Every special form
    pub const ALL: [SpecialForm; 6] = [
        SpecialForm::Let,
        SpecialForm::Literal,
        SpecialForm::Case,
        SpecialForm::Match,
        SpecialForm::Coalesce,
        SpecialForm::Curve,
    ];

    /// Look up a special form by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|form| form.name() == name)
    }

    /// Name as written in expressions
    pub fn name(&self) -> &'static str {
        match self {
            SpecialForm::Let => "let",
            SpecialForm::Literal => "literal",
            SpecialForm::Case => "case",
            SpecialForm::Match => "match",
            SpecialForm::Coalesce => "coalesce",
            SpecialForm::Curve => "curve",
        }
    }
}

/// Registry of operator descriptors
pub struct OperatorRegistry {
    operators: FxHashMap<&'static str, OperatorDescriptor>,
}

impl OperatorRegistry {
    /// Create a registry holding every built-in operator
    pub fn new() -> Self {
        let mut registry = Self {
            operators: FxHashMap::default(),
        };
        operators::register_builtin_operators(&mut registry);
        log::debug!("operator registry built with {} operators", registry.len());
        registry
    }

    /// Register an operator, replacing any previous one with the same name
    pub fn register(&mut self, descriptor: OperatorDescriptor) {
        self.operators.insert(descriptor.name, descriptor);
    }

    /// Look up an operator by name
    pub fn get(&self, name: &str) -> Option<&OperatorDescriptor> {
        self.operators.get(name)
    }

    /// Check if an operator exists
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Whether `name` is an operator or special form name
    pub fn is_reserved(&self, name: &str) -> bool {
        self.contains(name) || SpecialForm::from_name(name).is_some()
    }

    /// Operator names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Operators of one category, sorted by name
    pub fn by_category(&self, category: OperatorCategory) -> Vec<&OperatorDescriptor> {
        let mut found: Vec<_> = self
            .operators
            .values()
            .filter(|descriptor| descriptor.category == category)
            .collect();
        found.sort_unstable_by_key(|descriptor| descriptor.name);
        found
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry, built before the first parse
pub static OPERATORS: Lazy<OperatorRegistry> = Lazy::new(OperatorRegistry::new);

/// The process-wide registry
pub fn registry() -> &'static OperatorRegistry {
    &OPERATORS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        let registry = registry();
        assert!(registry.is_reserved("get"));
        assert!(registry.is_reserved("let"));
        assert!(registry.is_reserved("zoom"));
        assert!(!registry.is_reserved("population"));
        assert!(registry.get("let").is_none());
    }

    #[test]
    fn test_builtin_operators() {
        let names = registry().names();
        for name in [
            "pi", "e", "ln2", "log10", "ln", "log2", "sin", "cos", "tan", "asin", "acos", "atan",
            "+", "*", "-", "/", "%", "^", "==", "!=", ">", "<", ">=", "<=", "&&", "||", "!",
            "string", "number", "boolean", "object", "array", "to_string", "to_number",
            "to_boolean", "typeof", "parse_color", "rgb", "rgba", "to_rgba", "get", "has",
            "length", "at", "properties", "geometry_type", "id", "zoom", "upcase", "downcase",
            "concat",
        ] {
            assert!(names.contains(&name), "missing operator {name}");
        }
    }

    #[test]
    fn test_categories() {
        let comparison = registry().by_category(OperatorCategory::Comparison);
        assert_eq!(comparison.len(), 6);
        assert!(comparison.iter().all(|d| d.signatures.len() == 4));
    }

    #[test]
    fn test_special_forms() {
        assert_eq!(SpecialForm::from_name("curve"), Some(SpecialForm::Curve));
        assert_eq!(SpecialForm::from_name("zoom"), None);
    }
}
