//! Lexical scope of `let` bindings

use std::sync::Arc;

use crate::ast::ExpressionNode;

/// Ordered name bindings plus the enclosing scope
///
/// Scopes are immutable and shared; binding a name produces a child scope.
/// Lookup is innermost-first, so later bindings shadow earlier ones.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: Vec<(String, ExpressionNode)>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Create an empty root scope
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Child scope holding `bindings`, in order
    pub fn extend(self: &Arc<Self>, bindings: Vec<(String, ExpressionNode)>) -> Arc<Self> {
        Arc::new(Self {
            bindings,
            parent: Some(Arc::clone(self)),
        })
    }

    /// Child scope holding a single binding
    pub fn bind(self: &Arc<Self>, name: impl Into<String>, value: ExpressionNode) -> Arc<Self> {
        self.extend(vec![(name.into(), value)])
    }

    /// Innermost binding of `name`
    pub fn get(&self, name: &str) -> Option<&ExpressionNode> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.get(name)))
    }

    /// Whether `name` is bound here or in an enclosing scope
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Visible names, innermost first, without shadowed duplicates
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            for (name, _) in current.bindings.iter().rev() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            scope = current.parent.as_deref();
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn number(n: f64) -> ExpressionNode {
        ExpressionNode::literal("", Value::Number(n))
    }

    #[test]
    fn test_shadowing() {
        let root = Scope::new();
        let outer = root.bind("a", number(1.0));
        let inner = outer.bind("a", number(2.0)).bind("b", number(3.0));

        assert_eq!(inner.get("a"), Some(&number(2.0)));
        assert_eq!(outer.get("a"), Some(&number(1.0)));
        assert!(inner.contains("b"));
        assert!(!outer.contains("b"));
        assert!(!root.contains("a"));
        assert_eq!(inner.names(), vec!["b", "a"]);
    }

    #[test]
    fn test_extend_keeps_order() {
        let scope = Scope::new().extend(vec![
            ("x".to_string(), number(1.0)),
            ("x".to_string(), number(2.0)),
        ]);
        assert_eq!(scope.get("x"), Some(&number(2.0)));
    }
}
