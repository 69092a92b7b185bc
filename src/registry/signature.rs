//! Operator signatures and overload resolution

use std::fmt;

use crate::model::Type;

/// One accepted argument-type pattern of an operator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    /// Exactly these parameter types, in order
    Fixed(Vec<Type>),
    /// Any number of arguments of one type, with a minimum count
    Variadic {
        /// Type of every argument
        ty: Type,
        /// Minimum number of arguments
        min: usize,
    },
}

impl Signature {
    /// Create a fixed-arity signature
    pub fn fixed(parameters: impl Into<Vec<Type>>) -> Self {
        Signature::Fixed(parameters.into())
    }

    /// Create a signature with no parameters
    pub fn nullary() -> Self {
        Signature::Fixed(Vec::new())
    }

    /// Create a repeated-type signature
    pub fn variadic(ty: Type, min: usize) -> Self {
        Signature::Variadic { ty, min }
    }

    /// Check if this signature accepts the given number of arguments
    pub fn accepts_arity(&self, count: usize) -> bool {
        match self {
            Signature::Fixed(parameters) => parameters.len() == count,
            Signature::Variadic { min, .. } => count >= *min,
        }
    }

    /// Declared parameter type for each of `count` argument positions
    pub fn expand(&self, count: usize) -> Vec<Type> {
        match self {
            Signature::Fixed(parameters) => parameters.clone(),
            Signature::Variadic { ty, .. } => vec![ty.clone(); count],
        }
    }

    /// Check if this signature matches the given argument types
    pub fn matches(&self, arg_types: &[Type]) -> bool {
        if !self.accepts_arity(arg_types.len()) {
            return false;
        }
        match self {
            Signature::Fixed(parameters) => parameters
                .iter()
                .zip(arg_types)
                .all(|(declared, actual)| declared.is_compatible(actual)),
            Signature::Variadic { ty, .. } => arg_types.iter().all(|actual| ty.is_compatible(actual)),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Fixed(parameters) => write!(f, "({})", join_types(parameters)),
            Signature::Variadic { ty, .. } => write!(f, "({ty}...)"),
        }
    }
}

/// Render a list of types as `number, string`
pub fn join_types(types: &[Type]) -> String {
    types
        .iter()
        .map(Type::type_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render alternatives as `(number, number) | (string, string)`
pub fn join_signatures(signatures: &[Signature]) -> String {
    signatures
        .iter()
        .map(Signature::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Pick the first signature, in declaration order, accepting the argument types
///
/// Returns the index of the signature and the declared parameter type of
/// every argument position.
pub fn resolve_overload(signatures: &[Signature], arg_types: &[Type]) -> Option<(usize, Vec<Type>)> {
    signatures
        .iter()
        .position(|signature| signature.matches(arg_types))
        .map(|index| (index, signatures[index].expand(arg_types.len())))
}
