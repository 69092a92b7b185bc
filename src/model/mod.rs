//! Data model for style expressions
//!
//! Static types, runtime values, colors and the feature records that
//! compiled expressions are evaluated against.

#![warn(missing_docs)]

pub mod color;
pub mod feature;
pub mod types;
pub mod value;

pub use color::Color;
pub use feature::{Feature, GeometryType};
pub use types::{ArrayType, Type};
pub use value::{PropertyMap, Value};
