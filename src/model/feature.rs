// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Feature records supplied by the host for evaluation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::value::{PropertyMap, Value};

/// Geometry kind of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryType {
    /// Geometry could not be determined
    #[default]
    Unknown,
    /// Point or multi-point
    Point,
    /// Line string or multi-line string
    LineString,
    /// Polygon or multi-polygon
    Polygon,
}

impl GeometryType {
    /// Name reported by the `geometry_type` operator
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Unknown => "Unknown",
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single data record being styled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    /// Property map read by `get`, `has` and `properties`
    pub properties: Arc<PropertyMap>,
    /// Feature identifier, if any
    pub id: Option<Value>,
    /// Geometry kind
    pub geometry_type: GeometryType,
}

impl Feature {
    /// Create a feature from a property map
    pub fn new(properties: PropertyMap) -> Self {
        Self {
            properties: Arc::new(properties),
            ..Self::default()
        }
    }

    /// Create a feature from a JSON object; non-object input yields empty properties
    pub fn from_json(properties: &serde_json::Value) -> Self {
        match Value::from(properties) {
            Value::Object(map) => Self {
                properties: map,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the geometry kind
    pub fn with_geometry_type(mut self, geometry_type: GeometryType) -> Self {
        self.geometry_type = geometry_type;
        self
    }
}
