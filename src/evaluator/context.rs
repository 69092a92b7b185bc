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

//! Runtime context passed to compiled expressions

use crate::model::{Feature, PropertyMap, Value};

/// Values bound by one `let`, linked to the frames of enclosing `let`s
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Values of the bindings evaluated so far, in declaration order
    pub values: &'a [Value],
    /// Frame of the enclosing `let`
    pub parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    /// Walk `depth` frames outward and read slot `index`
    pub fn get(&self, depth: usize, index: usize) -> Option<&'a Value> {
        let mut frame = self;
        for _ in 0..depth {
            frame = frame.parent?;
        }
        frame.values.get(index)
    }
}

/// Everything a compiled expression may read while it runs
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Feature being styled
    pub feature: &'a Feature,
    /// Current zoom level
    pub zoom: f64,
    /// Auxiliary properties supplied by the host
    pub map_properties: &'a PropertyMap,
    /// Innermost `let` frame
    pub frame: Option<&'a Frame<'a>>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context with no bindings
    pub fn new(feature: &'a Feature, zoom: f64, map_properties: &'a PropertyMap) -> Self {
        Self {
            feature,
            zoom,
            map_properties,
            frame: None,
        }
    }

    /// New frame over `values` whose parent is the current innermost frame
    pub fn child_frame<'b>(&self, values: &'b [Value]) -> Frame<'b>
    where
        'a: 'b,
    {
        Frame {
            values,
            parent: self.frame,
        }
    }

    /// Copy of this context with `frame` as the innermost frame
    pub fn with_frame<'b>(&self, frame: &'b Frame<'b>) -> EvaluationContext<'b>
    where
        'a: 'b,
    {
        EvaluationContext {
            feature: self.feature,
            zoom: self.zoom,
            map_properties: self.map_properties,
            frame: Some(frame),
        }
    }

    /// Value bound `depth` frames out at slot `index`
    pub fn binding(&self, depth: usize, index: usize) -> Option<&'a Value> {
        self.frame.and_then(|frame| frame.get(depth, index))
    }
}
