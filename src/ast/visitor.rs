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

//! Pre-order traversal of expression trees

use smallvec::SmallVec;

use super::expression::{ExpressionKind, ExpressionNode};

impl ExpressionNode {
    /// Direct sub-expressions in evaluation order
    pub fn children(&self) -> SmallVec<[&ExpressionNode; 8]> {
        let mut children = SmallVec::new();
        match &self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::Reference(_) => {}
            ExpressionKind::Let(data) => {
                children.extend(data.bindings.iter().map(|(_, value)| value));
                children.push(&data.result);
            }
            ExpressionKind::Case(data) => {
                for (condition, output) in &data.branches {
                    children.push(condition);
                    children.push(output);
                }
                children.push(&data.otherwise);
            }
            ExpressionKind::Match(data) => {
                children.push(&data.input);
                children.extend(data.branches.iter().map(|branch| &branch.output));
                children.push(&data.otherwise);
            }
            ExpressionKind::Coalesce(branches) => children.extend(branches.iter()),
            ExpressionKind::Curve(data) => {
                children.push(&data.input);
                children.extend(data.stops.iter().map(|(_, output)| output));
            }
            ExpressionKind::Compound(data) => children.extend(data.args.iter()),
        }
        children
    }

    /// Visit this node, then every descendant, in pre-order
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&ExpressionNode),
    {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Whether any node in the tree satisfies the predicate
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&ExpressionNode) -> bool,
    {
        let mut found = false;
        self.visit(&mut |node| found = found || predicate(node));
        found
    }

    /// Whether the tree reads the zoom level
    pub fn is_zoom_dependent(&self) -> bool {
        self.any(|node| node.operator_name() == Some("zoom"))
    }

    /// Whether the tree reads feature data
    pub fn is_feature_dependent(&self) -> bool {
        self.any(|node| match &node.kind {
            ExpressionKind::Compound(data) => match data.descriptor.name {
                "get" | "has" => data.args.len() == 1,
                "properties" | "geometry_type" | "id" => true,
                _ => false,
            },
            _ => false,
        })
    }
}
