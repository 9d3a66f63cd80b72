// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Combination boolean trees

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean operator that combines a path step into its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    /// Sentinel for the first step of a path, which has no parent
    TopLevel,
    Union,
    Intersect,
    Subtract,
    Xor,
}

impl BoolOp {
    /// Single-character operator as written in combination listings
    pub fn symbol(&self) -> &'static str {
        match self {
            BoolOp::TopLevel => "",
            BoolOp::Union => "u",
            BoolOp::Intersect => "+",
            BoolOp::Subtract => "-",
            BoolOp::Xor => "^",
        }
    }

    /// Parse an operator symbol (`u`, `U`, `+`, `-`, `^`)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "u" | "U" => Some(BoolOp::Union),
            "+" => Some(BoolOp::Intersect),
            "-" => Some(BoolOp::Subtract),
            "^" => Some(BoolOp::Xor),
            _ => None,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean tree of a combination
///
/// Leaves reference other objects by name and may carry the matrix applied
/// to the referenced object. Interior nodes are binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombTree {
    Leaf {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        matrix: Option<Matrix4<f64>>,
    },
    Union(Box<CombTree>, Box<CombTree>),
    Intersect(Box<CombTree>, Box<CombTree>),
    Subtract(Box<CombTree>, Box<CombTree>),
    Xor(Box<CombTree>, Box<CombTree>),
}

/// A leaf reference together with the operator it contributes to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLeaf<'a> {
    pub name: &'a str,
    pub op: BoolOp,
    pub matrix: Option<&'a Matrix4<f64>>,
}

impl CombTree {
    pub fn leaf(name: impl Into<String>) -> Self {
        CombTree::Leaf {
            name: name.into(),
            matrix: None,
        }
    }

    pub fn leaf_with_matrix(name: impl Into<String>, matrix: Matrix4<f64>) -> Self {
        CombTree::Leaf {
            name: name.into(),
            matrix: Some(matrix),
        }
    }

    /// Combine two subtrees with the given operator
    pub fn combine(op: BoolOp, left: CombTree, right: CombTree) -> Self {
        let (left, right) = (Box::new(left), Box::new(right));
        match op {
            BoolOp::Intersect => CombTree::Intersect(left, right),
            BoolOp::Subtract => CombTree::Subtract(left, right),
            BoolOp::Xor => CombTree::Xor(left, right),
            BoolOp::Union | BoolOp::TopLevel => CombTree::Union(left, right),
        }
    }

    /// Build a left-deep tree from an ordered member list, e.g.
    /// `[(u, "a"), (-, "b"), (+, "c")]` becomes `((a - b) + c)`.
    ///
    /// The operator of the first member is ignored. Returns `None` for an
    /// empty list.
    pub fn from_members(members: &[(BoolOp, &str)]) -> Option<Self> {
        let mut iter = members.iter();
        let (_, first) = iter.next()?;
        let tree = iter.fold(CombTree::leaf(*first), |acc, (op, name)| {
            CombTree::combine(*op, acc, CombTree::leaf(*name))
        });
        Some(tree)
    }

    /// All leaves in tree order.
    ///
    /// The leftmost operand of every interior node inherits the operator of
    /// its parent position (`Union` at the root); the right operand takes
    /// the interior node's own operator.
    pub fn leaves(&self) -> Vec<TreeLeaf<'_>> {
        let mut leaves = Vec::new();
        self.collect_leaves(BoolOp::Union, &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, op: BoolOp, out: &mut Vec<TreeLeaf<'a>>) {
        match self {
            CombTree::Leaf { name, matrix } => out.push(TreeLeaf {
                name,
                op,
                matrix: matrix.as_ref(),
            }),
            CombTree::Union(left, right) => {
                left.collect_leaves(op, out);
                right.collect_leaves(BoolOp::Union, out);
            }
            CombTree::Intersect(left, right) => {
                left.collect_leaves(op, out);
                right.collect_leaves(BoolOp::Intersect, out);
            }
            CombTree::Subtract(left, right) => {
                left.collect_leaves(op, out);
                right.collect_leaves(BoolOp::Subtract, out);
            }
            CombTree::Xor(left, right) => {
                left.collect_leaves(op, out);
                right.collect_leaves(BoolOp::Xor, out);
            }
        }
    }

    /// Number of leaf references in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            CombTree::Leaf { .. } => 1,
            CombTree::Union(left, right)
            | CombTree::Intersect(left, right)
            | CombTree::Subtract(left, right)
            | CombTree::Xor(left, right) => left.leaf_count() + right.leaf_count(),
        }
    }
}
