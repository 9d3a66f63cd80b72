// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Search plans: compilation and evaluation

mod comparison;
mod compiler;
mod evaluator;
mod node;
mod options;
mod predicates;

pub use comparison::{CompareOp, Comparison, KeyValueFilter, NumericFilter, ValueMatcher};
pub use evaluator::{Evaluator, ExecHandler, SearchContext};
pub use node::{DepthRange, ExecTemplate, NodeKind, Plan, PlanNode};
pub use predicates::STANDARD_ATTRIBUTES;

use crate::error::CompileError;
use std::fmt;

/// A compiled query
#[derive(Debug, Clone)]
pub struct SearchPlan {
    nodes: Plan,
    has_exec: bool,
}

impl SearchPlan {
    /// Compile a pre-tokenized query
    pub fn compile<S: AsRef<str>>(args: &[S]) -> Result<Self, CompileError> {
        let nodes = compiler::compile(args)?;
        let has_exec = nodes.iter().any(PlanNode::contains_exec);
        Ok(Self { nodes, has_exec })
    }

    /// Compile a query string split on whitespace
    pub fn parse(query: &str) -> Result<Self, CompileError> {
        let args: Vec<&str> = query.split_whitespace().collect();
        Self::compile(&args)
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// Whether evaluating the plan may invoke an exec handler
    pub fn has_exec(&self) -> bool {
        self.has_exec
    }
}

impl fmt::Display for SearchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", node::PlanDisplay(&self.nodes))
    }
}
