// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Search plan node definitions

use super::comparison::{CompareOp, KeyValueFilter, NumericFilter};
use crate::db::BoolOp;
use glob::Pattern;
use regex::Regex;
use std::fmt;

/// A conjunction of nodes evaluated left to right
pub type Plan = Vec<PlanNode>;

/// Inclusive depth window attached to every plan node.
///
/// For ordinary predicates the window applies to the absolute depth of the
/// path under test. For `-above` and `-below` it bounds the distance
/// between the path and the ancestor or descendant being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRange {
    pub min: usize,
    pub max: usize,
}

impl DepthRange {
    pub const ANY: DepthRange = DepthRange {
        min: 0,
        max: usize::MAX,
    };

    /// Default window of `-above` and `-below`: strict ancestors/descendants
    pub const RELATIVE: DepthRange = DepthRange {
        min: 1,
        max: usize::MAX,
    };

    pub fn contains(&self, depth: usize) -> bool {
        self.min <= depth && depth <= self.max
    }

    /// Build a window from a `keyword<op>n` qualifier; `floor` is the
    /// default lower bound of the keyword
    pub fn from_qualifier(op: CompareOp, count: usize, floor: usize) -> Self {
        match op {
            CompareOp::Eq => DepthRange {
                min: count,
                max: count,
            },
            CompareOp::Gt => DepthRange {
                min: count.saturating_add(1),
                max: usize::MAX,
            },
            CompareOp::Ge => DepthRange {
                min: count,
                max: usize::MAX,
            },
            CompareOp::Lt => match count.checked_sub(1) {
                Some(max) => DepthRange { min: floor, max },
                // nothing is below zero
                None => DepthRange { min: 1, max: 0 },
            },
            CompareOp::Le => DepthRange {
                min: floor,
                max: count,
            },
        }
    }
}

impl fmt::Display for DepthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max == usize::MAX {
            write!(f, ">={}", self.min)
        } else if self.min == self.max {
            write!(f, "={}", self.min)
        } else {
            write!(f, "[{}..{}]", self.min, self.max)
        }
    }
}

/// `-exec` command template; `{}` is replaced by the match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecTemplate {
    argv: Vec<String>,
}

impl ExecTemplate {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Fresh argument vector with every `{}` replaced
    pub fn substitute(&self, replacement: &str) -> Vec<String> {
        self.argv
            .iter()
            .map(|arg| arg.replace("{}", replacement))
            .collect()
    }
}

/// Kind of a plan node. Composite kinds own their sub-plans.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Name(Pattern),
    IName(Pattern),
    Path(Pattern),
    Regex(Regex),
    IRegex(Regex),
    Attr(KeyValueFilter),
    Param(KeyValueFilter),
    StdAttr,
    Type(Pattern),
    Size(NumericFilter),
    Bool(BoolOp),
    Depth(NumericFilter),
    MinDepth(usize),
    MaxDepth(usize),
    NNodes(NumericFilter),
    Idn,
    Above(Plan),
    Below(Plan),
    Not(Plan),
    Or(Plan, Plan),
    Expr(Plan),
    Print,
    Exec(ExecTemplate),
}

/// A compiled plan node
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub kind: NodeKind,
    pub depth: DepthRange,
}

impl PlanNode {
    pub fn new(kind: NodeKind) -> Self {
        let depth = match kind {
            NodeKind::Above(_) | NodeKind::Below(_) => DepthRange::RELATIVE,
            _ => DepthRange::ANY,
        };
        Self { kind, depth }
    }

    pub fn with_depth(kind: NodeKind, depth: DepthRange) -> Self {
        Self { kind, depth }
    }

    fn has_default_depth(&self) -> bool {
        match self.kind {
            NodeKind::Above(_) | NodeKind::Below(_) => self.depth == DepthRange::RELATIVE,
            _ => self.depth == DepthRange::ANY,
        }
    }

    /// True if this node or any nested node is `-exec`
    pub fn contains_exec(&self) -> bool {
        match &self.kind {
            NodeKind::Exec(_) => true,
            NodeKind::Above(plan)
            | NodeKind::Below(plan)
            | NodeKind::Not(plan)
            | NodeKind::Expr(plan) => plan.iter().any(PlanNode::contains_exec),
            NodeKind::Or(left, right) => left
                .iter()
                .chain(right.iter())
                .any(PlanNode::contains_exec),
            _ => false,
        }
    }
}

pub(crate) struct PlanDisplay<'a>(pub &'a [PlanNode]);

impl fmt::Display for PlanDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, node) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qualifier = if self.has_default_depth() {
            String::new()
        } else {
            self.depth.to_string()
        };

        match &self.kind {
            NodeKind::Name(p) => write!(f, "-name{} {}", qualifier, p.as_str()),
            NodeKind::IName(p) => write!(f, "-iname{} {}", qualifier, p.as_str()),
            NodeKind::Path(p) => write!(f, "-path{} {}", qualifier, p.as_str()),
            NodeKind::Regex(r) => write!(f, "-regex{} {}", qualifier, r.as_str()),
            NodeKind::IRegex(r) => write!(f, "-iregex{} {}", qualifier, r.as_str()),
            NodeKind::Attr(filter) => write!(f, "-attr{} {}", qualifier, filter),
            NodeKind::Param(filter) => write!(f, "-param{} {}", qualifier, filter),
            NodeKind::StdAttr => write!(f, "-stdattr{}", qualifier),
            NodeKind::Type(p) => write!(f, "-type{} {}", qualifier, p.as_str()),
            NodeKind::Size(filter) => write!(f, "-size{} {}", qualifier, filter),
            NodeKind::Bool(op) => write!(f, "-bool{} {}", qualifier, op),
            NodeKind::Depth(filter) => write!(f, "-depth{} {}", qualifier, filter),
            NodeKind::MinDepth(n) => write!(f, "-mindepth{} {}", qualifier, n),
            NodeKind::MaxDepth(n) => write!(f, "-maxdepth{} {}", qualifier, n),
            NodeKind::NNodes(filter) => write!(f, "-nnodes{} {}", qualifier, filter),
            NodeKind::Idn => write!(f, "-idn{}", qualifier),
            NodeKind::Above(plan) => write!(f, "-above{} ( {} )", qualifier, PlanDisplay(plan)),
            NodeKind::Below(plan) => write!(f, "-below{} ( {} )", qualifier, PlanDisplay(plan)),
            NodeKind::Not(plan) => write!(f, "! ( {} )", PlanDisplay(plan)),
            NodeKind::Or(left, right) => write!(
                f,
                "( {} ) -o ( {} )",
                PlanDisplay(left),
                PlanDisplay(right)
            ),
            NodeKind::Expr(plan) => write!(f, "( {} )", PlanDisplay(plan)),
            NodeKind::Print => f.write_str("-print"),
            NodeKind::Exec(template) => write!(f, "-exec {} ;", template.argv().join(" ")),
        }
    }
}
