// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plan evaluation against full paths

use super::node::{DepthRange, ExecTemplate, NodeKind, PlanNode};
use super::predicates;
use crate::db::Database;
use crate::path::{FullPath, TreeWalker};
use crate::results::ResultSink;
use crate::search::SearchFlags;
use log::{debug, trace};

/// Callback that runs an `-exec` command line
pub trait ExecHandler {
    /// Run the fully substituted argument vector; `true` means success
    fn exec(&mut self, argv: &[String]) -> bool;
}

impl<F> ExecHandler for F
where
    F: FnMut(&[String]) -> bool,
{
    fn exec(&mut self, argv: &[String]) -> bool {
        self(argv)
    }
}

/// Per-path evaluation state
#[derive(Debug, Clone)]
pub struct SearchContext<'a> {
    pub path: &'a FullPath,
    /// Index of `path` in the evaluator's universe, when it came from there
    pub position: Option<usize>,
    pub flags: SearchFlags,
    /// Cleared by every failing predicate
    pub matched_filters: bool,
    /// Set when `-above` found no matching ancestor; only a negation
    /// clears it
    pub ancestor_miss: bool,
}

impl<'a> SearchContext<'a> {
    pub fn new(path: &'a FullPath, flags: SearchFlags) -> Self {
        Self {
            path,
            position: None,
            flags,
            matched_filters: true,
            ancestor_miss: false,
        }
    }

    /// Whether the path may still be reported
    pub fn is_match(&self) -> bool {
        self.matched_filters && !self.ancestor_miss
    }
}

/// Evaluates plans for one search
///
/// Nested evaluations for `-above` and `-below` run without a result sink
/// or exec handler.
pub struct Evaluator<'a, 'h> {
    db: &'a dyn Database,
    universe: Option<&'a [FullPath]>,
    results: Option<&'a mut ResultSink>,
    exec: Option<&'a mut (dyn ExecHandler + 'h)>,
}

impl<'a, 'h> Evaluator<'a, 'h> {
    /// `universe` is the set of paths `-below` searches; without one,
    /// descendants are enumerated on demand
    pub fn new(db: &'a dyn Database, universe: Option<&'a [FullPath]>) -> Self {
        Self {
            db,
            universe,
            results: None,
            exec: None,
        }
    }

    pub fn with_results(mut self, results: &'a mut ResultSink) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_exec(mut self, exec: &'a mut (dyn ExecHandler + 'h)) -> Self {
        self.exec = Some(exec);
        self
    }

    fn nested(&self) -> Evaluator<'a, 'h> {
        Evaluator::new(self.db, self.universe)
    }

    /// Evaluate `plan` for a single path. True when the plan succeeded and
    /// the path was not disqualified along the way.
    pub fn matches(&mut self, plan: &[PlanNode], path: &FullPath, flags: SearchFlags) -> bool {
        self.matches_path(plan, path, None, flags)
    }

    /// Like [`Evaluator::matches`] for the universe path at `index`; lets
    /// `-below` scan only the contiguous run of descendants after it
    pub fn matches_at(&mut self, plan: &[PlanNode], index: usize, flags: SearchFlags) -> bool {
        let universe = self.universe;
        match universe.and_then(|universe| universe.get(index)) {
            Some(path) => self.matches_path(plan, path, Some(index), flags),
            None => false,
        }
    }

    fn matches_path(
        &mut self,
        plan: &[PlanNode],
        path: &FullPath,
        position: Option<usize>,
        flags: SearchFlags,
    ) -> bool {
        let mut ctx = SearchContext::new(path, flags);
        ctx.position = position;
        let result = self.evaluate(plan, &mut ctx);
        trace!(
            "{}: plan {}, matched {}",
            path.display(self.db),
            result,
            ctx.is_match()
        );
        result && ctx.is_match()
    }

    /// Conjunction of `plan` with short-circuit
    pub fn evaluate(&mut self, plan: &[PlanNode], ctx: &mut SearchContext<'_>) -> bool {
        plan.iter().all(|node| self.evaluate_node(node, ctx))
    }

    fn evaluate_node(&mut self, node: &PlanNode, ctx: &mut SearchContext<'_>) -> bool {
        match &node.kind {
            NodeKind::Above(plan) => {
                let found = self.above(node.depth, plan, ctx);
                if !found {
                    ctx.matched_filters = false;
                    ctx.ancestor_miss = true;
                }
                return found;
            }
            NodeKind::Below(plan) => {
                let found = self.below(node.depth, plan, ctx);
                if !found {
                    ctx.matched_filters = false;
                }
                return found;
            }
            _ => {}
        }

        if !node.depth.contains(ctx.path.depth()) {
            ctx.matched_filters = false;
            return false;
        }

        match &node.kind {
            NodeKind::Not(plan) => {
                if self.evaluate(plan, ctx) {
                    false
                } else {
                    ctx.matched_filters = true;
                    ctx.ancestor_miss = false;
                    true
                }
            }
            NodeKind::Or(left, right) => {
                if self.evaluate(left, ctx) {
                    return true;
                }
                // the right branch starts over; an ancestor miss still stands
                ctx.matched_filters = true;
                self.evaluate(right, ctx)
            }
            NodeKind::Expr(plan) => self.evaluate(plan, ctx),
            NodeKind::Print => self.print(ctx),
            NodeKind::Exec(template) => self.exec(template, ctx),
            kind => {
                let hit = predicates::evaluate(kind, self.db, ctx.path);
                if !hit {
                    ctx.matched_filters = false;
                }
                hit
            }
        }
    }

    /// Test ancestors whose distance from the current path is in `range`
    fn above(&mut self, range: DepthRange, plan: &[PlanNode], ctx: &SearchContext<'_>) -> bool {
        let mut nested = self.nested();
        let mut ancestor = ctx.path.clone();
        let mut distance = 0;
        while ancestor.pop() {
            distance += 1;
            if !range.contains(distance) {
                continue;
            }
            if nested.matches(plan, &ancestor, ctx.flags) {
                return true;
            }
        }
        false
    }

    /// Test descendants whose distance from the current path is in `range`.
    ///
    /// Universe paths are in depth-first order, so the descendants of the
    /// path at `position` are the run of prefixed paths right after it.
    fn below(&mut self, range: DepthRange, plan: &[PlanNode], ctx: &SearchContext<'_>) -> bool {
        let base = ctx.path.len();
        let mut nested = self.nested();

        if let (Some(universe), Some(position)) = (self.universe, ctx.position) {
            let start = position + 1;
            let following = universe.get(start..).unwrap_or_default();
            return following
                .iter()
                .take_while(|candidate| candidate.starts_with(ctx.path))
                .enumerate()
                .filter(|(_, candidate)| range.contains(candidate.len() - base))
                .any(|(offset, candidate)| {
                    nested.matches_path(plan, candidate, Some(start + offset), ctx.flags)
                });
        }

        let walker = TreeWalker::new(self.db, ctx.flags.contains(SearchFlags::HIDDEN));
        walker
            .extend_paths(ctx.path)
            .iter()
            .filter(|candidate| range.contains(candidate.len() - base))
            .any(|candidate| nested.matches(plan, candidate, ctx.flags))
    }

    fn print(&mut self, ctx: &SearchContext<'_>) -> bool {
        if ctx.is_match() {
            if let Some(results) = self.results.as_deref_mut() {
                results.insert(ctx.path);
            }
        }
        true
    }

    fn exec(&mut self, template: &ExecTemplate, ctx: &SearchContext<'_>) -> bool {
        if !ctx.is_match() {
            return false;
        }
        let Some(handler) = self.exec.as_deref_mut() else {
            debug!("-exec skipped: no handler installed");
            return false;
        };

        let replacement = if ctx.flags.returns_objects() {
            self.db.name(ctx.path.current()).to_string()
        } else {
            ctx.path.to_path_string(self.db)
        };
        handler.exec(&template.substitute(&replacement))
    }
}
