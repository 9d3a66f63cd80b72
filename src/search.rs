// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Search driver
//!
//! Compiles a query, chooses the start set, builds the path universe and
//! runs the plan once per path.

use crate::db::{Database, ObjectFlags, ObjectId};
use crate::error::SearchError;
use crate::path::{FullPath, TreeWalker};
use crate::plan::{Evaluator, ExecHandler, SearchPlan};
use crate::results::{ResultSink, SearchResults};
use ahash::AHashSet;
use bitflags::bitflags;
use log::{debug, warn};

bitflags! {
    /// Options controlling a search
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SearchFlags: u32 {
        /// Include hidden objects
        const HIDDEN = 0x1;
        /// Do not log compile diagnostics
        const QUIET = 0x2;
        /// Test each start object on its own instead of walking trees
        const FLAT = 0x4;
        /// Report each matching object once instead of every path
        const RETURN_UNIQ_DP = 0x8;
        /// Force tree walking even when `FLAT` is set
        const TREE = 0x10;
    }
}

impl SearchFlags {
    pub fn is_flat(&self) -> bool {
        self.contains(SearchFlags::FLAT) && !self.contains(SearchFlags::TREE)
    }

    /// Results are objects rather than full paths
    pub fn returns_objects(&self) -> bool {
        self.contains(SearchFlags::RETURN_UNIQ_DP) || self.is_flat()
    }
}

/// Result of a search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No database was given; the query compiled successfully
    Probe,
    /// `count` is the number of paths (or start objects in flat mode) the
    /// plan matched
    Matches { count: usize, results: SearchResults },
}

impl SearchOutcome {
    /// Legacy integer status: match count, or `-2` for a probe
    pub fn status_code(&self) -> i64 {
        match self {
            SearchOutcome::Probe => -2,
            SearchOutcome::Matches { count, .. } => *count as i64,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            SearchOutcome::Probe => 0,
            SearchOutcome::Matches { count, .. } => *count,
        }
    }

    pub fn results(&self) -> Option<&SearchResults> {
        match self {
            SearchOutcome::Probe => None,
            SearchOutcome::Matches { results, .. } => Some(results),
        }
    }

    pub fn into_results(self) -> Option<SearchResults> {
        match self {
            SearchOutcome::Probe => None,
            SearchOutcome::Matches { results, .. } => Some(results),
        }
    }
}

/// Configurable search call
pub struct Search<'h> {
    flags: SearchFlags,
    start: Vec<ObjectId>,
    exec: Option<&'h mut dyn ExecHandler>,
}

impl<'h> Search<'h> {
    pub fn new(flags: SearchFlags) -> Self {
        Self {
            flags,
            start: Vec::new(),
            exec: None,
        }
    }

    /// Search from these objects instead of the top-level objects
    pub fn start_objects(mut self, start: &[ObjectId]) -> Self {
        self.start = start.to_vec();
        self
    }

    pub fn exec_handler(mut self, handler: &'h mut dyn ExecHandler) -> Self {
        self.exec = Some(handler);
        self
    }

    /// Compile a whitespace-separated query and run it
    pub fn query(
        self,
        query: &str,
        db: Option<&dyn Database>,
    ) -> Result<SearchOutcome, SearchError> {
        let args: Vec<&str> = query.split_whitespace().collect();
        self.query_args(&args, db)
    }

    /// Compile a pre-tokenized query and run it. Without a database the
    /// call only validates the query.
    pub fn query_args<S: AsRef<str>>(
        self,
        args: &[S],
        db: Option<&dyn Database>,
    ) -> Result<SearchOutcome, SearchError> {
        let plan = match SearchPlan::compile(args) {
            Ok(plan) => plan,
            Err(err) => {
                if !self.flags.contains(SearchFlags::QUIET) {
                    warn!("search: {}", err);
                }
                return Err(err.into());
            }
        };

        match db {
            Some(db) => self.run(&plan, db),
            None => Ok(SearchOutcome::Probe),
        }
    }

    /// Run a compiled plan
    pub fn run(mut self, plan: &SearchPlan, db: &dyn Database) -> Result<SearchOutcome, SearchError> {
        if plan.has_exec() && self.exec.is_none() {
            if !self.flags.contains(SearchFlags::QUIET) {
                warn!("search: {}", SearchError::MissingExecHandler);
            }
            return Err(SearchError::MissingExecHandler);
        }

        let flags = self.flags;
        let include_hidden = flags.contains(SearchFlags::HIDDEN);
        let roots = self.roots(db, include_hidden);

        let flat = flags.is_flat();
        let paths: Vec<FullPath> = if flat {
            roots.iter().map(|&root| FullPath::root(root)).collect()
        } else {
            build_universe(db, &roots, include_hidden)
        };
        debug!(
            "search: {} start objects, {} paths, plan {}",
            roots.len(),
            paths.len(),
            plan
        );

        let mut sink = if flags.returns_objects() {
            ResultSink::objects()
        } else {
            ResultSink::paths()
        };

        let count = {
            let universe = (!flat).then_some(paths.as_slice());
            let mut evaluator = Evaluator::new(db, universe).with_results(&mut sink);
            if let Some(handler) = self.exec.as_deref_mut() {
                evaluator = evaluator.with_exec(handler);
            }
            if flat {
                paths
                    .iter()
                    .filter(|path| evaluator.matches(plan.nodes(), path, flags))
                    .count()
            } else {
                (0..paths.len())
                    .filter(|&index| evaluator.matches_at(plan.nodes(), index, flags))
                    .count()
            }
        };

        Ok(SearchOutcome::Matches {
            count,
            results: sink.finish(),
        })
    }

    fn roots(&self, db: &dyn Database, include_hidden: bool) -> Vec<ObjectId> {
        if self.start.is_empty() {
            return db.top_level(include_hidden);
        }
        self.start
            .iter()
            .copied()
            .filter(|&id| include_hidden || !db.flags(id).contains(ObjectFlags::HIDDEN))
            .collect()
    }
}

/// Every path below every root, without duplicates. A repeated root only
/// repeats a whole block, so each path's descendants stay contiguous.
fn build_universe(db: &dyn Database, roots: &[ObjectId], include_hidden: bool) -> Vec<FullPath> {
    let walker = TreeWalker::new(db, include_hidden);
    let mut seen = AHashSet::new();
    let mut universe = Vec::new();
    for &root in roots {
        for path in walker.build_paths(root) {
            if seen.insert(path.clone()) {
                universe.push(path);
            }
        }
    }
    universe
}

/// Search `db` with a whitespace-separated query.
///
/// An empty `start` searches from the top-level objects. Passing no
/// database only validates the query and yields [`SearchOutcome::Probe`].
pub fn db_search(
    flags: SearchFlags,
    query: &str,
    start: &[ObjectId],
    db: Option<&dyn Database>,
    exec: Option<&mut dyn ExecHandler>,
) -> Result<SearchOutcome, SearchError> {
    let mut search = Search::new(flags).start_objects(start);
    if let Some(handler) = exec {
        search = search.exec_handler(handler);
    }
    search.query(query, db)
}

/// Search and always return full paths
pub fn db_search_full_paths(
    flags: SearchFlags,
    query: &str,
    start: &[ObjectId],
    db: &dyn Database,
) -> Result<Vec<FullPath>, SearchError> {
    let flags = flags - SearchFlags::RETURN_UNIQ_DP - SearchFlags::FLAT;
    let outcome = db_search(flags, query, start, Some(db), None)?;
    match outcome.into_results() {
        Some(SearchResults::Paths(paths)) => Ok(paths),
        _ => Ok(Vec::new()),
    }
}

/// Search and return each matching object once
pub fn db_search_unique_objects(
    flags: SearchFlags,
    query: &str,
    start: &[ObjectId],
    db: &dyn Database,
) -> Result<Vec<ObjectId>, SearchError> {
    let outcome = db_search(flags | SearchFlags::RETURN_UNIQ_DP, query, start, Some(db), None)?;
    match outcome.into_results() {
        Some(SearchResults::Objects(objects)) => Ok(objects),
        _ => Ok(Vec::new()),
    }
}
