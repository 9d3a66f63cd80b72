// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! dbsearch
//!
//! find(1)-style search over the object trees of a CSG combination
//! database. Queries such as `-type region -attr material_name=steel` are
//! compiled into a [`SearchPlan`] and evaluated against every full path
//! reachable from the chosen start objects.

pub mod accessor;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod path;
pub mod plan;
pub mod results;
pub mod search;

pub use config::SearchConfig;
pub use db::{BoolOp, CombTree, Database, MemoryDatabase, ObjectFlags, ObjectId, Unavailable};
pub use error::{CompileError, SearchError};
pub use path::{build_paths, FullPath, PathStep, TreeWalker};
pub use plan::{ExecHandler, SearchPlan};
pub use results::SearchResults;
pub use search::{
    db_search, db_search_full_paths, db_search_unique_objects, Search, SearchFlags,
    SearchOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_search() {
        let mut db = MemoryDatabase::new();
        db.add_combination("car", &[(BoolOp::Union, "engine")]);
        db.add_primitive("engine", "arb8");

        let outcome = db_search(SearchFlags::empty(), "-name engine", &[], Some(&db), None);
        assert_eq!(outcome.unwrap().status_code(), 1);
    }
}
