// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Search result containers

use crate::db::{Database, ObjectId};
use crate::path::FullPath;
use ahash::AHashSet;

/// Matches collected by a search, in first-match order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResults {
    Paths(Vec<FullPath>),
    Objects(Vec<ObjectId>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Paths(paths) => paths.len(),
            SearchResults::Objects(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Option<&[FullPath]> {
        match self {
            SearchResults::Paths(paths) => Some(paths),
            SearchResults::Objects(_) => None,
        }
    }

    pub fn objects(&self) -> Option<&[ObjectId]> {
        match self {
            SearchResults::Objects(objects) => Some(objects),
            SearchResults::Paths(_) => None,
        }
    }

    /// Paths as `/A/B` strings, objects as plain names
    pub fn to_strings(&self, db: &dyn Database) -> Vec<String> {
        match self {
            SearchResults::Paths(paths) => paths.iter().map(|p| p.to_path_string(db)).collect(),
            SearchResults::Objects(objects) => {
                objects.iter().map(|&id| db.name(id).to_string()).collect()
            }
        }
    }
}

/// Deduplicating collector the evaluator prints into
#[derive(Debug)]
pub enum ResultSink {
    Paths {
        paths: Vec<FullPath>,
        seen: AHashSet<FullPath>,
    },
    Objects {
        objects: Vec<ObjectId>,
        seen: AHashSet<ObjectId>,
    },
}

impl ResultSink {
    pub fn paths() -> Self {
        ResultSink::Paths {
            paths: Vec::new(),
            seen: AHashSet::new(),
        }
    }

    pub fn objects() -> Self {
        ResultSink::Objects {
            objects: Vec::new(),
            seen: AHashSet::new(),
        }
    }

    /// Record a match; objects sinks keep only the terminal object
    pub fn insert(&mut self, path: &FullPath) {
        match self {
            ResultSink::Paths { paths, seen } => {
                if seen.insert(path.clone()) {
                    paths.push(path.clone());
                }
            }
            ResultSink::Objects { objects, seen } => {
                if seen.insert(path.current()) {
                    objects.push(path.current());
                }
            }
        }
    }

    pub fn finish(self) -> SearchResults {
        match self {
            ResultSink::Paths { paths, .. } => SearchResults::Paths(paths),
            ResultSink::Objects { objects, .. } => SearchResults::Objects(objects),
        }
    }
}
