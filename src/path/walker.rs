// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Depth-first enumeration of full paths below a root

use super::{FullPath, PathStep};
use crate::db::{Database, ObjectFlags, ObjectId};
use log::{debug, warn};

/// Walks combination trees and emits every reachable full path
pub struct TreeWalker<'a> {
    db: &'a dyn Database,
    include_hidden: bool,
}

impl<'a> TreeWalker<'a> {
    pub fn new(db: &'a dyn Database, include_hidden: bool) -> Self {
        Self { db, include_hidden }
    }

    /// All paths rooted at `root`, starting with the singleton path
    pub fn build_paths(&self, root: ObjectId) -> Vec<FullPath> {
        let mut path = FullPath::root(root);
        let mut paths = vec![path.clone()];
        self.descend(&mut path, &mut paths);
        paths
    }

    /// All strict descendants of `path`
    pub fn extend_paths(&self, path: &FullPath) -> Vec<FullPath> {
        let mut path = path.clone();
        let mut paths = Vec::new();
        self.descend(&mut path, &mut paths);
        paths
    }

    fn descend(&self, path: &mut FullPath, out: &mut Vec<FullPath>) {
        let current = path.current();
        if !self.db.flags(current).contains(ObjectFlags::COMBINATION) {
            return;
        }

        let tree = match self.db.tree(current) {
            Ok(Some(tree)) => tree,
            Ok(None) => return,
            Err(err) => {
                debug!("{}: {}", path.display(self.db), err);
                return;
            }
        };

        for (ordinal, leaf) in tree.leaves().into_iter().enumerate() {
            let Some(child) = self.db.lookup(leaf.name) else {
                debug!("{}: member `{}` not found", path.display(self.db), leaf.name);
                continue;
            };

            if !self.include_hidden && self.db.flags(child).contains(ObjectFlags::HIDDEN) {
                continue;
            }

            let cyclic = path.contains(child);
            path.push(PathStep {
                object: child,
                op: leaf.op,
                leaf: Some(ordinal),
            });
            out.push(path.clone());
            if cyclic {
                warn!("not traversing cyclic path {}", path.display(self.db));
            } else {
                self.descend(path, out);
            }
            path.pop();
        }
    }
}

/// Convenience wrapper around [`TreeWalker::build_paths`]
pub fn build_paths(
    db: &dyn Database,
    root: ObjectId,
    include_hidden: bool,
) -> Vec<FullPath> {
    TreeWalker::new(db, include_hidden).build_paths(root)
}
