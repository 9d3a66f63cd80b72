// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Root-to-object paths through combination trees

use crate::db::{BoolOp, Database, ObjectId};
use std::fmt;

/// One step of a [`FullPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub object: ObjectId,
    /// Operator combining this step into its parent
    pub op: BoolOp,
    /// Ordinal of the leaf in the parent's tree this step came through
    pub leaf: Option<usize>,
}

impl PathStep {
    pub fn root(object: ObjectId) -> Self {
        Self {
            object,
            op: BoolOp::TopLevel,
            leaf: None,
        }
    }
}

/// Non-empty sequence of steps from a root object to the current object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullPath {
    steps: Vec<PathStep>,
}

impl FullPath {
    /// Single-element path starting at `object`
    pub fn root(object: ObjectId) -> Self {
        Self {
            steps: vec![PathStep::root(object)],
        }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of edges from the root, i.e. `len - 1`
    pub fn depth(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn current(&self) -> ObjectId {
        self.current_step().object
    }

    pub fn current_step(&self) -> &PathStep {
        &self.steps[self.steps.len() - 1]
    }

    pub fn root_object(&self) -> ObjectId {
        self.steps[0].object
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.steps.iter().map(|step| step.object)
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.objects().any(|id| id == object)
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    /// Drop the last step. The root step is never removed; returns false
    /// when the path is already a single element.
    pub fn pop(&mut self) -> bool {
        if self.steps.len() > 1 {
            self.steps.pop();
            true
        } else {
            false
        }
    }

    /// Copy of the path with one more step
    pub fn extended(&self, step: PathStep) -> Self {
        let mut path = self.clone();
        path.push(step);
        path
    }

    /// Parent prefix, or `None` for a single-element path
    pub fn parent(&self) -> Option<Self> {
        let mut parent = self.clone();
        parent.pop().then_some(parent)
    }

    /// True if `prefix` is a leading subsequence of this path
    pub fn starts_with(&self, prefix: &FullPath) -> bool {
        self.steps.starts_with(&prefix.steps)
    }

    /// Render as `/A/B/C`
    pub fn display<'a>(&'a self, db: &'a dyn Database) -> PathDisplay<'a> {
        PathDisplay { path: self, db }
    }

    pub fn to_path_string(&self, db: &dyn Database) -> String {
        self.display(db).to_string()
    }
}

/// Formatting adapter returned by [`FullPath::display`]
pub struct PathDisplay<'a> {
    path: &'a FullPath,
    db: &'a dyn Database,
}

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for object in self.path.objects() {
            write!(f, "/{}", self.db.name(object))?;
        }
        Ok(())
    }
}
