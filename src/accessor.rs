// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Read access to object facts used by search predicates
//!
//! Every accessor returns `None` when the database cannot materialize the
//! object's internal form. Predicates treat that as a non-match.

use crate::db::{Attributes, CombTree, Database, ObjectFlags, ObjectId, Unavailable};
use crate::path::FullPath;
use log::debug;
use nalgebra::Matrix4;
use std::borrow::Cow;

/// Borrowed view of one object
#[derive(Clone, Copy)]
pub struct ObjectView<'a> {
    db: &'a dyn Database,
    id: ObjectId,
}

impl<'a> ObjectView<'a> {
    pub fn new(db: &'a dyn Database, id: ObjectId) -> Self {
        Self { db, id }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.db.name(self.id)
    }

    pub fn flags(&self) -> ObjectFlags {
        self.db.flags(self.id)
    }

    pub fn is_combination(&self) -> bool {
        self.flags().contains(ObjectFlags::COMBINATION)
    }

    pub fn is_region(&self) -> bool {
        self.flags().contains(ObjectFlags::REGION)
    }

    pub fn attributes(&self) -> Option<Attributes> {
        self.available(self.db.attributes(self.id))
    }

    pub fn parameters(&self) -> Option<Attributes> {
        self.available(self.db.parameters(self.id))
    }

    pub fn type_label(&self) -> Option<Cow<'a, str>> {
        self.available(self.db.type_label(self.id))
    }

    /// Boolean tree; `None` for non-combinations, empty combinations and
    /// undecodable objects
    pub fn tree(&self) -> Option<Cow<'a, CombTree>> {
        if !self.is_combination() {
            return None;
        }
        self.available(self.db.tree(self.id)).flatten()
    }

    /// Number of leaves in the combination tree. Empty combinations have
    /// zero; non-combinations have no count.
    pub fn leaf_count(&self) -> Option<usize> {
        if !self.is_combination() {
            return None;
        }
        self.available(self.db.tree(self.id))
            .map(|tree| tree.map_or(0, |tree| tree.leaf_count()))
    }

    pub fn size(&self) -> u64 {
        self.db.size(self.id)
    }

    fn available<T>(&self, result: Result<T, Unavailable>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("{}", err);
                None
            }
        }
    }
}

/// Matrix applied to the current object by its parent's tree leaf.
///
/// A single-element path has no incoming link and yields the identity.
/// A leaf without a stored matrix is also the identity.
pub fn incoming_matrix(db: &dyn Database, path: &FullPath) -> Option<Matrix4<f64>> {
    let steps = path.steps();
    if steps.len() < 2 {
        return Some(Matrix4::identity());
    }

    let parent = ObjectView::new(db, steps[steps.len() - 2].object);
    let ordinal = path.current_step().leaf?;
    let tree = parent.tree()?;
    let leaves = tree.leaves();
    let leaf = leaves.get(ordinal)?;
    Some(leaf.matrix.copied().unwrap_or_else(Matrix4::identity))
}
