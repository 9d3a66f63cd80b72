// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object database collaborator
//!
//! The search core never owns geometry. It reads objects through the
//! [`Database`] trait, which reports names, flags, attribute maps,
//! combination trees and a few type-specific facts.

mod memory;
mod tree;

pub use memory::{MemoryDatabase, ObjectBody, ObjectRecord};
pub use tree::{BoolOp, CombTree, TreeLeaf};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// String-to-string map used for both attributes and internal parameters
pub type Attributes = BTreeMap<String, String>;

/// Opaque handle to an object owned by a [`Database`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Object classification bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const COMBINATION = 0x1;
        const REGION = 0x2;
        const SOLID = 0x4;
        const HIDDEN = 0x8;
    }
}

/// The internal form of an object could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal representation of `{name}` is unavailable")]
pub struct Unavailable {
    pub name: String,
}

impl Unavailable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Read-only view of an object database
pub trait Database {
    /// Resolve an object name
    fn lookup(&self, name: &str) -> Option<ObjectId>;

    /// Name of a resolved object
    fn name(&self, id: ObjectId) -> &str;

    fn flags(&self, id: ObjectId) -> ObjectFlags;

    /// User attributes of an object
    fn attributes(&self, id: ObjectId) -> Result<Attributes, Unavailable>;

    /// Type-specific internal parameters (e.g. a bot's `mode`)
    fn parameters(&self, id: ObjectId) -> Result<Attributes, Unavailable>;

    /// Primitive type label such as `sph`, `tor` or `comb`
    fn type_label(&self, id: ObjectId) -> Result<Cow<'_, str>, Unavailable>;

    /// Boolean tree of a combination; `Ok(None)` for an empty combination
    /// or a non-combination object
    fn tree(&self, id: ObjectId) -> Result<Option<Cow<'_, CombTree>>, Unavailable>;

    /// Storage size of the object in bytes
    fn size(&self, id: ObjectId) -> u64;

    /// Every object in the database
    fn objects(&self) -> Vec<ObjectId>;

    /// Objects not referenced by any combination
    fn top_level(&self, include_hidden: bool) -> Vec<ObjectId>;
}
