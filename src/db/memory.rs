// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory object database

use super::{Attributes, BoolOp, CombTree, Database, ObjectFlags, ObjectId, Unavailable};
use ahash::{AHashMap, AHashSet};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// Stored form of a single object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub name: String,
    #[serde(flatten)]
    pub body: ObjectBody,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub params: Attributes,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Internal form cannot be decoded; attribute, parameter and tree
    /// access report [`Unavailable`]
    #[serde(default, skip_serializing_if = "is_false")]
    pub damaged: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectBody {
    Primitive {
        #[serde(rename = "type")]
        primitive: String,
    },
    Combination {
        #[serde(default)]
        region: bool,
        #[serde(default)]
        tree: Option<CombTree>,
    },
    /// Non-geometric payload such as an attached binary blob
    Binary,
}

impl ObjectRecord {
    fn new(name: impl Into<String>, body: ObjectBody) -> Self {
        Self {
            name: name.into(),
            body,
            attributes: Attributes::new(),
            params: Attributes::new(),
            size: 0,
            hidden: false,
            damaged: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DatabaseFile {
    objects: Vec<ObjectRecord>,
}

/// Database kept entirely in memory, loadable from JSON
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    records: Vec<ObjectRecord>,
    index: AHashMap<String, ObjectId>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a database from its JSON form
    pub fn from_json(source: &str) -> Result<Self> {
        let file: DatabaseFile =
            serde_json::from_str(source).context("Failed to parse database JSON")?;

        let mut db = Self::new();
        for record in file.objects {
            if db.index.contains_key(&record.name) {
                bail!("Duplicate object name in database: {}", record.name);
            }
            db.insert(record);
        }
        Ok(db)
    }

    /// Serialize the database to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        let file = DatabaseFile {
            objects: self.records.clone(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize database")
    }

    /// Load a database from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        crate::io::load_database(path)
    }

    /// Insert a record, replacing any existing object with the same name
    pub fn insert(&mut self, record: ObjectRecord) -> ObjectId {
        if let Some(&id) = self.index.get(&record.name) {
            self.records[id.0 as usize] = record;
            return id;
        }
        let id = ObjectId(self.records.len() as u32);
        self.index.insert(record.name.clone(), id);
        self.records.push(record);
        id
    }

    pub fn add_primitive(&mut self, name: &str, primitive: &str) -> ObjectId {
        self.insert(ObjectRecord::new(
            name,
            ObjectBody::Primitive {
                primitive: primitive.to_string(),
            },
        ))
    }

    /// Add a combination built from an ordered member list
    pub fn add_combination(&mut self, name: &str, members: &[(BoolOp, &str)]) -> ObjectId {
        self.add_combination_tree(name, false, CombTree::from_members(members))
    }

    /// Add a region combination built from an ordered member list
    pub fn add_region(&mut self, name: &str, members: &[(BoolOp, &str)]) -> ObjectId {
        self.add_combination_tree(name, true, CombTree::from_members(members))
    }

    pub fn add_combination_tree(
        &mut self,
        name: &str,
        region: bool,
        tree: Option<CombTree>,
    ) -> ObjectId {
        self.insert(ObjectRecord::new(name, ObjectBody::Combination { region, tree }))
    }

    pub fn add_binary(&mut self, name: &str) -> ObjectId {
        self.insert(ObjectRecord::new(name, ObjectBody::Binary))
    }

    pub fn set_attribute(&mut self, id: ObjectId, key: &str, value: &str) {
        self.record_mut(id)
            .attributes
            .insert(key.to_string(), value.to_string());
    }

    pub fn set_parameter(&mut self, id: ObjectId, key: &str, value: &str) {
        self.record_mut(id)
            .params
            .insert(key.to_string(), value.to_string());
    }

    pub fn set_size(&mut self, id: ObjectId, size: u64) {
        self.record_mut(id).size = size;
    }

    pub fn set_hidden(&mut self, id: ObjectId, hidden: bool) {
        self.record_mut(id).hidden = hidden;
    }

    /// Make the internal form of an object undecodable
    pub fn mark_damaged(&mut self, id: ObjectId) {
        self.record_mut(id).damaged = true;
    }

    pub fn record(&self, id: ObjectId) -> &ObjectRecord {
        &self.records[id.0 as usize]
    }

    fn record_mut(&mut self, id: ObjectId) -> &mut ObjectRecord {
        &mut self.records[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn decoded(&self, id: ObjectId) -> Result<&ObjectRecord, Unavailable> {
        let record = self.record(id);
        if record.damaged {
            return Err(Unavailable::new(record.name.as_str()));
        }
        Ok(record)
    }

    /// Names referenced by any combination tree
    fn referenced_names(&self) -> AHashSet<&str> {
        let mut referenced = AHashSet::new();
        for record in &self.records {
            if let ObjectBody::Combination {
                tree: Some(tree), ..
            } = &record.body
            {
                referenced.extend(tree.leaves().into_iter().map(|leaf| leaf.name));
            }
        }
        referenced
    }
}

impl Database for MemoryDatabase {
    fn lookup(&self, name: &str) -> Option<ObjectId> {
        self.index.get(name).copied()
    }

    fn name(&self, id: ObjectId) -> &str {
        &self.record(id).name
    }

    fn flags(&self, id: ObjectId) -> ObjectFlags {
        let record = self.record(id);
        let mut flags = match &record.body {
            ObjectBody::Primitive { .. } => ObjectFlags::SOLID,
            ObjectBody::Combination { region: true, .. } => {
                ObjectFlags::COMBINATION | ObjectFlags::REGION
            }
            ObjectBody::Combination { .. } => ObjectFlags::COMBINATION,
            ObjectBody::Binary => ObjectFlags::empty(),
        };
        flags.set(ObjectFlags::HIDDEN, record.hidden);
        flags
    }

    fn attributes(&self, id: ObjectId) -> Result<Attributes, Unavailable> {
        Ok(self.decoded(id)?.attributes.clone())
    }

    fn parameters(&self, id: ObjectId) -> Result<Attributes, Unavailable> {
        Ok(self.decoded(id)?.params.clone())
    }

    fn type_label(&self, id: ObjectId) -> Result<Cow<'_, str>, Unavailable> {
        let label = match &self.decoded(id)?.body {
            ObjectBody::Primitive { primitive } => Cow::Borrowed(primitive.as_str()),
            ObjectBody::Combination { .. } => Cow::Borrowed("comb"),
            ObjectBody::Binary => Cow::Borrowed("binary"),
        };
        Ok(label)
    }

    fn tree(&self, id: ObjectId) -> Result<Option<Cow<'_, CombTree>>, Unavailable> {
        match &self.decoded(id)?.body {
            ObjectBody::Combination { tree, .. } => Ok(tree.as_ref().map(Cow::Borrowed)),
            _ => Ok(None),
        }
    }

    fn size(&self, id: ObjectId) -> u64 {
        self.record(id).size
    }

    fn objects(&self) -> Vec<ObjectId> {
        (0..self.records.len() as u32).map(ObjectId).collect()
    }

    fn top_level(&self, include_hidden: bool) -> Vec<ObjectId> {
        let referenced = self.referenced_names();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| !referenced.contains(record.name.as_str()))
            .filter(|(_, record)| include_hidden || !record.hidden)
            .map(|(index, _)| ObjectId(index as u32))
            .collect()
    }
}
