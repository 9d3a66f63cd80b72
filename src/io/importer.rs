// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Database file importer

use crate::db::MemoryDatabase;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a JSON database file
pub fn load_database(path: impl AsRef<Path>) -> Result<MemoryDatabase> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read database file: {}", path.display()))?;

    MemoryDatabase::from_json(&source)
        .with_context(|| format!("Failed to load database file: {}", path.display()))
}
