// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Database and result export

use crate::db::{Database, MemoryDatabase};
use crate::search::SearchOutcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Write a database as JSON
pub fn save_database(db: &MemoryDatabase, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, db.to_json()?)
        .with_context(|| format!("Failed to write database file: {}", path.display()))
}

#[derive(Serialize)]
struct ResultReport<'a> {
    kind: &'a str,
    count: usize,
    matches: Vec<String>,
}

/// Render a search outcome as JSON
pub fn results_to_json(outcome: &SearchOutcome, db: &dyn Database) -> Result<String> {
    let report = match outcome.results() {
        Some(results) => ResultReport {
            kind: if results.objects().is_some() { "objects" } else { "paths" },
            count: outcome.count(),
            matches: results.to_strings(db),
        },
        None => ResultReport {
            kind: "probe",
            count: 0,
            matches: Vec::new(),
        },
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize search results")
}
