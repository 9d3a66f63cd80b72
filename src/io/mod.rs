// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - loading databases and exporting results

mod exporter;
mod importer;

pub use exporter::{results_to_json, save_database};
pub use importer::load_database;
