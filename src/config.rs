// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Search configuration

use crate::search::SearchFlags;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default search options, read from `dbsearch.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Include hidden objects
    pub hidden: bool,
    /// Suppress compile diagnostics
    pub quiet: bool,
    /// Test start objects without walking their trees
    pub flat: bool,
    /// Report each object once
    pub unique: bool,
    /// Walk trees even when `flat` is set
    pub tree: bool,
    /// Debug logging
    pub verbose: bool,
}

impl SearchConfig {
    pub const FILE_NAME: &'static str = "dbsearch.toml";

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SearchConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `dbsearch.toml` from the working directory if present, then
    /// apply environment variable overrides
    pub fn load() -> Result<Self> {
        let path = Path::new(Self::FILE_NAME);
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `DBSEARCH_*` environment variables
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields: [(&str, &mut bool); 6] = [
            ("DBSEARCH_HIDDEN", &mut self.hidden),
            ("DBSEARCH_QUIET", &mut self.quiet),
            ("DBSEARCH_FLAT", &mut self.flat),
            ("DBSEARCH_UNIQUE", &mut self.unique),
            ("DBSEARCH_TREE", &mut self.tree),
            ("DBSEARCH_VERBOSE", &mut self.verbose),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).as_deref().and_then(parse_bool) {
                *field = value;
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn flags(&self) -> SearchFlags {
        let mut flags = SearchFlags::empty();
        flags.set(SearchFlags::HIDDEN, self.hidden);
        flags.set(SearchFlags::QUIET, self.quiet);
        flags.set(SearchFlags::FLAT, self.flat);
        flags.set(SearchFlags::RETURN_UNIQ_DP, self.unique);
        flags.set(SearchFlags::TREE, self.tree);
        flags
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
