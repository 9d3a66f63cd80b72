// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Full paths and the tree walker that produces them

mod full_path;
mod walker;

pub use full_path::{FullPath, PathDisplay, PathStep};
pub use walker::{build_paths, TreeWalker};
