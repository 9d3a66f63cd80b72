// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Subprocess execution for `-exec`

use crate::plan::ExecHandler;
use log::{debug, warn};
use std::process::Command;

/// Runs `-exec` command lines as child processes
#[derive(Debug, Default)]
pub struct CommandRunner {
    invocations: usize,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands started so far
    pub fn invocations(&self) -> usize {
        self.invocations
    }
}

impl ExecHandler for CommandRunner {
    /// Zero exit status is success; a command that cannot be started fails
    fn exec(&mut self, argv: &[String]) -> bool {
        let Some((program, args)) = argv.split_first() else {
            return false;
        };

        self.invocations += 1;
        debug!("exec: {}", argv.join(" "));
        match Command::new(program).args(args).status() {
            Ok(status) => status.success(),
            Err(err) => {
                warn!("exec: failed to run {}: {}", program, err);
                false
            }
        }
    }
}
