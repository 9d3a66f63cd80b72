// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::db::Database;
use crate::plan::SearchPlan;
use crate::results::SearchResults;
use crate::search::SearchOutcome;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Print every match, one per line, then a summary
    pub fn report_results(outcome: &SearchOutcome, db: &dyn Database, duration: Duration) {
        let Some(results) = outcome.results() else {
            Self::report_info("query is valid; no database searched");
            return;
        };

        for line in results.to_strings(db) {
            match results {
                SearchResults::Paths(_) => println!("{}", line.cyan()),
                SearchResults::Objects(_) => println!("{}", line.green()),
            }
        }

        let noun = match results {
            SearchResults::Paths(_) => "paths",
            SearchResults::Objects(_) => "objects",
        };
        eprintln!(
            "{} {} {} {} {}",
            "Matched".bold(),
            outcome.count().to_string().cyan(),
            format!("({} {} reported)", results.len(), noun).bright_black(),
            "in".bright_black(),
            Self::format_duration(duration).yellow()
        );
    }

    /// Print the compiled form of a query
    pub fn report_plan(plan: &SearchPlan) {
        println!("{} {}", "Plan:".bold(), plan.to_string().cyan());
        if plan.has_exec() {
            println!("  {}", "runs -exec commands".bright_black());
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        eprintln!("{} {}", "Info:".bright_blue(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
