// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! dbsearch CLI

use anyhow::{bail, Result};
use clap::Parser;
use dbsearch::cli::{CommandRunner, Reporter};
use dbsearch::{
    io, CompileError, Database, ObjectFlags, ObjectId, Search, SearchConfig, SearchPlan,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dbsearch")]
#[command(
    about = "Search a CSG object database with find(1)-style queries",
    long_about = None
)]
#[command(after_help = "Example: dbsearch --db model.json -- -type region -attr material_name=steel")]
struct Cli {
    /// Database file (JSON)
    #[arg(short, long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Configuration file (defaults to ./dbsearch.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start from these objects instead of the top-level objects
    #[arg(short = 'o', long = "object", value_name = "NAME")]
    objects: Vec<String>,

    /// Include hidden objects
    #[arg(long)]
    hidden: bool,

    /// Test start objects without walking their trees
    #[arg(long)]
    flat: bool,

    /// Walk trees even when flat mode is configured
    #[arg(long)]
    tree: bool,

    /// Report each matching object once
    #[arg(short, long)]
    unique: bool,

    /// Suppress query diagnostics
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the compiled plan and exit
    #[arg(long)]
    explain: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Query, e.g. `-name *.r -o -type comb`
    #[arg(last = true, allow_hyphen_values = true, value_name = "QUERY")]
    query: Vec<String>,
}

impl Cli {
    fn config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_file(path)?.with_env_overrides(),
            None => SearchConfig::load()?,
        };
        config.hidden |= self.hidden;
        config.flat |= self.flat;
        config.tree |= self.tree;
        config.unique |= self.unique;
        config.quiet |= self.quiet;
        config.verbose |= self.verbose;
        Ok(config)
    }
}

fn init_logging(config: &SearchConfig) {
    let level = if config.verbose {
        "debug"
    } else if config.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = match cli.config() {
        Ok(config) => config,
        Err(err) => {
            Reporter::report_error(&format!("{:#}", err));
            std::process::exit(1);
        }
    };
    init_logging(&config);

    if let Err(err) = run(&cli, &config) {
        if is_reported(&err, &config) {
            Reporter::report_error(&format!("{:#}", err));
        }
        std::process::exit(1);
    }
}

/// Quiet mode silences query diagnostics; the exit status still reports them
fn is_reported(err: &anyhow::Error, config: &SearchConfig) -> bool {
    !(config.quiet && err.is::<CompileError>())
}

fn run(cli: &Cli, config: &SearchConfig) -> Result<()> {
    let plan = SearchPlan::compile(&cli.query)?;
    if cli.explain {
        Reporter::report_plan(&plan);
        return Ok(());
    }

    let Some(db_path) = &cli.db else {
        bail!("a database file is required (--db FILE)");
    };
    let db = io::load_database(db_path)?;
    let start = resolve_objects(&db, &cli.objects, config)?;

    let mut runner = CommandRunner::new();
    let mut search = Search::new(config.flags()).start_objects(&start);
    if plan.has_exec() {
        search = search.exec_handler(&mut runner);
    }

    let started = Instant::now();
    let outcome = search.run(&plan, &db)?;
    let elapsed = started.elapsed();

    if cli.json {
        println!("{}", io::results_to_json(&outcome, &db)?);
    } else {
        Reporter::report_results(&outcome, &db, elapsed);
    }
    Ok(())
}

fn resolve_objects(
    db: &dyn Database,
    names: &[String],
    config: &SearchConfig,
) -> Result<Vec<ObjectId>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let Some(id) = db.lookup(name) else {
            bail!("object not found: {}", name);
        };
        if !config.hidden && !config.quiet && db.flags(id).contains(ObjectFlags::HIDDEN) {
            Reporter::report_warning(&format!("{} is hidden; pass --hidden to search it", name));
        }
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_hides_compile_errors_only() {
        let compile = anyhow::Error::new(SearchPlan::parse("-frobnicate").unwrap_err());
        let missing = anyhow::anyhow!("a database file is required (--db FILE)");

        let loud = SearchConfig::default();
        assert!(is_reported(&compile, &loud));
        assert!(is_reported(&missing, &loud));

        let quiet = SearchConfig {
            quiet: true,
            ..SearchConfig::default()
        };
        assert!(!is_reported(&compile, &quiet));
        assert!(is_reported(&missing, &quiet));
    }
}
