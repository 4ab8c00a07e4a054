//! nestspec - nested, context-scoped test runner
//!
//! Runs the bundled context suites and reports one outcome per declared test.
//!
//! ## Usage
//!
//! ```bash
//! # Run every bundled test
//! nestspec run
//!
//! # Run only tests whose name mentions static contexts, as JSON
//! nestspec run --filter static --format json
//!
//! # List composed test names in execution order
//! nestspec list
//! ```
//!
//! Configuration is layered: defaults, then a config file (`--config`,
//! `NESTSPEC_CONFIG` or a standard location), then `NESTSPEC_*` environment
//! variables, then command-line flags.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;
use nestspec::config::{EnvConfig, RunConfig};
use nestspec::output::{OutputFormat, ResultFormatter};
use nestspec::resolve::Resolver;
use nestspec::suites::context_suite;
use nestspec::utils::{init_logger, select_level};
use nestspec::TestRunner;

fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let config_path = args.config.clone().or_else(|| env.config_file.clone());
    let mut config = match &config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::load_default()?,
    }
    .with_env(&env);

    let level = init_logger(&config, args.verbose)?;
    if select_level(&config, args.verbose).is_none() {
        warn!("Unknown log level '{}', using {}", config.log_level, level);
    }
    if env.has_any() {
        debug!("Applied NESTSPEC_* environment overrides");
    }

    let root = context_suite()?;

    match args.command {
        cli::Command::Run(run_args) => {
            if run_args.filter.is_some() {
                config.filter = run_args.filter;
            }
            if let Some(format) = run_args.format {
                config.format = format;
            }
            config.quiet_panics |= run_args.quiet_panics;

            let format = OutputFormat::parse(&config.format).unwrap_or_else(|| {
                warn!("Unknown output format '{}', using table", config.format);
                OutputFormat::Table
            });

            let mut formatter = ResultFormatter::new(format);
            if run_args.no_color {
                formatter = formatter.no_color();
            }

            let runner = TestRunner::new(config);
            let summary = runner.run_tree(&root);

            println!("{}", formatter.format_summary(&summary));

            if !summary.is_all_passed() {
                std::process::exit(1);
            }
        }

        cli::Command::List(list_args) => {
            let filter = list_args.filter.or(config.filter);
            let resolver = match filter {
                Some(filter) => Resolver::new().with_filter(filter),
                None => Resolver::new(),
            };
            let plan = resolver.resolve(&root);
            info!("{} tests in execution order", plan.len());

            for record in plan.records() {
                let marker = if record.is_pending() { "○" } else { "•" };
                println!("  {marker} {}", record.full_name());
            }
        }
    }

    Ok(())
}
