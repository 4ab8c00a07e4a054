//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Nested, context-scoped test runner
#[derive(Parser, Debug)]
#[command(name = "nestspec")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Run and list the bundled context suites")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bundled suite
    Run(RunArgs),

    /// List test names in execution order
    List(ListArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run tests whose name contains this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Silence panic messages raised inside actions
    #[arg(short, long)]
    pub quiet_panics: bool,

    /// Disable ANSI colours in table output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list tests whose name contains this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,
}
