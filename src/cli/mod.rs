//! Command-line interface for threadwork
//!
//! This module provides the main CLI structure and command handling.
//! It uses clap for argument parsing and sets up tracing before dispatching
//! to the individual commands.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

use crate::config::ThreadworkConfig;

/// threadwork - parallel batch dispatch over indexed work units
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Worker threads, overrides the configured count
    #[arg(short, long, value_name = "N", global = true)]
    pub threads: Option<usize>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch a built-in workload across the worker pool
    Run(commands::run::RunArgs),
    /// Show the resolved worker count
    Threads,
    /// Configuration management
    Config(commands::config::ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let config = match self.command {
            Some(Commands::Config(_)) => ThreadworkConfig::load_unchecked(self.config.as_deref())?,
            _ => ThreadworkConfig::load_with_custom_config(self.config.as_deref())?,
        };

        match self.command {
            Some(Commands::Run(args)) => commands::run::execute(args, &config, self.threads, &output),
            Some(Commands::Threads) => commands::threads::execute(&config, self.threads, &output),
            Some(Commands::Config(args)) => commands::config::execute(args, &config, &output),
            Some(Commands::Version) => commands::version::execute(&output),
            None => {
                output.info("Run 'threadwork --help' for usage information");
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("info"),
            1 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // stderr keeps the pacifier and JSON output on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
