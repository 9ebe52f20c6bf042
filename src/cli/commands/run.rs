//! Run command implementation
//!
//! Dispatches one of the built-in workloads across the worker pool and prints
//! a summary of the batch.

use anyhow::Result;
use clap::{Args, ValueEnum};
use std::sync::Arc;

use crate::cli::Output;
use crate::config::ThreadworkConfig;
use crate::parallel::NullSink;
use crate::workload::{Workload, WorkloadKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct RunArgs {
    /// Number of work units, overrides workload.units
    #[arg(short, long)]
    pub units: Option<usize>,

    /// Workload to run, overrides workload.kind
    #[arg(short, long, value_enum)]
    pub workload: Option<WorkloadKind>,

    /// Iterations (or milliseconds for sleep) per unit, overrides workload.rounds
    #[arg(short, long)]
    pub rounds: Option<u64>,

    /// Do not print the progress indicator
    #[arg(long)]
    pub no_pacifier: bool,

    /// Summary format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Execute the run command
pub fn execute(
    args: RunArgs,
    config: &ThreadworkConfig,
    threads: Option<usize>,
    output: &Output,
) -> Result<()> {
    let workload = Workload::new(
        args.workload.unwrap_or(config.workload.kind),
        args.rounds.unwrap_or(config.workload.rounds),
    );
    let units = args.units.unwrap_or(config.workload.units);

    // The pacifier shares stdout with the report, keep JSON parseable
    let show_pacifier = config.pacifier.enabled
        && !args.no_pacifier
        && !output.is_quiet()
        && args.format == ReportFormat::Text;

    let mut dispatcher = config.dispatcher()?;
    if let Some(threads) = threads {
        dispatcher.set_threads(threads)?;
    }
    if !show_pacifier {
        dispatcher = dispatcher.with_sink(Arc::new(NullSink));
    }

    output.verbose(&format!(
        "{:?} workload, {} units, {} rounds",
        workload.kind, units, workload.rounds
    ));
    let report = workload.run(&mut dispatcher, units, show_pacifier)?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            output.header("Batch complete");
            output.key_value("Workload:", &format!("{:?}", report.kind).to_lowercase(), false);
            output.key_value("Units:", &report.units.to_string(), false);
            output.key_value("Threads:", &report.threads.to_string(), false);
            output.key_value("Elapsed:", &format!("{} ms", report.elapsed_ms), false);
            output.key_value("Digest:", &report.digest, true);
            output.blank_line();
            output.success(&format!("{} units dispatched", report.units));
        }
    }

    Ok(())
}
