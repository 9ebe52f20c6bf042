//! Threads command implementation
//!
//! Shows the worker count a run would use and where it came from.

use anyhow::Result;

use crate::cli::Output;
use crate::config::ThreadworkConfig;
use crate::parallel::MAX_THREADS;

/// Execute the threads command
pub fn execute(config: &ThreadworkConfig, threads: Option<usize>, output: &Output) -> Result<()> {
    let mut dispatcher = config.dispatcher()?;
    let source = match threads {
        Some(threads) => {
            dispatcher.set_threads(threads)?;
            "command line"
        }
        None if dispatcher.threads().is_some() => "configuration",
        None => "detected",
    };
    let resolved = dispatcher.set_default_threads();

    output.header("Worker threads");
    output.key_value("Threads:", &resolved.to_string(), true);
    output.key_value("Source:", source, false);
    output.key_value("Logical CPUs:", &num_cpus::get().to_string(), false);
    output.key_value("Pool capacity:", &MAX_THREADS.to_string(), false);
    match config.stack_size() {
        Some(bytes) => output.key_value("Stack size:", &format!("{} MB", bytes / (1024 * 1024)), false),
        None => output.key_value("Stack size:", "platform default", false),
    }
    output.blank_line();

    Ok(())
}
