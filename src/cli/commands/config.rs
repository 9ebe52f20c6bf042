//! Configuration command implementations
//!
//! Shows or validates the merged threadwork configuration.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use crate::cli::Output;
use crate::config::ThreadworkConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration
    Show {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Check the merged configuration
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

/// Execute config commands
pub fn execute(args: ConfigArgs, config: &ThreadworkConfig, output: &Output) -> Result<()> {
    match args.command {
        ConfigCommands::Show { format } => show(config, format),
        ConfigCommands::Validate => validate(config, output),
    }
}

fn show(config: &ThreadworkConfig, format: ConfigFormat) -> Result<()> {
    let rendered = match format {
        ConfigFormat::Toml => config.to_toml()?,
        ConfigFormat::Json => config.to_json()?,
    };
    println!("{rendered}");
    Ok(())
}

fn validate(config: &ThreadworkConfig, output: &Output) -> Result<()> {
    if let Err(e) = config.validate() {
        output.error(&format!("Invalid configuration: {e}"));
        return Err(e);
    }
    output.success("Configuration is valid");
    Ok(())
}
