use clap::Parser;

use threadwork::{Cli, Result};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
