//! Version command implementation

use crate::cli::Output;
use crate::{PKG_DESCRIPTION, PKG_NAME, Result, VERSION};

/// Execute the version command
pub fn execute(output: &Output) -> Result<()> {
    let repository = env!("CARGO_PKG_REPOSITORY");

    output.header(&format!("{PKG_NAME} v{VERSION}"));
    output.key_value("Description:", PKG_DESCRIPTION, false);
    output.key_value("Repository:", repository, false);

    output.category("Build Information");
    output.key_value("Rust edition:", "2024", false);
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value(
        "Profile:",
        if cfg!(debug_assertions) { "debug" } else { "release" },
        false,
    );
    output.blank_line();

    Ok(())
}
