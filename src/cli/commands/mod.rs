//! Command implementations for the threadwork CLI
//!
//! Each command is organized into its own module.

pub mod config;
pub mod run;
pub mod threads;
pub mod version;
