//! # threadwork - bounded parallel dispatch for batch tools
//!
//! Fans the indices `0..N` of a batch out across a fixed pool of worker
//! threads, guarantees each index is processed exactly once, and optionally
//! prints a 40-step textual progress indicator while doing so.
//!
//! ## Features
//!
//! - **Exactly-once dispatch**: one mutex-guarded cursor, FIFO index assignment
//! - **Serial fallback**: a single-thread run never spawns and stays in order
//! - **Lock discipline checks**: recursive acquires and stray unlocks are fatal errors
//! - **Layered configuration**: defaults, files and `THREADWORK_*` variables via figment
//!
//! ## Quick Start
//!
//! ```bash
//! # Dispatch the checksum workload across every core
//! threadwork run --units 100000
//!
//! # Serial run for debugging
//! threadwork --threads 1 run --units 100
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parallel;
pub mod workload;

pub use cli::{Cli, Output};
pub use config::ThreadworkConfig;
pub use error::{DispatchError, DispatchResult};
pub use parallel::{Dispatcher, RunSummary};

/// Result type alias for threadwork operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
