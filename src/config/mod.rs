//! Configuration management for threadwork
//!
//! Configuration is layered with figment: embedded defaults, then user and
//! repository files in TOML, JSON or YAML, then `THREADWORK_*` environment
//! variables. See [`ThreadworkConfig::figment`] for the loading order.

use serde::{Deserialize, Serialize};

use crate::workload::WorkloadKind;

pub mod core;

/// Main configuration structure for threadwork
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ThreadworkConfig {
    /// Worker thread settings
    pub threads: ThreadsConfig,

    /// Progress indicator settings
    pub pacifier: PacifierConfig,

    /// Built-in workload used by `threadwork run`
    pub workload: WorkloadConfig,
}

/// Worker thread configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThreadsConfig {
    /// Number of workers, 0 detects the hardware concurrency
    pub count: usize,

    /// Per-worker stack size in MB, 0 keeps the platform default
    pub stack_size_mb: usize,
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        Self {
            count: 0,
            stack_size_mb: 8,
        }
    }
}

/// Pacifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacifierConfig {
    /// Print the 40-step progress indicator while units are dispatched
    pub enabled: bool,
}

impl Default for PacifierConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Workload configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,

    /// Number of work units in the batch
    pub units: usize,

    /// Iterations per unit, or milliseconds per unit for `sleep`
    pub rounds: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            kind: WorkloadKind::Checksum,
            units: 1000,
            rounds: 2000,
        }
    }
}

#[cfg(test)]
mod tests;
