//! Built-in batch workloads
//!
//! Deterministic per-unit transforms used by the `run` command to exercise the
//! dispatcher. Each unit writes its result into its own slot and the slots are
//! folded into a digest that does not depend on the thread count.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

use crate::parallel::{Dispatcher, RunSummary};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// FNV-1a hash iterated `rounds` times per unit
    #[default]
    Checksum,
    /// Count primes in a block of `rounds` integers per unit
    Primes,
    /// Sleep `rounds` milliseconds per unit
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
    pub kind: WorkloadKind,
    pub rounds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub kind: WorkloadKind,
    pub units: usize,
    pub threads: usize,
    pub elapsed_ms: u128,
    pub digest: String,
}

impl WorkloadReport {
    fn new(kind: WorkloadKind, summary: &RunSummary, digest: u64) -> Self {
        Self {
            kind,
            units: summary.units,
            threads: summary.threads,
            elapsed_ms: summary.elapsed.as_millis(),
            digest: format!("{digest:016x}"),
        }
    }
}

fn fnv_mix(mut hash: u64, value: u64) -> u64 {
    for byte in value.to_le_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

impl Workload {
    pub fn new(kind: WorkloadKind, rounds: u64) -> Self {
        Self { kind, rounds }
    }

    /// Result for a single unit
    pub fn compute(&self, unit: usize) -> u64 {
        let unit = unit as u64;
        match self.kind {
            WorkloadKind::Checksum => {
                (0..self.rounds).fold(FNV_OFFSET, |hash, round| fnv_mix(hash, unit ^ round))
            }
            WorkloadKind::Primes => {
                let start = unit.saturating_mul(self.rounds);
                let end = start.saturating_add(self.rounds);
                (start..end).filter(|&n| is_prime(n)).count() as u64
            }
            WorkloadKind::Sleep => {
                std::thread::sleep(Duration::from_millis(self.rounds));
                unit
            }
        }
    }

    /// Run every unit through `dispatcher` and fold the results in index order
    pub fn run(
        &self,
        dispatcher: &mut Dispatcher,
        units: usize,
        show_pacifier: bool,
    ) -> Result<WorkloadReport> {
        let slots: Vec<OnceLock<u64>> = (0..units).map(|_| OnceLock::new()).collect();

        let summary = dispatcher.run_threads_on_individual(units, show_pacifier, |unit| {
            if slots[unit].set(self.compute(unit)).is_err() {
                panic!("unit {unit} was dispatched twice");
            }
        })?;

        let mut digest = FNV_OFFSET;
        for (unit, slot) in slots.iter().enumerate() {
            let Some(value) = slot.get() else {
                bail!("unit {unit} was never dispatched");
            };
            digest = fnv_mix(digest, *value);
        }

        tracing::info!(
            "{:?} workload: {} units on {} threads in {:?}",
            self.kind,
            summary.units,
            summary.threads,
            summary.elapsed
        );
        Ok(WorkloadReport::new(self.kind, &summary, digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::NullSink;
    use std::sync::Arc;

    fn dispatcher(threads: usize) -> Dispatcher {
        Dispatcher::new()
            .with_sink(Arc::new(NullSink))
            .with_threads(threads)
            .unwrap()
    }

    #[test]
    fn test_primes_per_block() {
        let workload = Workload::new(WorkloadKind::Primes, 10);
        assert_eq!(workload.compute(0), 4); // 2 3 5 7
        assert_eq!(workload.compute(1), 4); // 11 13 17 19
        assert_eq!(workload.compute(2), 2); // 23 29
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let workload = Workload::new(WorkloadKind::Checksum, 16);
        assert_eq!(workload.compute(7), workload.compute(7));
        assert_ne!(workload.compute(7), workload.compute(8));
        assert_eq!(Workload::new(WorkloadKind::Checksum, 0).compute(3), FNV_OFFSET);
    }

    #[test]
    fn test_digest_independent_of_thread_count() {
        let workload = Workload::new(WorkloadKind::Checksum, 64);
        let serial = workload.run(&mut dispatcher(1), 500, false).unwrap();
        let parallel = workload.run(&mut dispatcher(8), 500, false).unwrap();
        assert_eq!(serial.digest, parallel.digest);
        assert_eq!(parallel.threads, 8);
        assert_eq!(parallel.units, 500);
    }

    #[test]
    fn test_sleep_workload_runs() {
        let workload = Workload::new(WorkloadKind::Sleep, 1);
        let report = workload.run(&mut dispatcher(4), 8, false).unwrap();
        assert_eq!(report.units, 8);
    }
}
