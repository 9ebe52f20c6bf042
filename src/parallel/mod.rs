//! Bounded parallel dispatch of indexed work units
//!
//! This module hands the indices `0..N` of a batch out to a fixed pool of
//! worker threads so that every index is processed exactly once.
//!
//! # Architecture Responsibilities
//!
//! ## What This Module Does:
//! - **Resource Discovery**: Detects available CPU cores using `num_cpus::get()`
//! - **Work Distribution**: A single mutex-guarded cursor hands out indices in FIFO order
//! - **Thread Lifecycle**: Spawns named scoped workers per run and joins all of them
//! - **Lock Discipline**: Reports recursive acquires and unlocks without a lock
//! - **Pacifier**: Emits a 40-step textual progress indicator
//!
//! ## What This Module Does NOT Do:
//! - **Per-unit Errors**: Failures inside the callback belong to the caller
//! - **Work Stealing**: Units are assumed to cost roughly the same
//! - **Pool Reuse**: Threads live for exactly one batch
//!
//! # Flow
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   Caller        │    │   Dispatcher     │    │   ThreadPool    │
//! │                 │───▶│                  │───▶│                 │
//! │ • unit count    │    │ • reset cursor   │    │ • spawn N       │
//! │ • callback      │    │ • worker loop    │    │ • join all      │
//! │ • pacifier flag │    │ • elapsed time   │    │                 │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//!                               │ pull_next()
//!                               ▼
//!                        ┌──────────────────┐
//!                        │ ThreadLock       │
//!                        │ • WorkCounter    │
//!                        │ • ProgressState  │
//!                        └──────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use threadwork::parallel::{Dispatcher, NullSink};
//!
//! let mut dispatcher = Dispatcher::new()
//!     .with_sink(Arc::new(NullSink))
//!     .with_threads(4)
//!     .unwrap();
//!
//! let total = AtomicU64::new(0);
//! let summary = dispatcher
//!     .run_threads_on_individual(1000, false, |index| {
//!         total.fetch_add(index as u64, Ordering::Relaxed);
//!     })
//!     .unwrap();
//!
//! assert_eq!(summary.units, 1000);
//! assert_eq!(total.load(Ordering::Relaxed), 999 * 1000 / 2);
//! ```

pub mod core;
pub mod counter;
pub mod lock;
pub mod pool;
pub mod progress;

// Re-export main types for easier access
pub use self::core::{Dispatcher, RunSummary};
pub use counter::{DispatchState, WorkCounter};
pub use lock::{LockState, ThreadLock, ThreadLockGuard};
pub use pool::{MAX_THREADS, ThreadPool, default_thread_count};
pub use progress::{ConsoleSink, MemorySink, NullSink, ProgressSink, ProgressState, StepMark};
