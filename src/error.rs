//! Fatal dispatch errors
//!
//! Everything in here is a programmer error or a resource failure that ends
//! the current run. Nothing is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The current thread tried to take the counter lock it already holds
    #[error("recursive thread lock")]
    RecursiveLock,

    /// The counter lock was released by a thread that does not hold it
    #[error("thread unlock without lock")]
    UnlockWithoutLock,

    /// Requested worker count is outside `1..=max`
    #[error("{requested} threads requested, pool supports 1 to {max}")]
    PoolCapacity { requested: usize, max: usize },

    /// The OS refused to create a worker thread
    #[error("failed to spawn worker thread {worker}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
