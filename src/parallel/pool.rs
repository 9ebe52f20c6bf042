use crate::error::{DispatchError, DispatchResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on worker threads spawned for a single run
pub const MAX_THREADS: usize = 64;

/// Hardware concurrency, floored at 1 and clipped to the pool capacity
pub fn default_thread_count() -> usize {
    num_cpus::get().clamp(1, MAX_THREADS)
}

/// Fixed-size set of workers spawned and joined once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadPool {
    threads: usize,
    stack_size: Option<usize>,
}

/// Raises the running flag for the lifetime of a multi-threaded run,
/// including when a worker panic unwinds through `ThreadPool::run`
struct RunningFlag<'a>(&'a AtomicBool);

impl<'a> RunningFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ThreadPool {
    pub fn new(threads: usize) -> DispatchResult<Self> {
        if threads == 0 || threads > MAX_THREADS {
            return Err(DispatchError::PoolCapacity {
                requested: threads,
                max: MAX_THREADS,
            });
        }
        Ok(Self {
            threads,
            stack_size: None,
        })
    }

    /// Per-worker stack size in bytes; `None` keeps the platform default
    pub fn with_stack_size(mut self, stack_size: Option<usize>) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `worker` once per pool slot and wait for all of them
    ///
    /// A single-slot pool calls `worker(0)` on the current thread. Larger pools
    /// raise `running` for the duration of the run, spawn one named scoped
    /// thread per slot and join every one of them before returning. A worker
    /// panic is re-raised here once all workers have been joined.
    ///
    /// If a spawn fails, `abort` is raised before the already running
    /// workers are joined, so workers that poll it can stop early.
    pub fn run<F>(
        &self,
        running: &AtomicBool,
        abort: &AtomicBool,
        worker: F,
    ) -> DispatchResult<()>
    where
        F: Fn(usize) -> DispatchResult<()> + Sync,
    {
        if self.threads == 1 {
            return worker(0);
        }

        let _running = RunningFlag::raise(running);
        tracing::debug!("spawning {} worker threads", self.threads);

        let outcome = crossbeam::thread::scope(|s| -> DispatchResult<Vec<_>> {
            let worker = &worker;
            let mut handles = Vec::with_capacity(self.threads);
            for worker_id in 0..self.threads {
                let mut builder = s.builder().name(format!("threadwork-worker-{worker_id}"));
                if let Some(size) = self.stack_size {
                    builder = builder.stack_size(size);
                }
                match builder.spawn(move |_| worker(worker_id)) {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        abort.store(true, Ordering::Release);
                        tracing::error!("failed to spawn worker {worker_id}: {source}");
                        return Err(DispatchError::Spawn {
                            worker: worker_id,
                            source,
                        });
                    }
                }
            }

            Ok(handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>())
        });

        // Only threads left unjoined after a spawn failure can land here
        let joined = match outcome {
            Ok(joined) => joined?,
            Err(payload) => std::panic::resume_unwind(payload),
        };

        let mut first_error = None;
        for result in joined {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
