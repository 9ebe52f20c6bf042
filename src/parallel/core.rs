use crate::error::{DispatchError, DispatchResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::counter::DispatchState;
use super::lock::ThreadLock;
use super::pool::{MAX_THREADS, ThreadPool, default_thread_count};
use super::progress::{ConsoleSink, ProgressSink};

/// Outcome of one `run_threads_on_individual` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub units: usize,
    pub threads: usize,
    pub elapsed: Duration,
}

/// Owns everything a batch of work units needs: the thread count, the
/// guarded cursor and pacifier state, and the sink pacifier marks go to.
///
/// Separate dispatchers share nothing, so independent batches can run
/// side by side.
pub struct Dispatcher {
    threads: Option<usize>,
    stack_size: Option<usize>,
    state: ThreadLock<DispatchState>,
    aborted: AtomicBool,
    sink: Arc<dyn ProgressSink>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("threads", &self.threads)
            .field("stack_size", &self.stack_size)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher with an unset thread count that writes its pacifier to stdout
    pub fn new() -> Self {
        Self {
            threads: None,
            stack_size: None,
            state: ThreadLock::new(DispatchState::default()),
            aborted: AtomicBool::new(false),
            sink: Arc::new(ConsoleSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> DispatchResult<Self> {
        self.set_threads(threads)?;
        Ok(self)
    }

    pub fn with_stack_size(mut self, stack_size: Option<usize>) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Pin the worker count; anything outside `1..=MAX_THREADS` is rejected
    pub fn set_threads(&mut self, threads: usize) -> DispatchResult<()> {
        if threads == 0 || threads > MAX_THREADS {
            return Err(DispatchError::PoolCapacity {
                requested: threads,
                max: MAX_THREADS,
            });
        }
        self.threads = Some(threads);
        Ok(())
    }

    /// Forget the worker count so the next run detects it again
    pub fn reset_threads(&mut self) {
        self.threads = None;
    }

    /// Resolve an unset worker count to the hardware concurrency
    pub fn set_default_threads(&mut self) -> usize {
        let threads = *self.threads.get_or_insert_with(default_thread_count);
        tracing::info!("{threads} threads");
        threads
    }

    /// True only while a multi-threaded run is in progress
    pub fn is_running(&self) -> bool {
        self.state.is_threaded()
    }

    /// Rewind the cursor to `0..unit_count` and restart the pacifier
    pub fn reset(&mut self, unit_count: usize, show_pacifier: bool) {
        self.state.get_mut().reset(unit_count, show_pacifier);
        *self.aborted.get_mut() = false;
    }

    /// Number of indices handed out since the last reset
    pub fn dispatched(&self) -> DispatchResult<usize> {
        let guard = self.state.lock()?;
        let next = guard.counter.position();
        guard.unlock()?;
        Ok(next)
    }

    /// Hand out the next unclaimed index, or `None` once the range is used up
    ///
    /// Safe to call from every worker at once. Pacifier marks are emitted
    /// from inside the critical section, never the per-unit callback.
    pub fn pull_next(&self) -> DispatchResult<Option<usize>> {
        if self.aborted.load(Ordering::Acquire) {
            return Ok(None);
        }

        let mut guard = self.state.lock()?;
        let index = guard.pull(self.sink.as_ref());
        guard.unlock()?;
        Ok(index)
    }

    /// Run `worker` on every pool slot and wait for all of them
    ///
    /// An unset thread count is detected for this call only; use
    /// [`Dispatcher::set_default_threads`] to keep it. A worker that fails to
    /// spawn aborts the run, so `pull_next` stops handing out indices.
    pub fn run_threads_on<F>(&self, worker: F) -> DispatchResult<()>
    where
        F: Fn(usize) -> DispatchResult<()> + Sync,
    {
        let threads = self.threads.unwrap_or_else(default_thread_count);
        ThreadPool::new(threads)?
            .with_stack_size(self.stack_size)
            .run(self.state.threaded_flag(), &self.aborted, worker)
    }

    fn worker_loop<F>(&self, worker: usize, per_unit: &F) -> DispatchResult<()>
    where
        F: Fn(usize) + Sync,
    {
        tracing::trace!("worker {worker} started");
        let mut processed = 0usize;
        loop {
            match self.pull_next() {
                Ok(Some(index)) => {
                    per_unit(index);
                    processed += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    self.aborted.store(true, Ordering::Release);
                    tracing::error!("worker {worker} aborting run: {e}");
                    return Err(e);
                }
            }
        }
        tracing::trace!("worker {worker} finished after {processed} units");
        Ok(())
    }

    /// Process every index in `0..unit_count` exactly once across the pool
    ///
    /// With one thread the callback runs on the calling thread in increasing
    /// index order. Panics raised by `per_unit` propagate to the caller after
    /// all workers have stopped.
    pub fn run_threads_on_individual<F>(
        &mut self,
        unit_count: usize,
        show_pacifier: bool,
        per_unit: F,
    ) -> DispatchResult<RunSummary>
    where
        F: Fn(usize) + Sync,
    {
        let threads = match self.threads {
            Some(threads) => threads,
            None => self.set_default_threads(),
        };
        let timer = Instant::now();

        self.reset(unit_count, show_pacifier);
        tracing::debug!("dispatching {unit_count} units across {threads} threads");

        self.run_threads_on(|worker| self.worker_loop(worker, &per_unit))?;

        let elapsed = timer.elapsed();
        if show_pacifier {
            self.sink.finish(elapsed.as_secs());
        }
        tracing::debug!("dispatched {unit_count} units in {:.3}s", elapsed.as_secs_f64());

        Ok(RunSummary {
            units: unit_count,
            threads,
            elapsed,
        })
    }
}
