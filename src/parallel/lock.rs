use crate::error::{DispatchError, DispatchResult};
use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

/// Reentrancy bookkeeping layered on top of a plain mutex
///
/// This is an assertion, not a recursive lock: it records which thread holds
/// the counter lock so that a second acquire from the same thread, or a release
/// from a thread that never acquired, is reported instead of silently
/// deadlocking or corrupting the cursor.
#[derive(Debug, Default)]
pub struct LockState {
    holder: Mutex<Option<ThreadId>>,
}

impl LockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }

    pub fn is_held_by_current(&self) -> bool {
        *self.holder.lock() == Some(thread::current().id())
    }

    /// Mark the lock as held by the current thread
    pub fn acquire(&self) -> DispatchResult<()> {
        let mut holder = self.holder.lock();
        if holder.is_some() {
            return Err(DispatchError::RecursiveLock);
        }
        *holder = Some(thread::current().id());
        Ok(())
    }

    /// Clear the held mark; the current thread must be the holder
    pub fn release(&self) -> DispatchResult<()> {
        let mut holder = self.holder.lock();
        if *holder != Some(thread::current().id()) {
            return Err(DispatchError::UnlockWithoutLock);
        }
        *holder = None;
        Ok(())
    }
}

/// Mutex around the dispatch state with the reentrancy check switched on
/// only while a run is multi-threaded
///
/// Single-threaded runs still go through the mutex (it is uncontended there)
/// but skip the holder bookkeeping.
#[derive(Debug, Default)]
pub struct ThreadLock<T> {
    data: Mutex<T>,
    state: LockState,
    threaded: AtomicBool,
}

impl<T> ThreadLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            data: Mutex::new(value),
            state: LockState::new(),
            threaded: AtomicBool::new(false),
        }
    }

    pub fn is_threaded(&self) -> bool {
        self.threaded.load(Ordering::Acquire)
    }

    /// Flag consulted by `lock`; the pool runner flips it around a
    /// multi-threaded run.
    pub fn threaded_flag(&self) -> &AtomicBool {
        &self.threaded
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn lock(&self) -> DispatchResult<ThreadLockGuard<'_, T>> {
        let checked = self.is_threaded();
        // Checked before blocking: a reentrant acquire would otherwise deadlock
        if checked && self.state.is_held_by_current() {
            return Err(DispatchError::RecursiveLock);
        }

        let guard = self.data.lock();
        if checked {
            self.state.acquire()?;
        }

        Ok(ThreadLockGuard {
            state: &self.state,
            guard,
            checked,
        })
    }

    /// Direct access when the caller has exclusive ownership, e.g. between runs
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

/// Held counter lock. Release with [`ThreadLockGuard::unlock`] to observe
/// discipline errors; dropping releases too and logs them instead.
pub struct ThreadLockGuard<'a, T> {
    state: &'a LockState,
    guard: MutexGuard<'a, T>,
    checked: bool,
}

impl<T> ThreadLockGuard<'_, T> {
    pub fn unlock(mut self) -> DispatchResult<()> {
        let result = if self.checked {
            self.checked = false;
            self.state.release()
        } else {
            Ok(())
        };
        drop(self);
        result
    }
}

impl<T> Deref for ThreadLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for ThreadLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for ThreadLockGuard<'_, T> {
    fn drop(&mut self) {
        // Runs before `guard` is dropped, so the holder is cleared while the
        // mutex is still ours.
        if self.checked
            && let Err(e) = self.state.release()
        {
            tracing::error!("{e}");
        }
    }
}
