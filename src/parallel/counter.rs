use super::progress::{ProgressSink, ProgressState};

/// Cursor over `[0, total)` handing out each index once
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkCounter {
    next: usize,
    total: usize,
}

impl WorkCounter {
    pub fn new(total: usize) -> Self {
        Self { next: 0, total }
    }

    pub fn reset(&mut self, total: usize) {
        self.next = 0;
        self.total = total;
    }

    pub fn position(&self) -> usize {
        self.next
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.next == self.total
    }

    /// Claim the next index, or `None` once every index has been handed out
    pub fn claim(&mut self) -> Option<usize> {
        if self.is_exhausted() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(index)
    }
}

/// Everything guarded by the dispatcher's thread lock
#[derive(Debug, Default)]
pub struct DispatchState {
    pub counter: WorkCounter,
    pub progress: ProgressState,
}

impl DispatchState {
    pub fn reset(&mut self, total: usize, show_pacifier: bool) {
        self.counter.reset(total);
        self.progress.reset(show_pacifier);
    }

    /// One pull of the cursor. Progress is advanced from the position
    /// *before* the claim, so the final step of a run is 39, never 40.
    pub fn pull(&mut self, sink: &dyn ProgressSink) -> Option<usize> {
        if self.counter.is_exhausted() {
            return None;
        }
        self.progress
            .advance(self.counter.position(), self.counter.total(), sink);
        self.counter.claim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::progress::{MemorySink, NullSink};

    #[test]
    fn test_counter_hands_out_each_index_once() {
        let mut counter = WorkCounter::new(3);
        assert_eq!(counter.claim(), Some(0));
        assert_eq!(counter.claim(), Some(1));
        assert_eq!(counter.claim(), Some(2));
        assert_eq!(counter.claim(), None);
        assert_eq!(counter.position(), 3);
    }

    #[test]
    fn test_empty_counter_is_exhausted() {
        let mut state = DispatchState::default();
        state.reset(0, true);
        let sink = MemorySink::new();
        assert_eq!(state.pull(&sink), None);
        assert!(sink.marks().is_empty());
    }

    #[test]
    fn test_reset_rewinds_cursor() {
        let mut state = DispatchState::default();
        state.reset(2, false);
        while state.pull(&NullSink).is_some() {}
        assert!(state.counter.is_exhausted());

        state.reset(5, false);
        assert_eq!(state.counter.position(), 0);
        assert_eq!(state.counter.total(), 5);
        assert_eq!(state.progress.last_step(), -1);
    }

    #[test]
    fn test_pull_after_exhaustion_stays_exhausted() {
        let mut state = DispatchState::default();
        state.reset(1, false);
        assert_eq!(state.pull(&NullSink), Some(0));
        for _ in 0..10 {
            assert_eq!(state.pull(&NullSink), None);
        }
        assert_eq!(state.counter.position(), 1);
    }
}
