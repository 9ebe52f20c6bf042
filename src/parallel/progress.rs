use console::style;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;

/// Number of discrete steps the pacifier divides a run into
pub const PROGRESS_STEPS: i32 = 40;

/// A numeral is printed on every step divisible by this
pub const NUMERAL_EVERY: i32 = 4;

/// One visible pacifier emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMark {
    Numeral(u32),
    Filler,
}

impl fmt::Display for StepMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMark::Numeral(n) => write!(f, "{n}"),
            StepMark::Filler => f.write_str("."),
        }
    }
}

/// Destination for pacifier output
///
/// `step` is called while the dispatcher's counter lock is held, so
/// implementations must be quick and must never call back into the
/// dispatcher.
pub trait ProgressSink: Send + Sync {
    fn step(&self, mark: StepMark);

    /// Called once after a run with the pacifier enabled
    fn finish(&self, elapsed_secs: u64);
}

/// Writes marks straight to stdout, flushing after each one
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn step(&self, mark: StepMark) {
        match mark {
            StepMark::Numeral(_) => print!("{}", style(mark).bold()),
            StepMark::Filler => print!("{}", style(mark).dim()),
        }
        std::io::stdout().flush().ok();
    }

    fn finish(&self, elapsed_secs: u64) {
        println!(" ({elapsed_secs})");
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn step(&self, _mark: StepMark) {}

    fn finish(&self, _elapsed_secs: u64) {}
}

/// Records marks in memory; used by tests and by callers that render the
/// pacifier themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    marks: Mutex<Vec<StepMark>>,
    finished: Mutex<Option<u64>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marks(&self) -> Vec<StepMark> {
        self.marks.lock().clone()
    }

    pub fn finished(&self) -> Option<u64> {
        *self.finished.lock()
    }

    /// The marks as the console would have shown them
    pub fn rendered(&self) -> String {
        self.marks.lock().iter().map(ToString::to_string).collect()
    }

    pub fn numeral_count(&self) -> usize {
        self.marks
            .lock()
            .iter()
            .filter(|mark| matches!(mark, StepMark::Numeral(_)))
            .count()
    }
}

impl ProgressSink for MemorySink {
    fn step(&self, mark: StepMark) {
        self.marks.lock().push(mark);
    }

    fn finish(&self, elapsed_secs: u64) {
        *self.finished.lock() = Some(elapsed_secs);
    }
}

/// Pacifier position for the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    last_step: i32,
    enabled: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            last_step: -1,
            enabled: false,
        }
    }
}

impl ProgressState {
    pub fn reset(&mut self, enabled: bool) {
        self.last_step = -1;
        self.enabled = enabled;
    }

    pub fn last_step(&self) -> i32 {
        self.last_step
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Step on the 0..=40 scale for a cursor position
    pub fn step_for(next: usize, total: usize) -> i32 {
        if total == 0 {
            return 0;
        }
        (PROGRESS_STEPS as u128 * next as u128 / total as u128) as i32
    }

    /// Move the pacifier up to the step implied by `next` out of `total`,
    /// emitting one mark per step crossed.
    pub fn advance(&mut self, next: usize, total: usize, sink: &dyn ProgressSink) {
        let step = Self::step_for(next, total);
        if step < self.last_step {
            tracing::warn!(
                "progress went backwards ({} -> {}), resynchronizing",
                self.last_step,
                step
            );
            self.last_step = step;
        }

        while step > self.last_step {
            self.last_step += 1;
            if !self.enabled {
                continue;
            }
            let mark = if self.last_step % NUMERAL_EVERY == 0 {
                StepMark::Numeral((self.last_step / NUMERAL_EVERY) as u32)
            } else {
                StepMark::Filler
            };
            sink.step(mark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Log lines written by the fmt subscriber during a test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    fn drive(total: usize, enabled: bool) -> (ProgressState, MemorySink) {
        let mut state = ProgressState::default();
        state.reset(enabled);
        let sink = MemorySink::new();
        for next in 0..total {
            state.advance(next, total, &sink);
        }
        (state, sink)
    }

    #[test]
    fn test_hundred_units_emit_forty_marks() {
        let (state, sink) = drive(100, true);
        assert_eq!(sink.marks().len(), 40);
        assert_eq!(sink.numeral_count(), 10);
        assert_eq!(state.last_step(), 39);
        assert_eq!(
            sink.rendered(),
            "0...1...2...3...4...5...6...7...8...9..."
        );
    }

    #[test]
    fn test_small_totals_jump_several_steps() {
        let (state, sink) = drive(10, true);
        // Each pull crosses four steps, the numeral lands on the first of them
        assert_eq!(sink.marks().len(), 37);
        assert_eq!(state.last_step(), 36);
        assert!(sink.rendered().starts_with("0...1...2"));
    }

    #[test]
    fn test_disabled_pacifier_tracks_steps_silently() {
        let (state, sink) = drive(100, false);
        assert!(sink.marks().is_empty());
        assert_eq!(state.last_step(), 39);
    }

    #[test]
    fn test_regression_resynchronizes() {
        let mut state = ProgressState::default();
        state.reset(true);
        let sink = MemorySink::new();
        state.advance(50, 100, &sink);
        assert_eq!(state.last_step(), 20);

        let logs = with_captured_logs(|| state.advance(10, 100, &sink));
        assert_eq!(state.last_step(), 4);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("progress went backwards (20 -> 4)"), "{logs}");
        // Resync emits nothing on the way down
        assert_eq!(sink.marks().len(), 21);

        let logs = with_captured_logs(|| state.advance(20, 100, &sink));
        assert_eq!(state.last_step(), 8);
        assert_eq!(sink.marks().len(), 25);
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_step_for_large_totals() {
        assert_eq!(ProgressState::step_for(usize::MAX - 1, usize::MAX), 39);
        assert_eq!(ProgressState::step_for(0, 7), 0);
        assert_eq!(ProgressState::step_for(7, 7), 40);
    }
}
