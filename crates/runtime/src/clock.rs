use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time.
pub trait TimeSource {
    /// Time since some fixed, source-defined origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven time for headless runs and tests. Clones share one reading.
#[derive(Debug, Clone, Default)]
pub struct ManualTime(Rc<Cell<Duration>>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn set(&self, at: Duration) {
        self.0.set(at);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Elapsed-time accumulator. Starts counting when constructed.
pub struct Clock {
    source: Box<dyn TimeSource>,
    start: Duration,
}

impl Clock {
    pub fn new(source: impl TimeSource + 'static) -> Self {
        let start = source.now();
        Self {
            source: Box::new(source),
            start,
        }
    }

    /// Seconds since construction. Never decreases while the source is
    /// monotonic.
    pub fn elapsed(&self) -> f32 {
        self.source.now().saturating_sub(self.start).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(MonotonicTime::new())
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_from_construction() {
        let time = ManualTime::new();
        time.set(Duration::from_secs(10));
        let clock = Clock::new(time.clone());
        assert_eq!(clock.elapsed(), 0.0);

        time.advance(Duration::from_millis(1500));
        assert!((clock.elapsed() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn source_going_backwards_reads_zero() {
        let time = ManualTime::new();
        time.set(Duration::from_secs(5));
        let clock = Clock::new(time.clone());
        time.set(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn monotonic_clock_does_not_decrease() {
        let clock = Clock::default();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
