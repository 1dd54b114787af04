use std::fmt;
use std::time::{Duration, Instant};

/// Monotonic stopwatch bracketing a single executor run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer;

impl Timer {
    pub fn start() -> Instant {
        Instant::now()
    }

    /// Seconds elapsed since `start`.
    pub fn stop(start: Instant) -> f64 {
        start.elapsed().as_secs_f64()
    }
}

/// The start and end instants of one measured interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSample {
    pub start: Instant,
    pub end: Instant,
}

impl TimingSample {
    /// Run `f` between [`Timer::start`] and [`Timer::stop`].
    ///
    /// `end` is `start` plus the stopped interval.
    pub fn measure<T>(f: impl FnOnce() -> T) -> (T, TimingSample) {
        let start = Timer::start();
        let value = f();
        let elapsed = Timer::stop(start);
        let end = start + Duration::from_secs_f64(elapsed);
        (value, TimingSample { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start)
    }

    pub fn seconds(&self) -> f64 {
        self.duration().as_secs_f64()
    }
}

impl fmt::Display for TimingSample {
    /// Seconds with nine fractional digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}", self.seconds())
    }
}
