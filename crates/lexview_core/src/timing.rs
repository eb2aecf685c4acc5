//! Pending-call coalescing for keystroke and scroll events.
//!
//! # Responsibility
//! - Debounce search input: only the last keystroke in a quiet window fires.
//! - Throttle scroll tracking: at most one recomputation per interval.
//!
//! # Invariants
//! - Both machines are explicit idle -> pending -> fired state, driven by an
//!   injected clock; tests never sleep.
//! - Earlier pending requests are discarded, not queued.

use std::time::{Duration, Instant};

/// Quiet window for search keystrokes.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Interval for scroll-position recomputation.
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(100);

/// Monotonic time source, injected so the machines are testable.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock implementation anchored at construction time.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Trailing-edge coalescer: every request restarts the quiet window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Registers a request, discarding any earlier pending one.
    pub fn request(&mut self, now: Duration) {
        self.deadline = Some(now + self.quiet);
    }

    /// Fires once when the quiet window has elapsed since the last request.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Coalescer that keeps the first deadline: repeated notifications within
/// the interval do not push the recomputation further out.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    fire_at: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            fire_at: None,
        }
    }

    pub fn notify(&mut self, now: Duration) {
        if self.fire_at.is_none() {
            self.fire_at = Some(now + self.interval);
        }
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        match self.fire_at {
            Some(fire_at) if now >= fire_at => {
                self.fire_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.fire_at.is_some()
    }
}
