use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of frame timestamps, measured from the clock's own origin.
///
/// Successive calls never go backwards.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Capability to ask the host for exactly one more frame callback.
///
/// Nothing repeats on its own: the loop re-registers at the end of every frame
/// it wants to follow up on.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[derive(Debug, Clone, Copy)]
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
        Instant::now().saturating_duration_since(self.origin)
    }
}

/// Hand-driven clock for headless runs and tests. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Moves the clock to `at`; earlier values are ignored.
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Records frame requests instead of waiting on a display refresh.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    pending: bool,
    requested_total: u64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the outstanding request, if any.
    pub fn take_request(&mut self) -> bool {
        let was_pending = self.pending;
        self.pending = false;
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn requested_total(&self) -> u64 {
        self.requested_total
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requested_total = self.requested_total.saturating_add(1);
    }
}
