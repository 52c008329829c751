//! Tick scheduling and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Decides when the next tick runs.
pub trait Scheduler {
    /// Blocks until the next tick is due.
    ///
    /// Returns `false` once the scheduler has been cancelled; no tick may run
    /// after that.
    fn wait_next(&mut self) -> bool;

    /// Cancels every pending tick.
    fn cancel(&mut self);
}

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a signal handler or another thread can stop
/// the loop. The loop notices at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raw flag, for registration with `signal_hook::flag`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Fixed-rate deadline tracker.
///
/// Missed frames are skipped rather than replayed, so a stalled frame never
/// causes a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FrameTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    /// Timer ticking `frames_per_second` times per second (at least once).
    pub fn from_rate(frames_per_second: u32) -> Self {
        Self::new(Duration::from_secs(1) / frames_per_second.max(1))
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the current deadline. The first call fires immediately.
    pub fn remaining(&self) -> Duration {
        match self.next_deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Consumes the current deadline and arms the next one.
    pub fn advance(&mut self) {
        let now = Instant::now();
        let next = match self.next_deadline {
            Some(deadline) => deadline + self.interval,
            None => now + self.interval,
        };
        self.next_deadline = Some(if next <= now { now + self.interval } else { next });
    }
}
