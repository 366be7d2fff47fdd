//! One bounded polling loop for everything that waits: health, file
//! appearance, file stability. Replaces per-call-site retry loops.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollOptions {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Panel startup polling: 250 ms cadence, ~10 s budget.
    pub fn startup() -> Self {
        Self::new(Duration::from_millis(250), 40)
    }

    /// Export completion: host exports give no completion signal, watch the
    /// output path for up to ~30 s.
    pub fn export_wait() -> Self {
        Self::new(Duration::from_millis(500), 60)
    }

    /// File-size stability: two samples 500 ms apart, bounded to ~20 s.
    pub fn stability_wait() -> Self {
        Self::new(Duration::from_millis(500), 40)
    }

    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Calls `predicate` up to `max_attempts` times, sleeping `interval` between
/// attempts. Returns true as soon as the predicate holds.
pub fn poll_until<F>(opts: PollOptions, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    for attempt in 0..opts.max_attempts {
        if predicate() {
            return true;
        }
        if attempt + 1 < opts.max_attempts {
            std::thread::sleep(opts.interval);
        }
    }
    false
}
