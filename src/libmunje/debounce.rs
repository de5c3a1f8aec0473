use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// Coalesces raw query keystrokes into an effective query. A submitted value
/// only becomes effective once no further submission has arrived for a full
/// quiescence window; every submission restarts the single pending deadline,
/// so rapid retyping keeps at most one timer armed and only the latest value
/// is ever promoted.
///
/// Timekeeping is passed in by the caller, which keeps the type deterministic
/// under test and lets an event loop sleep exactly until `deadline()`.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    effective: String,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    value: String,
    due: Instant,
}

impl Debouncer {
    pub fn new(window: Duration) -> Debouncer {
        Debouncer {
            window,
            effective: String::new(),
            pending: None,
        }
    }

    /// The query filtering should currently use.
    pub fn effective(&self) -> &str {
        &self.effective
    }

    /// Records a keystroke's value and restarts the quiescence window.
    pub fn submit(&mut self, value: &str, now: Instant) {
        self.pending = Some(Pending {
            value: value.to_string(),
            due: now + self.window,
        });
    }

    /// When the pending value (if any) becomes effective.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Promotes the pending value if its window has elapsed. Returns the newly
    /// effective query exactly once per promotion.
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            let pending = self.pending.take().unwrap();
            self.effective = pending.value;
            Some(&self.effective)
        } else {
            None
        }
    }

    /// Promotes the pending value immediately (the user pressed enter).
    pub fn flush(&mut self) -> &str {
        if let Some(pending) = self.pending.take() {
            self.effective = pending.value;
        }
        &self.effective
    }

    /// Drops the pending value; the effective query is left as it was.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Makes `value` effective at once, bypassing the window. Used when the
    /// query is set by something other than typing (a flag, a reset).
    pub fn force(&mut self, value: &str) {
        self.pending = None;
        self.effective = value.to_string();
    }
}

impl Default for Debouncer {
    fn default() -> Debouncer {
        Debouncer::new(DEFAULT_WINDOW)
    }
}
