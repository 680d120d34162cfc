//! Local typing-indicator debouncing.
//!
//! The indicator goes up the moment local input becomes non-empty and comes
//! down on the trailing edge of input activity: every input change restarts
//! a fixed idle window, and when the window elapses with no further change a
//! single `typing=false` is due. Clearing the input (send, manual wipe)
//! drops the indicator immediately.
//!
//! Pure state machine in the same style as the connection machine: time is
//! a parameter, the caller drives ticks, and the return value is the typing
//! flag that must be sent now (if any).

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

/// Idle window after which the typing indicator is retracted.
pub const TYPING_IDLE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Trailing-edge debouncer for the local typing indicator.
#[derive(Debug, Clone)]
pub struct TypingTracker<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Idle window length.
    timeout: Duration,
    /// Last input change while typing. `None` when not typing.
    last_change: Option<I>,
}

impl<I> TypingTracker<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Tracker with the standard idle window.
    pub fn new() -> Self {
        Self::with_timeout(TYPING_IDLE_TIMEOUT)
    }

    /// Tracker with a custom idle window.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, last_change: None }
    }

    /// Whether the local user currently counts as typing.
    pub fn is_typing(&self) -> bool {
        self.last_change.is_some()
    }

    /// Record an input change.
    ///
    /// Returns the typing flag to send now: `Some(true)` on the empty →
    /// non-empty edge, `Some(false)` on the non-empty → empty edge, `None`
    /// while the state is unchanged (the idle window still restarts).
    pub fn input_changed(&mut self, non_empty: bool, now: I) -> Option<bool> {
        if non_empty {
            let was_typing = self.last_change.is_some();
            self.last_change = Some(now);
            (!was_typing).then_some(true)
        } else {
            self.last_change.take().map(|_| false)
        }
    }

    /// Check the idle window.
    ///
    /// Returns `Some(false)` exactly once per idle period, on the first tick
    /// at or past the deadline.
    pub fn tick(&mut self, now: I) -> Option<bool> {
        let last = self.last_change?;
        if now > last && now - last >= self.timeout {
            self.last_change = None;
            Some(false)
        } else {
            None
        }
    }
}

impl<I> Default for TypingTracker<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}
