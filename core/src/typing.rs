//! Time-sliced typing indicator.
//!
//! A typing signal keeps "user is typing..." visible for `TYPING_INTERVAL`,
//! or until that user posts in the channel. Typing for longer means sending
//! a fresh signal every interval. `TypingPlan` works out how many signals
//! are needed and hands out the pause after each one lazily, so the plan
//! stays constant-size for any duration.

use std::iter;
use std::time::Duration;

/// How long one typing signal stays visible.
pub const TYPING_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingPlan {
    duration: Duration,
    full: u64,
    remainder: Duration,
}

impl TypingPlan {
    /// Split `duration` into one slice per typing signal.
    ///
    /// Zero yields an empty plan. Otherwise there are
    /// `duration / TYPING_INTERVAL + 1` slices: full intervals followed by
    /// the remainder, which is zero for exact multiples.
    pub fn new(duration: Duration) -> Self {
        let interval = TYPING_INTERVAL.as_nanos();
        let total = duration.as_nanos();
        // Duration::MAX / 10s still fits in a u64.
        let full = (total / interval) as u64;
        let remainder = Duration::from_nanos((total % interval) as u64);
        Self {
            duration,
            full,
            remainder,
        }
    }

    /// Pause after each typing signal, in order.
    pub fn slices(&self) -> impl Iterator<Item = Duration> {
        let count = if self.is_empty() { 0 } else { self.full };
        let last = (!self.is_empty()).then_some(self.remainder);
        iter::repeat(TYPING_INTERVAL)
            .take(usize::try_from(count).unwrap_or(usize::MAX))
            .chain(last)
    }

    /// Number of typing signals to send.
    pub fn iterations(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.full.saturating_add(1)
        }
    }

    pub fn total(&self) -> Duration {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.duration.is_zero()
    }
}
