//! The finder's grace period.
//!
//! The grace period is *not* part of the shared snapshot. Each observer
//! starts its own countdown the moment it first sees the session in
//! `Playing`, the same way each client shows its own "Hiders: run away!"
//! banner. Two observers may therefore disagree by up to their delivery
//! latency about when the finder becomes dangerous.

use std::time::Duration;

use hideseek_protocol::Timestamp;

/// A countdown that began at a known instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GracePeriod {
    began_at: Timestamp,
    duration: Duration,
}

impl GracePeriod {
    /// Starts a countdown of `duration` at `now`.
    pub fn begin(now: Timestamp, duration: Duration) -> Self {
        Self {
            began_at: now,
            duration,
        }
    }

    pub fn began_at(&self) -> Timestamp {
        self.began_at
    }

    /// Returns `true` once the full duration has passed.
    pub fn has_elapsed(&self, now: Timestamp) -> bool {
        now.saturating_since(self.began_at) >= self.duration
    }

    /// Time left on the countdown, zero once elapsed.
    pub fn remaining(&self, now: Timestamp) -> Duration {
        self.duration
            .saturating_sub(now.saturating_since(self.began_at))
    }
}
