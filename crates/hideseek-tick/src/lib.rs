//! Fixed-rate tick scheduler for Hide & Seek.
//!
//! Nothing in a session happens on its own: positions change when
//! players move, and the time limit is only noticed when somebody looks
//! at the clock. The scheduler provides that "somebody". A referee task
//! waits on [`TickScheduler::wait_for_tick`] and re-evaluates every
//! session it watches.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = shutdown.changed() => break,
//!         tick = scheduler.wait_for_tick() => sweep(tick).await,
//!     }
//! }
//! ```
//!
//! A rate of 0 disables ticking: `wait_for_tick` then pends forever,
//! which leaves the other `select!` branches in charge.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`TickScheduler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Ticks per second. 0 = never tick.
    pub tick_rate_hz: u32,
    /// Random delay (0..max µs) added to the *first* tick only, so that
    /// schedulers started together don't stay in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Highest rate accepted. Sweeps only read snapshots and compare
    /// clocks; anything faster is wasted work.
    pub const MAX_TICK_RATE_HZ: u32 = 60;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Caps `tick_rate_hz` at [`Self::MAX_TICK_RATE_HZ`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Time between ticks, or `None` when ticking is off.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// TickInfo
// ---------------------------------------------------------------------------

/// What [`TickScheduler::wait_for_tick`] hands back each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// The fixed interval between ticks.
    pub dt: Duration,
    /// `true` if the tick fired noticeably late.
    pub overrun: bool,
    /// Whole ticks that were skipped because of the delay.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fires ticks at a fixed rate on the Tokio clock.
///
/// When a tick fires late (the sweep took too long, or the runtime was
/// busy) the missed ticks are skipped and the schedule restarts from the
/// moment of firing. Sweeps are idempotent, so replaying them would only
/// add load.
pub struct TickScheduler {
    tick_duration: Option<Duration>,
    tick_rate_hz: u32,
    tick_count: u64,
    next_tick: Option<Instant>,
    paused: bool,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let next_tick = tick_duration.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
            } else {
                Duration::ZERO
            };
            Instant::now() + d + jitter
        });

        match tick_duration {
            Some(d) => debug!(
                rate_hz = config.tick_rate_hz,
                interval_ms = d.as_secs_f64() * 1000.0,
                "tick scheduler created"
            ),
            None => debug!("tick scheduler created with ticking disabled"),
        }

        Self {
            tick_duration,
            tick_rate_hz: config.tick_rate_hz,
            tick_count: 0,
            next_tick,
            paused: false,
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits for the next tick.
    ///
    /// Pends forever while paused or when ticking is disabled.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, dt) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(dt)) if !self.paused => (next, dt),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        // More than 10% late counts as an overrun.
        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > dt / 10;
        let ticks_skipped = if overrun {
            (late_by.as_nanos() / dt.as_nanos()) as u64
        } else {
            0
        };
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun, skipping ahead"
            );
        }
        self.next_tick = Some(now + dt);

        trace!(tick = self.tick_count, overrun, "tick fired");
        TickInfo {
            tick: self.tick_count,
            dt,
            overrun,
            ticks_skipped,
        }
    }

    /// Stops ticking until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Restarts ticking one full interval from now, so the time spent
    /// paused doesn't come back as a burst.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(dt) = self.tick_duration {
                self.next_tick = Some(Instant::now() + dt);
            }
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// `true` when the rate is 0 and the scheduler never ticks.
    pub fn is_disabled(&self) -> bool {
        self.tick_duration.is_none()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}
