//! Integration tests for the tick scheduler.
//!
//! Every timed test runs on a paused Tokio clock, so sleeps resolve as
//! soon as the runtime has nothing else to do.

use std::time::Duration;

use hideseek_tick::{TickConfig, TickScheduler};

fn config_4hz() -> TickConfig {
    TickConfig {
        initial_jitter_us: 0,
        ..TickConfig::with_rate(4)
    }
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_disabled() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 0);
    assert_eq!(cfg.tick_duration(), None);
}

#[test]
fn test_with_rate_sets_duration() {
    assert_eq!(
        TickConfig::with_rate(4).tick_duration(),
        Some(Duration::from_millis(250))
    );
}

#[test]
fn test_validated_clamps_rate() {
    let cfg = TickConfig::with_rate(500).validated();
    assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
}

#[test]
fn test_scheduler_initial_state() {
    let s = TickScheduler::new(config_4hz());
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.tick_rate_hz(), 4);
    assert!(!s.is_disabled());
    assert!(!s.is_paused());
}

// =========================================================================
// Ticking
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_on_schedule() {
    let mut s = TickScheduler::new(config_4hz());
    let start = tokio::time::Instant::now();

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(info.dt, Duration::from_millis(250));
    assert!(!info.overrun);
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_are_numbered_in_order() {
    let mut s = TickScheduler::new(config_4hz());
    for expected in 1..=6 {
        assert_eq!(s.wait_for_tick().await.tick, expected);
    }
    assert_eq!(s.tick_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_late_tick_skips_missed_ticks() {
    let mut s = TickScheduler::new(config_4hz());
    s.wait_for_tick().await;

    // Next tick was due 250 ms from now; show up 625 ms late instead.
    tokio::time::advance(Duration::from_millis(875)).await;
    let info = s.wait_for_tick().await;

    assert!(info.overrun);
    assert_eq!(info.ticks_skipped, 2);
    assert_eq!(info.tick, 2);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_scheduler_never_fires() {
    let mut s = TickScheduler::with_rate(0);
    assert!(s.is_disabled());

    let result = tokio::time::timeout(Duration::from_secs(60), s.wait_for_tick()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_initial_jitter_delays_first_tick_only() {
    let mut s = TickScheduler::new(TickConfig {
        initial_jitter_us: 10_000,
        ..TickConfig::with_rate(4)
    });
    let start = tokio::time::Instant::now();

    s.wait_for_tick().await;
    let first = start.elapsed();
    assert!(first >= Duration::from_millis(250));
    assert!(first < Duration::from_millis(260));

    s.wait_for_tick().await;
    assert_eq!(start.elapsed() - first, Duration::from_millis(250));
}

// =========================================================================
// Pause / resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_stops_ticks() {
    let mut s = TickScheduler::new(config_4hz());
    s.wait_for_tick().await;

    s.pause();
    let result = tokio::time::timeout(Duration::from_secs(5), s.wait_for_tick()).await;
    assert!(result.is_err());
    assert_eq!(s.tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_resume_restarts_one_interval_later() {
    let mut s = TickScheduler::new(config_4hz());
    s.wait_for_tick().await;
    s.pause();
    tokio::time::advance(Duration::from_secs(3)).await;

    s.resume();
    let resumed_at = tokio::time::Instant::now();
    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 2);
    assert!(!info.overrun);
    assert_eq!(resumed_at.elapsed(), Duration::from_millis(250));
}

#[test]
fn test_pause_resume_idempotent() {
    let mut s = TickScheduler::new(config_4hz());
    s.pause();
    s.pause();
    assert!(s.is_paused());
    s.resume();
    s.resume();
    assert!(!s.is_paused());
}

// =========================================================================
// select! loop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_stops_on_shutdown() {
    let mut s = TickScheduler::new(config_4hz());
    let (tx, mut rx) = tokio::sync::watch::channel(false);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        tx.send(true).ok();
    });

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = rx.changed() => break,
            info = s.wait_for_tick() => {
                ticks += 1;
                assert_eq!(info.tick, ticks);
            }
        }
    }
    assert_eq!(ticks, 4);
}
