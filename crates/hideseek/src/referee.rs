//! Background time-limit enforcement.
//!
//! Clients only evaluate the win conditions when they act, so a session
//! where every hider stands still would never notice its time running
//! out. The referee is a Tokio task that wakes on a fixed tick, looks at
//! every session it has been told to watch, and writes the `Finished`
//! snapshot for any that are over.
//!
//! ```text
//! RefereeHandle ──Watch/Unwatch/Shutdown──→ referee task
//!                                              │ every tick
//!                                              ▼
//!                              read → machine::evaluate → write
//! ```

use std::collections::HashSet;

use hideseek_protocol::{GameCode, Phase};
use hideseek_session::machine;
use hideseek_store::{SessionStore, StoreError};
use hideseek_tick::{TickConfig, TickScheduler};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{Clock, HideSeekError};

/// Command channel capacity for the referee task.
const CHANNEL_SIZE: usize = 64;

/// Configuration for a [`Referee`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeConfig {
    /// How often to sweep. The time limit is enforced at most one tick
    /// late.
    pub tick: TickConfig,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::with_rate(4),
        }
    }
}

enum RefereeCommand {
    Watch(GameCode),
    Unwatch(GameCode),
    Watching(oneshot::Sender<usize>),
    Shutdown,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sessions this sweep moved to `Finished`.
    pub finished: Vec<GameCode>,
    /// Sessions dropped from the watch list (finished or gone).
    pub dropped: Vec<GameCode>,
}

/// Checks every session in `watched` once.
///
/// Finished and deleted sessions are removed from `watched`. A write that
/// loses a race is left for the next sweep: whoever won it either
/// finished the session already or will be re-checked then.
pub async fn sweep<S: SessionStore, C: Clock>(
    store: &S,
    clock: &C,
    watched: &mut HashSet<GameCode>,
) -> SweepReport {
    let mut report = SweepReport::default();

    for code in watched.iter() {
        let snapshot = match store.read(code).await {
            Ok(snapshot) => snapshot,
            Err(StoreError::SessionNotFound(_)) => {
                report.dropped.push(code.clone());
                continue;
            }
            Err(e) => {
                tracing::warn!(%code, error = %e, "referee read failed");
                continue;
            }
        };

        if snapshot.state.phase == Phase::Finished {
            report.dropped.push(code.clone());
            continue;
        }

        let Some(finished) = machine::evaluate(&snapshot, clock.now()) else {
            continue;
        };
        match store.write(finished).await {
            Ok(version) => {
                tracing::info!(%code, version, "referee finished session");
                report.finished.push(code.clone());
                report.dropped.push(code.clone());
            }
            Err(StoreError::StaleWrite { .. }) => {
                tracing::debug!(%code, "referee write was stale, retrying next tick");
            }
            Err(e) => {
                tracing::warn!(%code, error = %e, "referee write failed");
            }
        }
    }

    for code in &report.dropped {
        watched.remove(code);
    }
    report
}

/// Spawns referee tasks.
pub struct Referee;

impl Referee {
    /// Starts a referee task sweeping on `config.tick`. The task runs
    /// until [`RefereeHandle::shutdown`] is called or every handle is
    /// dropped.
    pub fn spawn<S, C>(store: S, clock: C, config: RefereeConfig) -> RefereeHandle
    where
        S: SessionStore,
        C: Clock,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
        let scheduler = TickScheduler::new(config.tick);
        let task = tokio::spawn(run(store, clock, scheduler, rx));
        RefereeHandle { sender: tx, task }
    }
}

async fn run<S: SessionStore, C: Clock>(
    store: S,
    clock: C,
    mut scheduler: TickScheduler,
    mut commands: mpsc::Receiver<RefereeCommand>,
) {
    let mut watched = HashSet::new();
    tracing::info!(rate_hz = scheduler.tick_rate_hz(), "referee started");

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(RefereeCommand::Watch(code)) => {
                    tracing::debug!(%code, "referee watching session");
                    watched.insert(code);
                }
                Some(RefereeCommand::Unwatch(code)) => {
                    watched.remove(&code);
                }
                Some(RefereeCommand::Watching(reply)) => {
                    let _ = reply.send(watched.len());
                }
                Some(RefereeCommand::Shutdown) | None => break,
            },
            tick = scheduler.wait_for_tick() => {
                if watched.is_empty() {
                    continue;
                }
                let report = sweep(&store, &clock, &mut watched).await;
                tracing::trace!(
                    tick = tick.tick,
                    finished = report.finished.len(),
                    watching = watched.len(),
                    "referee sweep"
                );
            }
        }
    }

    tracing::info!("referee stopped");
}

/// Handle to a running referee task.
pub struct RefereeHandle {
    sender: mpsc::Sender<RefereeCommand>,
    task: JoinHandle<()>,
}

impl RefereeHandle {
    /// Adds a session to the watch list. It stays there until it
    /// finishes, is deleted, or is unwatched.
    pub async fn watch(&self, code: GameCode) -> Result<(), HideSeekError> {
        self.send(RefereeCommand::Watch(code)).await
    }

    pub async fn unwatch(&self, code: GameCode) -> Result<(), HideSeekError> {
        self.send(RefereeCommand::Unwatch(code)).await
    }

    /// Number of sessions currently on the watch list.
    pub async fn watching(&self) -> Result<usize, HideSeekError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RefereeCommand::Watching(reply_tx)).await?;
        reply_rx.await.map_err(|_| HideSeekError::RefereeStopped)
    }

    /// Stops the task and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.sender.send(RefereeCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "referee task ended abnormally");
        }
    }

    async fn send(&self, cmd: RefereeCommand) -> Result<(), HideSeekError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| HideSeekError::RefereeStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referee_config_default() {
        let config = RefereeConfig::default();
        assert_eq!(config.tick.tick_rate_hz, 4);
    }
}
