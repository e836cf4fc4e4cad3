//! Live feed of one session's snapshots.

use futures_util::Stream;
use hideseek_protocol::{GameCode, Snapshot};
use tokio::sync::broadcast::{self, error::RecvError};

/// An ordered, finite sequence of snapshots for one session.
///
/// The first item is the snapshot current at subscribe time; after that,
/// every committed write in commit order. The sequence ends right after
/// a `Finished` snapshot, or when the session is removed.
///
/// A subscriber that falls more than the store's buffer behind skips to
/// the oldest snapshot still buffered. Each snapshot is complete, so
/// nothing is lost except intermediate positions.
pub struct Subscription {
    code: GameCode,
    initial: Option<Snapshot>,
    feed: broadcast::Receiver<Snapshot>,
    last_version: Option<u64>,
    finished: bool,
}

impl Subscription {
    /// Wraps a store's broadcast feed. `current` must be the stored
    /// snapshot at the moment `feed` was subscribed.
    pub fn new(current: Snapshot, feed: broadcast::Receiver<Snapshot>) -> Self {
        Self {
            code: current.code.clone(),
            initial: Some(current),
            feed,
            last_version: None,
            finished: false,
        }
    }

    pub fn code(&self) -> &GameCode {
        &self.code
    }

    /// Waits for the next snapshot. Returns `None` once the sequence has
    /// ended.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.finished {
            return None;
        }

        let snapshot = match self.initial.take() {
            Some(snapshot) => snapshot,
            None => self.recv_newer().await?,
        };

        self.last_version = Some(snapshot.version);
        if snapshot.state.phase.is_terminal() {
            tracing::debug!(code = %self.code, version = snapshot.version, "subscription finished");
            self.finished = true;
        }
        Some(snapshot)
    }

    async fn recv_newer(&mut self) -> Option<Snapshot> {
        loop {
            match self.feed.recv().await {
                Ok(snapshot) => {
                    // A write may land between reading the current
                    // snapshot and subscribing to the feed.
                    if self.last_version.is_some_and(|v| snapshot.version <= v) {
                        continue;
                    }
                    return Some(snapshot);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(code = %self.code, skipped, "subscriber lagging, skipping ahead");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(code = %self.code, "session feed closed");
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    /// Turns the subscription into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Snapshot> + Send {
        futures_util::stream::unfold(self, |mut sub| async move {
            let snapshot = sub.next().await?;
            Some((snapshot, sub))
        })
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("code", &self.code)
            .field("last_version", &self.last_version)
            .field("finished", &self.finished)
            .finish()
    }
}
