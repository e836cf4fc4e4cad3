//! In-process session store.

use std::collections::HashMap;
use std::sync::Arc;

use hideseek_protocol::{GameCode, PlayerId, Snapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};

use crate::{SessionStore, StoreError, Subscription, generate_code};

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`MemoryStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshots buffered per session for slow subscribers. A subscriber
    /// further behind than this skips ahead.
    pub subscription_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            subscription_buffer: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

struct Entry {
    snapshot: Snapshot,
    feed: broadcast::Sender<Snapshot>,
}

/// A [`SessionStore`] that keeps every session in memory.
///
/// Cloning is cheap and every clone sees the same sessions, so each
/// simulated client can hold its own handle. One mutex guards all
/// sessions; every operation holds it only for a map lookup and a clone.
#[derive(Clone)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<GameCode, Entry>>>,
    config: StoreConfig,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Codes of every live session, in no particular order.
    pub async fn codes(&self) -> Vec<GameCode> {
        self.sessions.lock().await.keys().cloned().collect()
    }

    fn fresh_code(taken: &HashMap<GameCode, Entry>) -> GameCode {
        let mut rng = rand::rng();
        loop {
            let code = generate_code(&mut rng);
            if !taken.contains_key(&code) {
                return code;
            }
            tracing::debug!(%code, "game code collision, redrawing");
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl SessionStore for MemoryStore {
    async fn create_session(
        &self,
        creator: PlayerId,
        username: &str,
    ) -> Result<GameCode, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let code = Self::fresh_code(&sessions);
        let snapshot = Snapshot::new(code.clone(), creator, username);
        let (feed, _) = broadcast::channel(self.config.subscription_buffer.max(1));
        sessions.insert(code.clone(), Entry { snapshot, feed });

        tracing::info!(%code, %creator, "session created");
        Ok(code)
    }

    async fn read(&self, code: &GameCode) -> Result<Snapshot, StoreError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(code)
            .map(|entry| entry.snapshot.clone())
            .ok_or_else(|| StoreError::SessionNotFound(code.clone()))
    }

    async fn write(&self, mut snapshot: Snapshot) -> Result<u64, StoreError> {
        snapshot.validate()?;

        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .get_mut(&snapshot.code)
            .ok_or_else(|| StoreError::SessionNotFound(snapshot.code.clone()))?;

        let current = entry.snapshot.version;
        if snapshot.version != current {
            tracing::warn!(
                code = %snapshot.code,
                based_on = snapshot.version,
                current,
                "stale write rejected"
            );
            return Err(StoreError::StaleWrite {
                code: snapshot.code,
                based_on: snapshot.version,
                current,
            });
        }

        snapshot.version = current + 1;
        entry.snapshot = snapshot.clone();
        tracing::debug!(code = %snapshot.code, version = snapshot.version, "snapshot committed");

        // No receivers is fine: nobody is watching yet.
        let _ = entry.feed.send(snapshot);
        Ok(current + 1)
    }

    async fn subscribe(&self, code: &GameCode) -> Result<Subscription, StoreError> {
        let sessions = self.sessions.lock().await;
        let entry = sessions
            .get(code)
            .ok_or_else(|| StoreError::SessionNotFound(code.clone()))?;
        Ok(Subscription::new(entry.snapshot.clone(), entry.feed.subscribe()))
    }

    async fn remove(&self, code: &GameCode) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .remove(code)
            .ok_or_else(|| StoreError::SessionNotFound(code.clone()))?;
        tracing::info!(%code, "session removed");
        Ok(())
    }

    async fn remove_at(&self, code: &GameCode, version: u64) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        let current = sessions
            .get(code)
            .map(|entry| entry.snapshot.version)
            .ok_or_else(|| StoreError::SessionNotFound(code.clone()))?;

        if current != version {
            tracing::debug!(%code, based_on = version, current, "remove skipped, session changed");
            return Err(StoreError::StaleWrite {
                code: code.clone(),
                based_on: version,
                current,
            });
        }
        sessions.remove(code);
        tracing::info!(%code, version, "session removed");
        Ok(())
    }
}
