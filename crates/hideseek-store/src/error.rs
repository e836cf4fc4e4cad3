//! Error types for the store layer.

use hideseek_protocol::{GameCode, ProtocolError};

/// Errors that can occur while reading, writing, or watching sessions.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No session exists under this code. Either it was never created or
    /// it has been removed.
    #[error("session {0} not found")]
    SessionNotFound(GameCode),

    /// The write was based on an outdated snapshot. Somebody else wrote
    /// first; read the latest snapshot and apply the change again.
    #[error("stale write to {code}: based on version {based_on}, store is at {current}")]
    StaleWrite {
        code: GameCode,
        based_on: u64,
        current: u64,
    },

    /// The snapshot failed validation or could not be (de)serialized.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
