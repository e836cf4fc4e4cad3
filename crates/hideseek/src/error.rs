//! Unified error type for the Hide & Seek crates.

use hideseek_protocol::ProtocolError;
use hideseek_session::SessionError;
use hideseek_store::StoreError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors, so a
/// client operation that touches the rules and the store has a single
/// error type.
#[derive(Debug, thiserror::Error)]
pub enum HideSeekError {
    /// Bad game code, or a snapshot that failed to decode or validate.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rule rejected the operation (illegal transition, full lobby, ...).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The store failed: unknown session, or a write lost the race.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The client hasn't created or joined a session yet.
    #[error("not in a session")]
    NotInSession,

    /// The referee task has shut down.
    #[error("referee is not running")]
    RefereeStopped,
}
