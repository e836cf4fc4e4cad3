//! The store contract.

use std::future::Future;

use hideseek_protocol::{GameCode, PlayerId, Snapshot};

use crate::{StoreError, Subscription};

/// Shared, versioned storage for session snapshots.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so one store can be shared by every client
/// task and the referee behind an `Arc` (or a cheap `Clone`).
///
/// # Versioning
///
/// A snapshot's `version` is the version it was *read* at. [`write`]
/// succeeds only if that is still the stored version, then bumps it by
/// one. Anything else is a [`StoreError::StaleWrite`]; the caller reads
/// again and re-applies its change to the fresh snapshot.
///
/// [`write`]: SessionStore::write
pub trait SessionStore: Send + Sync + 'static {
    /// Creates a waiting session with `creator` as its only player and
    /// returns its freshly drawn code. Codes already in use are redrawn.
    fn create_session(
        &self,
        creator: PlayerId,
        username: &str,
    ) -> impl Future<Output = Result<GameCode, StoreError>> + Send;

    /// Returns the latest snapshot of a session.
    fn read(&self, code: &GameCode) -> impl Future<Output = Result<Snapshot, StoreError>> + Send;

    /// Replaces the stored snapshot and returns the new version.
    ///
    /// # Errors
    /// - [`StoreError::SessionNotFound`] if the code is unknown.
    /// - [`StoreError::StaleWrite`] if `snapshot.version` is not the
    ///   stored version.
    /// - [`StoreError::Protocol`] if the snapshot breaks an invariant.
    fn write(&self, snapshot: Snapshot) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Starts watching a session. The subscription yields the current
    /// snapshot first, then every committed write in order.
    fn subscribe(
        &self,
        code: &GameCode,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;

    /// Deletes a session. Open subscriptions end.
    fn remove(&self, code: &GameCode) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a session only if it is still at `version`, so a write that
    /// landed since the caller's last read keeps the session alive.
    ///
    /// # Errors
    /// - [`StoreError::SessionNotFound`] if the code is unknown.
    /// - [`StoreError::StaleWrite`] if the stored version moved on.
    fn remove_at(
        &self,
        code: &GameCode,
        version: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
