//! Player identity.
//!
//! The store never decides who a client is. It asks an
//! [`IdentityProvider`], the same way a server asks an authenticator. A
//! real deployment plugs in whatever its auth backend hands out; the
//! providers here cover anonymous play and tests.

use std::future::Future;

use hideseek_protocol::PlayerId;
use rand::Rng;

use crate::StoreError;

/// Supplies the stable [`PlayerId`] of the local client.
///
/// The id must not change for the lifetime of the client: snapshots refer
/// to players by it, and a client that changes identity mid-game becomes
/// a stranger to its own session.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns this client's player id.
    fn identity(&self) -> impl Future<Output = Result<PlayerId, StoreError>> + Send;
}

/// Signs in anonymously: a random id, drawn once and then kept.
#[derive(Debug, Clone, Copy)]
pub struct AnonymousIdentity {
    id: PlayerId,
}

impl AnonymousIdentity {
    pub fn new() -> Self {
        Self::with_rng(&mut rand::rng())
    }

    /// Draws the id from `rng`, for reproducible tests.
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            id: PlayerId(rng.random()),
        }
    }
}

impl Default for AnonymousIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for AnonymousIdentity {
    async fn identity(&self) -> Result<PlayerId, StoreError> {
        Ok(self.id)
    }
}

/// Always answers with the same, caller-chosen id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedIdentity(pub PlayerId);

impl IdentityProvider for FixedIdentity {
    async fn identity(&self) -> Result<PlayerId, StoreError> {
        Ok(self.0)
    }
}
