//! Shared session storage for Hide & Seek.
//!
//! Every client of a session reads, writes, and watches the same
//! [`Snapshot`](hideseek_protocol::Snapshot) through a [`SessionStore`].
//! Writes are full-snapshot replacements guarded by a version number:
//!
//! ```text
//! read() ──→ apply rules locally ──→ write(base version)
//!                                       │
//!                       ┌───────────────┴───────────────┐
//!                       ▼                               ▼
//!               version matches                  version moved on
//!             store bumps version,               StaleWrite: read
//!          subscribers get the snapshot            again and redo
//! ```
//!
//! [`MemoryStore`] is the in-process implementation. It is what the
//! simulation and the tests use, and it's a reference for anything
//! backed by a real database.

#![allow(async_fn_in_trait)]

mod code;
mod error;
mod identity;
mod memory;
mod store;
mod subscription;

pub use code::generate_code;
pub use error::StoreError;
pub use identity::{AnonymousIdentity, FixedIdentity, IdentityProvider};
pub use memory::{MemoryStore, StoreConfig};
pub use store::SessionStore;
pub use subscription::Subscription;
