//! Session snapshot protocol for Hide & Seek.
//!
//! This crate defines the data every other layer agrees on:
//!
//! - **Types** ([`Snapshot`], [`SessionState`], [`Player`], [`Phase`],
//!   [`Winner`], ...) - the complete, serializable state of one session.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) - how snapshots become
//!   bytes for the store and back.
//! - **Errors** ([`ProtocolError`]) - what can go wrong doing that.
//!
//! # Architecture
//!
//! ```text
//! Store (bytes / snapshots) ⇄ Protocol (Snapshot) ⇄ Session rules
//! ```
//!
//! The protocol layer knows nothing about movement or win conditions; it
//! only guarantees that a snapshot is well-formed.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Color, GameCode, Phase, Player, PlayerId, Position, SessionState, Snapshot, Timestamp,
    Winner,
};
