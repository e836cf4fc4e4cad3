//! Game rules for a Hide & Seek session.
//!
//! Everything here is a pure, synchronous function from one [`Snapshot`]
//! to the next. Nothing performs I/O or reads a clock: the caller passes
//! `now` and a random source in, which keeps every rule deterministic
//! under test.
//!
//! # Modules
//!
//! - [`lobby`] - create, join, pick a color, leave (Waiting phase only)
//! - [`machine`] - `Waiting → Playing → Finished` and the win conditions
//! - [`elimination`] - who the finder catches on a move
//! - [`reconcile`] - fold one move into the latest snapshot
//! - [`GracePeriod`] - the observer-local countdown before the finder may
//!   catch anyone
//!
//! [`Snapshot`]: hideseek_protocol::Snapshot

mod config;
mod error;
mod grace;

pub mod elimination;
pub mod lobby;
pub mod machine;
pub mod reconcile;

pub use config::GameConfig;
pub use error::SessionError;
pub use grace::GracePeriod;
