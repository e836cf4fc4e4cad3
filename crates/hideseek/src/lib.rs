//! # Hide & Seek
//!
//! The authoritative core of a real-time, multiplayer hide-and-seek game.
//!
//! Players move avatars on a shared warehouse map. One of them, the
//! finder, is picked at random when the game starts and, after a short
//! grace period, catches every hider it steps close to. The finder wins
//! by catching everyone; the hiders win by lasting until the time limit.
//!
//! ## Layers
//!
//! ```text
//! GameClient / Referee       (this crate)       ← what a front end drives
//!     ↕
//! hideseek-session           pure rules         ← lobby, start, moves, wins
//! hideseek-map               geometry           ← legal positions
//!     ↕
//! hideseek-store             shared state       ← versioned snapshots + feeds
//! hideseek-protocol          data               ← Snapshot, ids, codec
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hideseek::prelude::*;
//!
//! # async fn demo() -> Result<(), HideSeekError> {
//! let store = MemoryStore::default();
//! let mut host = GameClient::connect(
//!     store.clone(),
//!     &AnonymousIdentity::new(),
//!     SystemClock,
//!     ClientConfig::default(),
//! )
//! .await?;
//! let code = host.create("alice").await?;
//! host.select_color(Color::Red).await?;
//! // ...another client joins `code` and picks a color...
//! host.start().await?;
//! host.move_key("ArrowRight").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod clock;
mod error;
mod referee;

pub use client::{ClientConfig, GameClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::HideSeekError;
pub use referee::{Referee, RefereeConfig, RefereeHandle, SweepReport, sweep};

pub use hideseek_map as map;
pub use hideseek_protocol as protocol;
pub use hideseek_session as session;
pub use hideseek_store as store;
pub use hideseek_tick as tick;

/// Everything a front end typically needs, in one import.
pub mod prelude {
    pub use crate::{
        ClientConfig, Clock, GameClient, HideSeekError, ManualClock, Referee, RefereeConfig,
        RefereeHandle, SystemClock,
    };
    pub use hideseek_map::{Direction, Map, MoveRules};
    pub use hideseek_protocol::{
        Color, GameCode, Phase, Player, PlayerId, Position, Snapshot, Timestamp, Winner,
    };
    pub use hideseek_session::GameConfig;
    pub use hideseek_store::{
        AnonymousIdentity, FixedIdentity, IdentityProvider, MemoryStore, SessionStore,
        StoreConfig, Subscription,
    };
}
