//! Error types for the session rules.

use hideseek_protocol::{Color, PlayerId};

/// Errors returned by session operations.
///
/// Every error leaves the input snapshot untouched; callers can retry or
/// report without any cleanup. Illegal *moves* are deliberately absent:
/// they are corrected to a no-op, never reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The requested phase change or lobby action isn't allowed right now,
    /// e.g. starting with fewer than two players or before everyone has a
    /// color.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    /// The player is not part of this session.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The lobby has reached its maximum size.
    #[error("session is full ({0} players)")]
    SessionFull(usize),

    /// The player is already in this session.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// Another player has already picked this color.
    #[error("color {0} is taken")]
    ColorTaken(Color),

    /// The player already picked a color; the choice is final.
    #[error("player {0} already selected a color")]
    ColorAlreadySelected(PlayerId),
}
