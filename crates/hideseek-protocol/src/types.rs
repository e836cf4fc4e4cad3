//! Core types for Hide & Seek session snapshots.
//!
//! Everything in this module can be serialized: a [`Snapshot`] is the only
//! unit exchanged with the store, so every field it contains must survive a
//! trip through a codec unchanged.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a player id can't be mixed up with any other
/// number. `#[serde(transparent)]` keeps the JSON form a plain number:
/// `PlayerId(42)` becomes `42`, not `{"0":42}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short, human-typable code that identifies a session.
///
/// Always exactly [`GameCode::LEN`] characters from `A-Z0-9`. Input is
/// upper-cased before validation, so `"ab12cd"` parses as `"AB12CD"`.
///
/// Deserialization goes through [`GameCode::parse`] (`try_from`), so a
/// malformed code can never be smuggled in through a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameCode(String);

impl GameCode {
    /// Number of characters in a game code.
    pub const LEN: usize = 6;

    /// Characters a game code may contain.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Normalizes and validates a code typed by a player.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidCode`] if the code has the wrong
    /// length or contains characters outside `A-Z0-9`.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != Self::LEN {
            return Err(ProtocolError::InvalidCode(raw.to_string()));
        }
        if !code.bytes().all(|b| Self::ALPHABET.contains(&b)) {
            return Err(ProtocolError::InvalidCode(raw.to_string()));
        }
        Ok(Self(code))
    }

    /// Builds a code from [`GameCode::LEN`] alphabet indices drawn from
    /// `pick`. Indices wrap around the alphabet, so the result is always
    /// valid.
    pub fn from_fn(mut pick: impl FnMut() -> usize) -> Self {
        let code = (0..Self::LEN)
            .map(|_| char::from(Self::ALPHABET[pick() % Self::ALPHABET.len()]))
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GameCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameCode> for String {
    fn from(code: GameCode) -> Self {
        code.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock time in milliseconds since the Unix epoch.
///
/// Session timing has to be shared between observers on different
/// machines, so we store wall-clock time rather than a monotonic
/// `Instant` (which is meaningless outside the process that created it).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Reads the system clock.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Builds a timestamp from whole seconds since the epoch.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Time elapsed since `earlier`. Zero if `earlier` is in the future
    /// (clock skew between observers).
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Returns this timestamp shifted forward by `d`.
    pub fn after(self, d: Duration) -> Self {
        Self(self.0.saturating_add(d.as_millis() as u64))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point on the map, in map units. The origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Avatar colors. A session never has two players with the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Orange,
    Violet,
    Mint,
    Rose,
}

impl Color {
    /// The full palette, in lobby display order.
    pub const PALETTE: [Color; 10] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Orange,
        Color::Violet,
        Color::Mint,
        Color::Rose,
    ];

    /// CSS hex value used by clients to paint the avatar.
    pub fn hex(self) -> &'static str {
        match self {
            Color::Red => "#ff4444",
            Color::Green => "#44ff44",
            Color::Blue => "#4444ff",
            Color::Yellow => "#ffff44",
            Color::Magenta => "#ff44ff",
            Color::Cyan => "#44ffff",
            Color::Orange => "#ff8844",
            Color::Violet => "#8844ff",
            Color::Mint => "#44ff88",
            Color::Rose => "#ff4488",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One participant in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub x: f64,
    pub y: f64,
    /// `None` until the player picks a color in the lobby.
    #[serde(default)]
    pub color: Option<Color>,
}

impl Player {
    /// A freshly joined player, standing at the origin with no color.
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            x: 0.0,
            y: 0.0,
            color: None,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn set_position(&mut self, pos: Position) {
        self.x = pos.x;
        self.y = pos.y;
    }
}

// ---------------------------------------------------------------------------
// Phase & Winner
// ---------------------------------------------------------------------------

/// The lifecycle phase of a session.
///
/// Transitions are strictly ordered, with no skipping and no way back:
///
/// ```text
/// Waiting → Playing → Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Waiting,
    Playing,
    Finished,
}

impl Phase {
    /// The only phase reachable from `self`, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Playing),
            Self::Playing => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if moving from `self` to `target` is legal.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Returns `true` once the session can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// Which side won a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// Every hider was found before time ran out.
    Finder,
    /// The time limit expired with at least one hider still free.
    Hiders,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finder => write!(f, "Finder"),
            Self::Hiders => write!(f, "Hiders"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The game-level state of a session: phase, roles, eliminations, timing.
///
/// `found_ids` is a `BTreeSet` so that two snapshots holding the same set
/// serialize to identical bytes regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub finder_id: Option<PlayerId>,
    pub found_ids: BTreeSet<PlayerId>,
    pub started_at: Option<Timestamp>,
    pub time_limit_secs: u64,
    pub winner: Option<Winner>,
}

impl SessionState {
    /// The state of a session that has not started yet.
    pub fn waiting() -> Self {
        Self {
            phase: Phase::Waiting,
            finder_id: None,
            found_ids: BTreeSet::new(),
            started_at: None,
            time_limit_secs: 0,
            winner: None,
        }
    }

    /// Returns `true` if `player` is the finder.
    pub fn is_finder(&self, player: PlayerId) -> bool {
        self.finder_id == Some(player)
    }

    /// Returns `true` if `player` has been eliminated.
    pub fn is_found(&self, player: PlayerId) -> bool {
        self.found_ids.contains(&player)
    }

    /// The configured time limit as a `Duration`.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// Time remaining before the hiders win, or `None` outside `Playing`.
    pub fn time_left(&self, now: Timestamp) -> Option<Duration> {
        if self.phase != Phase::Playing {
            return None;
        }
        let started = self.started_at?;
        Some(self.time_limit().saturating_sub(now.saturating_since(started)))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::waiting()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The complete state of one session at one instant.
///
/// This is the unit the store reads, writes, and publishes. `version` is
/// bumped by the store on every successful write; a write carrying an
/// older version than the stored one is stale and gets rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub code: GameCode,
    pub version: u64,
    pub creator_id: PlayerId,
    pub state: SessionState,
    /// Players in join order. Ids are unique.
    pub players: Vec<Player>,
}

impl Snapshot {
    /// A brand-new session with the creator as its only player.
    pub fn new(code: GameCode, creator: PlayerId, username: impl Into<String>) -> Self {
        Self {
            code,
            version: 0,
            creator_id: creator,
            state: SessionState::waiting(),
            players: vec![Player::new(creator, username)],
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Players who are neither the finder nor already found.
    pub fn hiders_remaining(&self) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(|p| !self.state.is_finder(p.id) && !self.state.is_found(p.id))
    }

    /// Checks the structural invariants of a snapshot.
    ///
    /// Used when decoding snapshots from outside the process. A snapshot
    /// produced by this workspace's own operations always passes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidSnapshot`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let invalid = |msg: String| -> Result<(), ProtocolError> {
            Err(ProtocolError::InvalidSnapshot(msg))
        };

        let mut ids = HashSet::with_capacity(self.players.len());
        let mut colors = HashSet::with_capacity(self.players.len());
        for p in &self.players {
            if !ids.insert(p.id) {
                return invalid(format!("duplicate player {}", p.id));
            }
            if let Some(color) = p.color {
                if !colors.insert(color) {
                    return invalid(format!("color {color} used twice"));
                }
            }
        }

        let s = &self.state;
        let started = s.phase != Phase::Waiting;
        if s.finder_id.is_some() != started {
            return invalid(format!("finder set in phase {}", s.phase));
        }
        if s.started_at.is_some() != started {
            return invalid(format!("start time set in phase {}", s.phase));
        }
        if s.winner.is_some() != (s.phase == Phase::Finished) {
            return invalid(format!("winner set in phase {}", s.phase));
        }
        if let Some(finder) = s.finder_id {
            if !ids.contains(&finder) {
                return invalid(format!("finder {finder} is not a player"));
            }
            if s.found_ids.contains(&finder) {
                return invalid(format!("finder {finder} marked as found"));
            }
        }
        if let Some(stranger) = s.found_ids.iter().find(|id| !ids.contains(id)) {
            return invalid(format!("found player {stranger} is not a player"));
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
