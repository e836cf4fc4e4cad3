//! A player's view of one session.
//!
//! [`GameClient`] is what a front end drives: it turns "create", "join",
//! "pick red", "start", "arrow left" into rule applications against the
//! *latest* stored snapshot and writes the result back.
//!
//! # Read-modify-write
//!
//! Every change reads the current snapshot, applies a pure rule from
//! `hideseek_session`, and writes the result with the version it read.
//! If another client wrote in between, the store answers
//! [`StoreError::StaleWrite`]; the client re-reads and re-applies, up to
//! [`ClientConfig::write_attempts`] times in total, then gives up and
//! returns the error.
//!
//! # Grace period
//!
//! The grace period lives here, not in the snapshot. The client starts
//! its countdown the first time it sees its session in `Playing`, whether
//! that snapshot came from its own `start`, a move, or [`observe`].
//!
//! [`observe`]: GameClient::observe

use std::time::Duration;

use hideseek_map::Direction;
use hideseek_protocol::{Color, GameCode, Phase, PlayerId, Snapshot};
use hideseek_session::{GameConfig, GracePeriod, SessionError, lobby, machine, reconcile};
use hideseek_store::{IdentityProvider, SessionStore, StoreError, Subscription};
use serde::{Deserialize, Serialize};

use crate::{Clock, HideSeekError, SystemClock};

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`GameClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The rules every client of a session must agree on.
    pub game: GameConfig,

    /// How many times one change is tried before a stale write is
    /// reported. 1 = never retry.
    pub write_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            write_attempts: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// GameClient
// ---------------------------------------------------------------------------

/// One player's handle on the shared session state.
pub struct GameClient<S: SessionStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    config: ClientConfig,
    player_id: PlayerId,
    code: Option<GameCode>,
    grace: Option<GracePeriod>,
}

impl<S: SessionStore, C: Clock> GameClient<S, C> {
    /// Resolves the local player's identity and returns a client that is
    /// not yet part of any session.
    pub async fn connect<I: IdentityProvider>(
        store: S,
        identity: &I,
        clock: C,
        config: ClientConfig,
    ) -> Result<Self, HideSeekError> {
        let player_id = identity.identity().await?;
        tracing::debug!(%player_id, "client connected");
        Ok(Self {
            store,
            clock,
            config,
            player_id,
            code: None,
            grace: None,
        })
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// The session this client is in, if any.
    pub fn code(&self) -> Option<&GameCode> {
        self.code.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn require_code(&self) -> Result<GameCode, HideSeekError> {
        self.code.clone().ok_or(HideSeekError::NotInSession)
    }

    // -----------------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------------

    /// Creates a new session with this player as creator and joins it.
    pub async fn create(&mut self, username: &str) -> Result<GameCode, HideSeekError> {
        let code = self.store.create_session(self.player_id, username).await?;
        self.enter(code.clone());
        Ok(code)
    }

    /// Joins the session behind a code typed by the player. The code is
    /// case-insensitive.
    pub async fn join(&mut self, code: &str, username: &str) -> Result<Snapshot, HideSeekError> {
        let code = GameCode::parse(code)?;
        let base = self.store.read(&code).await?;
        let (me, game) = (self.player_id, &self.config.game);
        let snapshot = commit(&self.store, base, self.config.write_attempts, |s| {
            Ok(Some(lobby::join(s, game, me, username)?))
        })
        .await?;
        self.enter(code);
        Ok(snapshot)
    }

    /// Picks this player's avatar color.
    pub async fn select_color(&mut self, color: Color) -> Result<Snapshot, HideSeekError> {
        let base = self.latest().await?;
        let me = self.player_id;
        let snapshot = commit(&self.store, base, self.config.write_attempts, |s| {
            Ok(Some(lobby::select_color(s, me, color)?))
        })
        .await?;
        Ok(snapshot)
    }

    /// Leaves a waiting session. If this was the last player, the session
    /// is deleted, unless another player joined it in the meantime.
    /// Returns the snapshot left behind, or `None` if deleted.
    pub async fn leave(&mut self) -> Result<Option<Snapshot>, HideSeekError> {
        let code = self.require_code()?;
        let base = self.store.read(&code).await?;
        let me = self.player_id;
        let snapshot = commit(&self.store, base, self.config.write_attempts, |s| {
            Ok(Some(lobby::leave(s, me)?))
        })
        .await?;

        self.code = None;
        self.grace = None;
        if !snapshot.players.is_empty() {
            return Ok(Some(snapshot));
        }
        match self.store.remove_at(&code, snapshot.version).await {
            Ok(()) => Ok(None),
            // Someone joined the empty lobby before it was removed.
            Err(StoreError::StaleWrite { .. }) => Ok(Some(self.store.read(&code).await?)),
            Err(e) => Err(e.into()),
        }
    }

    /// Starts the game. Only the session's creator may do this.
    ///
    /// # Errors
    /// [`SessionError::IllegalTransition`] if this player isn't the
    /// creator, or if the lobby isn't ready (see [`machine::start`]).
    pub async fn start(&mut self) -> Result<Snapshot, HideSeekError> {
        let base = self.latest().await?;
        let (me, game, now) = (self.player_id, &self.config.game, self.clock.now());
        let snapshot = commit(&self.store, base, self.config.write_attempts, |s| {
            if s.creator_id != me {
                return Err(SessionError::IllegalTransition(format!(
                    "only the creator {} can start the game",
                    s.creator_id
                ))
                .into());
            }
            Ok(Some(machine::start(s, game, &mut rand::rng(), now)?))
        })
        .await?;
        self.observe(&snapshot);
        Ok(snapshot)
    }

    // -----------------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------------

    /// Takes one step in `direction`.
    ///
    /// A blocked step, a move outside `Playing`, or a move by a found
    /// player changes nothing and writes nothing. A move made after the
    /// time limit finishes the session instead of moving. A step that
    /// leaves the session won is followed by a second write that
    /// finishes it.
    pub async fn move_in(&mut self, direction: Direction) -> Result<Snapshot, HideSeekError> {
        let base = self.latest().await?;
        self.observe(&base);
        let grace_elapsed = self.grace_elapsed();

        let (me, game, now) = (self.player_id, &self.config.game, self.clock.now());
        let moved = commit(&self.store, base, self.config.write_attempts, |s| {
            let next = reconcile::step_at(s, me, direction, grace_elapsed, now, game)?;
            Ok((next != *s).then_some(next))
        })
        .await?;
        self.settle(moved).await
    }

    /// Like [`move_in`](Self::move_in) for a browser key name. Keys other
    /// than the four arrows are ignored.
    pub async fn move_key(&mut self, key: &str) -> Result<Snapshot, HideSeekError> {
        match Direction::from_key(key) {
            Some(direction) => self.move_in(direction).await,
            None => self.latest().await,
        }
    }

    /// Like [`move_in`](Self::move_in) for a raw `(dx, dy)` delta. Only a
    /// single cardinal step of exactly the configured speed moves.
    pub async fn move_by(&mut self, dx: f64, dy: f64) -> Result<Snapshot, HideSeekError> {
        match Direction::from_delta(dx, dy, self.config.game.moves.speed) {
            Some(direction) => self.move_in(direction).await,
            None => self.latest().await,
        }
    }

    /// Re-reads the session and finishes it if a win condition holds.
    /// This is how a client notices the time limit while nobody moves.
    pub async fn refresh(&mut self) -> Result<Snapshot, HideSeekError> {
        let snapshot = self.latest().await?;
        self.settle(snapshot).await
    }

    /// Evaluates the win conditions on `snapshot` and, if the game is
    /// over, writes the finished snapshot.
    async fn settle(&mut self, snapshot: Snapshot) -> Result<Snapshot, HideSeekError> {
        self.observe(&snapshot);
        let now = self.clock.now();
        if machine::check_outcome(&snapshot, now).is_none() {
            return Ok(snapshot);
        }
        let finished = commit(&self.store, snapshot, self.config.write_attempts, |s| {
            Ok(machine::evaluate(s, now))
        })
        .await?;
        self.observe(&finished);
        Ok(finished)
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// The latest stored snapshot of this client's session.
    pub async fn latest(&self) -> Result<Snapshot, HideSeekError> {
        let code = self.require_code()?;
        Ok(self.store.read(&code).await?)
    }

    /// Watches this client's session. Pass each snapshot to
    /// [`observe`](Self::observe) to keep the grace period in step.
    pub async fn subscribe(&self) -> Result<Subscription, HideSeekError> {
        let code = self.require_code()?;
        Ok(self.store.subscribe(&code).await?)
    }

    /// Records that this client has seen `snapshot`.
    ///
    /// The first `Playing` snapshot of the current session starts the
    /// local grace countdown. Snapshots of other sessions are ignored.
    pub fn observe(&mut self, snapshot: &Snapshot) {
        if self.code.as_ref() != Some(&snapshot.code) {
            return;
        }
        if snapshot.state.phase == Phase::Playing && self.grace.is_none() {
            let now = self.clock.now();
            self.grace = Some(GracePeriod::begin(now, self.config.game.grace_period));
            tracing::debug!(
                code = %snapshot.code,
                player_id = %self.player_id,
                "grace period started"
            );
        }
    }

    /// Time left on this client's grace countdown. `None` before the game
    /// has been seen running.
    pub fn grace_remaining(&self) -> Option<Duration> {
        self.grace.map(|g| g.remaining(self.clock.now()))
    }

    fn grace_elapsed(&self) -> bool {
        self.grace.is_some_and(|g| g.has_elapsed(self.clock.now()))
    }

    /// Time left before the hiders win, or `None` outside `Playing`.
    pub fn time_left(&self, snapshot: &Snapshot) -> Option<Duration> {
        snapshot.state.time_left(self.clock.now())
    }

    fn enter(&mut self, code: GameCode) {
        self.code = Some(code);
        self.grace = None;
    }
}

/// Applies `change` to `base` and writes the result, re-reading and
/// re-applying on stale writes until `attempts` runs out.
///
/// `change` returns `Ok(None)` when there is nothing to write; the
/// snapshot it was given comes back as is.
async fn commit<S, F>(
    store: &S,
    mut base: Snapshot,
    attempts: u32,
    mut change: F,
) -> Result<Snapshot, HideSeekError>
where
    S: SessionStore,
    F: FnMut(&Snapshot) -> Result<Option<Snapshot>, HideSeekError>,
{
    let mut attempt = 1;
    loop {
        let Some(mut next) = change(&base)? else {
            return Ok(base);
        };
        match store.write(next.clone()).await {
            Ok(version) => {
                next.version = version;
                return Ok(next);
            }
            Err(StoreError::StaleWrite { .. }) if attempt < attempts => {
                attempt += 1;
                tracing::debug!(code = %base.code, attempt, "retrying stale write");
                base = store.read(&base.code).await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
