//! The session state machine.
//!
//! ```text
//!            start()                 check_outcome() / evaluate()
//! Waiting ───────────→ Playing ────────────────────────────→ Finished
//!  (lobby)        finder chosen,       all hiders found → Finder
//!                 clock started        time limit hit   → Hiders
//! ```
//!
//! Win conditions are checked in a fixed order: elimination first, then
//! time. When both hold on the same observation the finder wins, so a
//! session can't be won by stalling out the last few milliseconds.

use std::collections::{BTreeSet, HashSet};

use hideseek_protocol::{Phase, Player, PlayerId, Snapshot, Timestamp, Winner};
use rand::Rng;

use crate::{GameConfig, SessionError};

/// Picks the finder uniformly at random among `players`.
///
/// The random source is a parameter so tests can pass a seeded RNG.
/// Returns `None` for an empty slice.
pub fn choose_finder<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Option<PlayerId> {
    if players.is_empty() {
        return None;
    }
    Some(players[rng.random_range(0..players.len())].id)
}

/// `Waiting → Playing`.
///
/// Preconditions: the session is waiting, has at least
/// `config.min_players` players, and every player has picked a distinct
/// color. On success the finder is drawn from `rng`, the found set is
/// cleared, and the clock starts at `now`.
///
/// # Errors
/// [`SessionError::IllegalTransition`] if any precondition fails; the
/// input snapshot is never modified.
pub fn start<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    config: &GameConfig,
    rng: &mut R,
    now: Timestamp,
) -> Result<Snapshot, SessionError> {
    let state = &snapshot.state;
    if !state.phase.can_transition_to(Phase::Playing) {
        return Err(SessionError::IllegalTransition(format!(
            "cannot start a session in phase {}",
            state.phase
        )));
    }
    if snapshot.players.len() < config.min_players {
        return Err(SessionError::IllegalTransition(format!(
            "need at least {} players to start, have {}",
            config.min_players,
            snapshot.players.len()
        )));
    }
    if let Some(p) = snapshot.players.iter().find(|p| p.color.is_none()) {
        return Err(SessionError::IllegalTransition(format!(
            "player {} has not selected a color",
            p.id
        )));
    }
    let mut colors = HashSet::new();
    if !snapshot.players.iter().all(|p| colors.insert(p.color)) {
        return Err(SessionError::IllegalTransition(
            "two players share a color".into(),
        ));
    }

    let finder = choose_finder(&snapshot.players, rng).ok_or_else(|| {
        SessionError::IllegalTransition("no players to choose a finder from".into())
    })?;

    let mut next = snapshot.clone();
    next.state.phase = Phase::Playing;
    next.state.finder_id = Some(finder);
    next.state.found_ids = BTreeSet::new();
    next.state.started_at = Some(now);
    next.state.time_limit_secs = config.time_limit_secs;
    next.state.winner = None;

    tracing::info!(
        code = %snapshot.code,
        finder = %finder,
        players = snapshot.players.len(),
        "game started"
    );
    Ok(next)
}

/// Decides whether a playing session is over, without changing it.
///
/// Elimination is checked before time. Returns `None` for sessions that
/// are not `Playing`, including already finished ones.
pub fn check_outcome(snapshot: &Snapshot, now: Timestamp) -> Option<Winner> {
    let state = &snapshot.state;
    if state.phase != Phase::Playing {
        return None;
    }

    let hiders = snapshot.players.len().saturating_sub(1);
    if state.found_ids.len() == hiders {
        return Some(Winner::Finder);
    }

    let started = state.started_at?;
    if now.saturating_since(started) >= state.time_limit() {
        return Some(Winner::Hiders);
    }
    None
}

/// `Playing → Finished`, if a win condition holds at `now`.
///
/// Returns the finished snapshot, or `None` when nothing changes. This is
/// the follow-up write that chains onto a move, and what a periodic
/// referee runs to catch the time limit when nobody is moving.
pub fn evaluate(snapshot: &Snapshot, now: Timestamp) -> Option<Snapshot> {
    let winner = check_outcome(snapshot, now)?;
    Some(finish(snapshot, winner))
}

fn finish(snapshot: &Snapshot, winner: Winner) -> Snapshot {
    let mut next = snapshot.clone();
    next.state.phase = Phase::Finished;
    next.state.winner = Some(winner);

    tracing::info!(
        code = %snapshot.code,
        %winner,
        found = next.state.found_ids.len(),
        "game finished"
    );
    next
}
