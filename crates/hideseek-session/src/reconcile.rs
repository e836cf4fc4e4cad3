//! Folding a player's move into the shared snapshot.
//!
//! The reconciler always runs against the *latest* snapshot read from the
//! store, never against whatever the client last rendered. A move and the
//! eliminations it causes are one atomic update: no observer ever sees the
//! finder's new position without the captures that came with it.

use hideseek_map::Direction;
use hideseek_protocol::{Phase, PlayerId, Position, Snapshot, Timestamp};

use crate::{GameConfig, SessionError, elimination, machine};

/// Moves `player_id` to `new_pos` (already validated) and applies any
/// eliminations that move causes.
///
/// - Outside `Playing`, and for players that have been found, the
///   snapshot comes back unchanged. This is what makes `Finished` final.
/// - If the mover is the finder and `grace_elapsed`, every hider inside
///   the capture radius joins `found_ids` in the same snapshot.
///
/// Win conditions are *not* evaluated here; run
/// [`machine::evaluate`](crate::machine::evaluate) on the result.
///
/// # Errors
/// [`SessionError::UnknownPlayer`] if `player_id` isn't in the session.
pub fn apply_move(
    snapshot: &Snapshot,
    player_id: PlayerId,
    new_pos: Position,
    grace_elapsed: bool,
    config: &GameConfig,
) -> Result<Snapshot, SessionError> {
    if !snapshot.contains(player_id) {
        return Err(SessionError::UnknownPlayer(player_id));
    }
    let state = &snapshot.state;
    if state.phase != Phase::Playing || state.is_found(player_id) {
        tracing::debug!(
            code = %snapshot.code,
            %player_id,
            phase = %state.phase,
            "move ignored"
        );
        return Ok(snapshot.clone());
    }

    let mut next = snapshot.clone();
    if let Some(p) = next.player_mut(player_id) {
        p.set_position(new_pos);
    }

    if elimination::is_eligible(state, player_id, grace_elapsed) {
        let newly_found = elimination::evaluate(
            player_id,
            new_pos,
            &snapshot.players,
            &state.found_ids,
            config.capture_radius,
        );
        for id in &newly_found {
            tracing::info!(code = %snapshot.code, player_id = %id, "player found");
        }
        next.state.found_ids.extend(newly_found);
    }

    Ok(next)
}

/// Validates one step in `direction` against the map, then applies it.
///
/// An illegal step (wall, obstacle, world edge) is a silent no-op: the
/// snapshot comes back unchanged and no elimination is evaluated.
///
/// # Errors
/// [`SessionError::UnknownPlayer`] if `player_id` isn't in the session.
pub fn step(
    snapshot: &Snapshot,
    player_id: PlayerId,
    direction: Direction,
    grace_elapsed: bool,
    config: &GameConfig,
) -> Result<Snapshot, SessionError> {
    let current = snapshot
        .player(player_id)
        .ok_or(SessionError::UnknownPlayer(player_id))?
        .position();

    let new_pos = config.moves.validate_move(&config.map, current, direction);
    if new_pos == current {
        return Ok(snapshot.clone());
    }
    apply_move(snapshot, player_id, new_pos, grace_elapsed, config)
}

/// [`step`] as observed at `now`.
///
/// The win conditions are checked on `snapshot` before the step is taken.
/// A session whose time ran out before this move arrived finishes as it
/// stands, and the move is dropped, so a capture made after the deadline
/// cannot turn a hiders' win into a finder's win.
///
/// # Errors
/// [`SessionError::UnknownPlayer`] if `player_id` isn't in the session.
pub fn step_at(
    snapshot: &Snapshot,
    player_id: PlayerId,
    direction: Direction,
    grace_elapsed: bool,
    now: Timestamp,
    config: &GameConfig,
) -> Result<Snapshot, SessionError> {
    if !snapshot.contains(player_id) {
        return Err(SessionError::UnknownPlayer(player_id));
    }
    if let Some(finished) = machine::evaluate(snapshot, now) {
        tracing::debug!(code = %snapshot.code, %player_id, "move arrived after the game ended");
        return Ok(finished);
    }
    step(snapshot, player_id, direction, grace_elapsed, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hideseek_protocol::{GameCode, Player, Timestamp, Winner};

    use crate::machine;

    /// Three players, P-1 is the finder. Positions are set per test.
    fn playing() -> Snapshot {
        let code = GameCode::parse("REC0N1").unwrap();
        let mut snap = Snapshot::new(code, PlayerId(1), "finder");
        snap.players.push(Player::new(PlayerId(2), "hider-a"));
        snap.players.push(Player::new(PlayerId(3), "hider-b"));
        snap.state.phase = Phase::Playing;
        snap.state.finder_id = Some(PlayerId(1));
        snap.state.started_at = Some(Timestamp(0));
        snap.state.time_limit_secs = 300;
        snap
    }

    fn place(snap: &mut Snapshot, id: u64, x: f64, y: f64) {
        snap.player_mut(PlayerId(id))
            .unwrap()
            .set_position(Position::new(x, y));
    }

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn test_apply_move_updates_position_only() {
        let mut snap = playing();
        place(&mut snap, 2, 400.0, 400.0);

        let next = apply_move(&snap, PlayerId(2), Position::new(415.0, 400.0), true, &config())
            .unwrap();

        assert_eq!(next.player(PlayerId(2)).unwrap().position(), Position::new(415.0, 400.0));
        assert_eq!(next.state, snap.state);
    }

    #[test]
    fn test_apply_move_finder_catches_nearby_hider_in_same_update() {
        let mut snap = playing();
        place(&mut snap, 1, 100.0, 100.0);
        place(&mut snap, 2, 120.0, 100.0);
        place(&mut snap, 3, 700.0, 500.0);

        let next = apply_move(&snap, PlayerId(1), Position::new(110.0, 100.0), true, &config())
            .unwrap();

        assert_eq!(next.player(PlayerId(1)).unwrap().position(), Position::new(110.0, 100.0));
        assert!(next.state.is_found(PlayerId(2)));
        assert!(!next.state.is_found(PlayerId(3)));
    }

    #[test]
    fn test_apply_move_during_grace_catches_nobody() {
        let mut snap = playing();
        place(&mut snap, 1, 100.0, 100.0);
        place(&mut snap, 2, 110.0, 100.0);

        let next = apply_move(&snap, PlayerId(1), Position::new(105.0, 100.0), false, &config())
            .unwrap();

        assert!(next.state.found_ids.is_empty());
    }

    #[test]
    fn test_apply_move_hider_approaching_finder_catches_nobody() {
        let mut snap = playing();
        place(&mut snap, 1, 100.0, 100.0);
        place(&mut snap, 2, 200.0, 100.0);

        let next = apply_move(&snap, PlayerId(2), Position::new(101.0, 100.0), true, &config())
            .unwrap();

        assert!(next.state.found_ids.is_empty());
    }

    #[test]
    fn test_apply_move_unknown_player_returns_error() {
        let snap = playing();
        let result = apply_move(&snap, PlayerId(99), Position::ORIGIN, true, &config());
        assert_eq!(result, Err(SessionError::UnknownPlayer(PlayerId(99))));
    }

    #[test]
    fn test_apply_move_found_player_cannot_move() {
        let mut snap = playing();
        snap.state.found_ids.insert(PlayerId(2));

        let next = apply_move(&snap, PlayerId(2), Position::new(300.0, 300.0), true, &config())
            .unwrap();
        assert_eq!(next, snap);
    }

    #[test]
    fn test_apply_move_after_finish_changes_nothing() {
        let mut snap = playing();
        place(&mut snap, 2, 105.0, 100.0);
        let finished = machine::evaluate(&snap, Timestamp(1_000_000)).unwrap();
        assert_eq!(finished.state.winner, Some(Winner::Hiders));

        let next = apply_move(&finished, PlayerId(1), Position::new(100.0, 100.0), true, &config())
            .unwrap();

        assert_eq!(next, finished);
    }

    #[test]
    fn test_apply_move_found_set_never_shrinks() {
        let mut snap = playing();
        snap.state.found_ids.insert(PlayerId(3));
        place(&mut snap, 1, 100.0, 100.0);
        place(&mut snap, 2, 130.0, 100.0);

        let next = apply_move(&snap, PlayerId(1), Position::new(115.0, 100.0), true, &config())
            .unwrap();
        assert!(next.state.found_ids.is_superset(&snap.state.found_ids));
        assert_eq!(next.state.found_ids.len(), 2);
    }

    #[test]
    fn test_step_into_wall_is_no_op() {
        let mut snap = playing();
        place(&mut snap, 1, 80.0, 80.0);
        place(&mut snap, 2, 90.0, 110.0);

        // Blocked by the crate at x=100: no move, so no elimination either.
        let next = step(&snap, PlayerId(1), Direction::Right, true, &config()).unwrap();
        assert_eq!(next, snap);
    }

    #[test]
    fn test_step_moves_and_eliminates() {
        let mut snap = playing();
        place(&mut snap, 1, 400.0, 180.0);
        place(&mut snap, 2, 430.0, 180.0);

        let next = step(&snap, PlayerId(1), Direction::Right, true, &config()).unwrap();

        assert_eq!(next.player(PlayerId(1)).unwrap().position(), Position::new(415.0, 180.0));
        assert!(next.state.is_found(PlayerId(2)));
    }

    #[test]
    fn test_step_at_after_time_limit_finishes_without_capture() {
        let mut snap = playing();
        snap.state.found_ids.insert(PlayerId(3));
        place(&mut snap, 1, 400.0, 180.0);
        place(&mut snap, 2, 430.0, 180.0);

        let late = Timestamp(301_000);
        let next = step_at(&snap, PlayerId(1), Direction::Right, true, late, &config()).unwrap();

        assert_eq!(next.state.phase, Phase::Finished);
        assert_eq!(next.state.winner, Some(Winner::Hiders));
        assert!(!next.state.is_found(PlayerId(2)));
        assert_eq!(next.player(PlayerId(1)).unwrap().position(), Position::new(400.0, 180.0));
    }

    #[test]
    fn test_step_at_before_time_limit_moves_and_eliminates() {
        let mut snap = playing();
        place(&mut snap, 1, 400.0, 180.0);
        place(&mut snap, 2, 430.0, 180.0);

        let next =
            step_at(&snap, PlayerId(1), Direction::Right, true, Timestamp(299_000), &config())
                .unwrap();

        assert_eq!(next.state.phase, Phase::Playing);
        assert!(next.state.is_found(PlayerId(2)));
    }

    #[test]
    fn test_step_at_unknown_player_returns_error() {
        let snap = playing();
        let result = step_at(&snap, PlayerId(42), Direction::Up, true, Timestamp(999_000), &config());
        assert_eq!(result, Err(SessionError::UnknownPlayer(PlayerId(42))));
    }

    #[test]
    fn test_step_unknown_player_returns_error() {
        let snap = playing();
        let result = step(&snap, PlayerId(42), Direction::Up, true, &config());
        assert!(matches!(result, Err(SessionError::UnknownPlayer(_))));
    }
}
