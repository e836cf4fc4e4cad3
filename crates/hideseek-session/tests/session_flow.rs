//! End-to-end session flows through the pure rules: lobby, start, moves,
//! eliminations and the win conditions.

use std::time::Duration;

use hideseek_map::Direction;
use hideseek_protocol::{
    Color, GameCode, Phase, PlayerId, Position, SessionState, Snapshot, Timestamp, Winner,
};
use hideseek_session::{GameConfig, GracePeriod, SessionError, lobby, machine, reconcile};
use rand::SeedableRng;
use rand::rngs::StdRng;

const T0: Timestamp = Timestamp(5_000_000);

/// Creates a lobby of `n` players with distinct colors and starts it.
fn start_game(n: u64, seed: u64) -> Snapshot {
    let config = GameConfig::default();
    let code = GameCode::parse("FL0W01").unwrap();
    let mut snap = lobby::create(code, PlayerId(1), "p1");
    for id in 2..=n {
        snap = lobby::join(&snap, &config, PlayerId(id), format!("p{id}")).unwrap();
    }
    for (id, color) in (1..=n).zip(Color::PALETTE) {
        snap = lobby::select_color(&snap, PlayerId(id), color).unwrap();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    machine::start(&snap, &config, &mut rng, T0).unwrap()
}

fn finder(snap: &Snapshot) -> PlayerId {
    snap.state.finder_id.unwrap()
}

fn hiders(snap: &Snapshot) -> Vec<PlayerId> {
    snap.hiders_remaining().map(|p| p.id).collect()
}

fn place(snap: &mut Snapshot, id: PlayerId, x: f64, y: f64) {
    snap.player_mut(id).unwrap().set_position(Position::new(x, y));
}

// =========================================================================
// Lobby → Playing
// =========================================================================

#[test]
fn test_lobby_to_playing_produces_valid_snapshot() {
    let snap = start_game(4, 3);
    assert_eq!(snap.state.phase, Phase::Playing);
    assert_eq!(hiders(&snap).len(), 3);
    assert!(snap.validate().is_ok());
}

#[test]
fn test_start_with_one_player_stays_waiting() {
    let config = GameConfig::default();
    let snap = lobby::create(GameCode::parse("SOLO01").unwrap(), PlayerId(1), "alone");
    let snap = lobby::select_color(&snap, PlayerId(1), Color::Rose).unwrap();

    let result = machine::start(&snap, &config, &mut StdRng::seed_from_u64(0), T0);

    assert!(matches!(result, Err(SessionError::IllegalTransition(_))));
    assert_eq!(snap.state.phase, Phase::Waiting);
}

// =========================================================================
// Moves and eliminations
// =========================================================================

#[test]
fn test_grace_period_protects_hiders_then_expires() {
    let config = GameConfig::default();
    let mut snap = start_game(2, 11);
    let f = finder(&snap);
    let h = hiders(&snap)[0];
    place(&mut snap, f, 400.0, 180.0);
    place(&mut snap, h, 430.0, 180.0);

    let grace = GracePeriod::begin(T0, config.grace_period);

    // One second in: the finder walks right up to the hider, nothing happens.
    let now = T0.after(Duration::from_secs(1));
    let snap = reconcile::step(&snap, f, Direction::Right, grace.has_elapsed(now), &config)
        .unwrap();
    assert!(snap.state.found_ids.is_empty());
    assert_eq!(machine::evaluate(&snap, now), None);

    // Past the grace period: the next finder step catches the hider.
    let now = T0.after(Duration::from_secs(11));
    let snap = reconcile::step(&snap, f, Direction::Left, grace.has_elapsed(now), &config)
        .unwrap();
    assert!(snap.state.is_found(h));

    let finished = machine::evaluate(&snap, now).expect("last hider found");
    assert_eq!(finished.state.phase, Phase::Finished);
    assert_eq!(finished.state.winner, Some(Winner::Finder));
    assert!(finished.validate().is_ok());
}

#[test]
fn test_three_players_one_found_game_continues() {
    let config = GameConfig::default();
    let mut snap = start_game(3, 5);
    let f = finder(&snap);
    let hs = hiders(&snap);
    place(&mut snap, f, 100.0, 160.0);
    place(&mut snap, hs[0], 120.0, 160.0);
    place(&mut snap, hs[1], 700.0, 300.0);

    let snap = reconcile::apply_move(&snap, f, Position::new(110.0, 160.0), true, &config)
        .unwrap();

    assert!(snap.state.is_found(hs[0]));
    assert!(!snap.state.is_found(hs[1]));
    assert_eq!(machine::evaluate(&snap, T0), None);
}

#[test]
fn test_time_limit_hiders_win_and_state_freezes() {
    let config = GameConfig::default();
    let snap = start_game(3, 8);
    let f = finder(&snap);

    let late = T0.after(Duration::from_secs(301));
    let finished = machine::evaluate(&snap, late).expect("time is up");
    assert_eq!(finished.state.winner, Some(Winner::Hiders));

    for d in Direction::ALL {
        let after = reconcile::step(&finished, f, d, true, &config).unwrap();
        assert_eq!(after.state, finished.state);
    }
}

#[test]
fn test_capture_after_time_limit_does_not_beat_hiders() {
    let config = GameConfig::default();
    let mut snap = start_game(2, 13);
    let f = finder(&snap);
    let h = hiders(&snap)[0];
    place(&mut snap, f, 400.0, 180.0);
    place(&mut snap, h, 430.0, 180.0);

    let late = T0.after(Duration::from_secs(301));
    let next = reconcile::step_at(&snap, f, Direction::Right, true, late, &config).unwrap();

    assert_eq!(next.state.phase, Phase::Finished);
    assert_eq!(next.state.winner, Some(Winner::Hiders));
    assert!(!next.state.is_found(h));
    assert_eq!(machine::evaluate(&next, late), None);
}

#[test]
fn test_found_ids_monotonic_over_random_walk() {
    use rand::Rng;

    let config = GameConfig::default();
    let mut snap = start_game(5, 21);
    let mut rng = StdRng::seed_from_u64(99);
    let ids: Vec<PlayerId> = snap.players.iter().map(|p| p.id).collect();

    for _ in 0..2_000 {
        let mover = ids[rng.random_range(0..ids.len())];
        let d = Direction::ALL[rng.random_range(0..4)];
        let next = reconcile::step(&snap, mover, d, true, &config).unwrap();

        assert!(next.state.found_ids.is_superset(&snap.state.found_ids));
        if !snap.state.is_finder(mover) {
            assert_eq!(next.state.found_ids, snap.state.found_ids);
        }
        snap = next;
        if let Some(finished) = machine::evaluate(&snap, T0) {
            snap = finished;
        }
    }
    assert!(snap.validate().is_ok());
}

// =========================================================================
// Serialization
// =========================================================================

#[test]
fn test_session_state_json_round_trip() {
    let mut snap = start_game(3, 2);
    let h = hiders(&snap)[0];
    snap.state.found_ids.insert(h);

    let json = serde_json::to_string(&snap.state).unwrap();
    let back: SessionState = serde_json::from_str(&json).unwrap();

    assert_eq!(back, snap.state);
}
