//! Proximity-based elimination.
//!
//! Only the finder's own moves can eliminate anybody. A hider walking up
//! to a standing finder is safe until the finder takes a step.

use std::collections::BTreeSet;

use hideseek_protocol::{Phase, Player, PlayerId, Position, SessionState};

/// Returns `true` if a move by `mover` may trigger an elimination check:
/// the session is playing, `mover` is the finder, and the observer's grace
/// period has run out.
pub fn is_eligible(state: &SessionState, mover: PlayerId, grace_elapsed: bool) -> bool {
    state.phase == Phase::Playing && state.is_finder(mover) && grace_elapsed
}

/// Finds every player in `others` within `capture_radius` of the finder.
///
/// The comparison is strict: a hider exactly `capture_radius` away is
/// safe. Players already in `already_found` are skipped, so the result
/// only ever holds *new* eliminations. `others` should not include the
/// finder; if it does, the finder is ignored.
pub fn evaluate<'a>(
    finder_id: PlayerId,
    finder_pos: Position,
    others: impl IntoIterator<Item = &'a Player>,
    already_found: &BTreeSet<PlayerId>,
    capture_radius: f64,
) -> BTreeSet<PlayerId> {
    others
        .into_iter()
        .filter(|p| p.id != finder_id && !already_found.contains(&p.id))
        .filter(|p| finder_pos.distance(p.position()) < capture_radius)
        .map(|p| p.id)
        .collect()
}
