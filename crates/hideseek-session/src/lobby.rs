//! Lobby operations: everything that happens while a session is `Waiting`.

use hideseek_protocol::{Color, GameCode, Phase, Player, PlayerId, Snapshot};

use crate::{GameConfig, SessionError};

/// A new session with `creator` as its only player, standing at the
/// origin without a color.
pub fn create(code: GameCode, creator: PlayerId, username: impl Into<String>) -> Snapshot {
    let snap = Snapshot::new(code, creator, username);
    tracing::info!(code = %snap.code, creator = %creator, "session created");
    snap
}

fn ensure_waiting(snapshot: &Snapshot, action: &str) -> Result<(), SessionError> {
    if snapshot.state.phase != Phase::Waiting {
        return Err(SessionError::IllegalTransition(format!(
            "cannot {action} in phase {}",
            snapshot.state.phase
        )));
    }
    Ok(())
}

/// Adds `player` to the end of the join order. Joining a lobby that
/// everyone has left makes `player` its creator.
///
/// # Errors
/// - [`SessionError::IllegalTransition`] once the game has started.
/// - [`SessionError::AlreadyJoined`] if `player` is already in.
/// - [`SessionError::SessionFull`] at `config.max_players`.
pub fn join(
    snapshot: &Snapshot,
    config: &GameConfig,
    player: PlayerId,
    username: impl Into<String>,
) -> Result<Snapshot, SessionError> {
    ensure_waiting(snapshot, "join")?;
    if snapshot.contains(player) {
        return Err(SessionError::AlreadyJoined(player));
    }
    if snapshot.players.len() >= config.max_players {
        return Err(SessionError::SessionFull(config.max_players));
    }

    let mut next = snapshot.clone();
    // A lobby everyone has left belongs to whoever joins it next.
    if next.players.is_empty() {
        next.creator_id = player;
    }
    next.players.push(Player::new(player, username));
    tracing::info!(
        code = %snapshot.code,
        %player,
        players = next.players.len(),
        "player joined"
    );
    Ok(next)
}

/// Locks in `color` for `player`. Each color belongs to at most one
/// player, and a player picks exactly once.
pub fn select_color(
    snapshot: &Snapshot,
    player: PlayerId,
    color: Color,
) -> Result<Snapshot, SessionError> {
    ensure_waiting(snapshot, "select a color")?;
    let current = snapshot
        .player(player)
        .ok_or(SessionError::UnknownPlayer(player))?;
    if current.color.is_some() {
        return Err(SessionError::ColorAlreadySelected(player));
    }
    if snapshot.players.iter().any(|p| p.color == Some(color)) {
        return Err(SessionError::ColorTaken(color));
    }

    let mut next = snapshot.clone();
    if let Some(p) = next.player_mut(player) {
        p.color = Some(color);
    }
    tracing::debug!(code = %snapshot.code, %player, %color, "color selected");
    Ok(next)
}

/// Colors nobody has picked yet, in palette order.
pub fn available_colors(snapshot: &Snapshot) -> Vec<Color> {
    Color::PALETTE
        .into_iter()
        .filter(|c| !snapshot.players.iter().any(|p| p.color == Some(*c)))
        .collect()
}

/// Removes `player` from a waiting session.
///
/// If the creator leaves, the next player in join order becomes the
/// creator. The returned snapshot may have no players at all; deleting
/// the session is then up to the caller.
pub fn leave(snapshot: &Snapshot, player: PlayerId) -> Result<Snapshot, SessionError> {
    ensure_waiting(snapshot, "leave")?;
    if !snapshot.contains(player) {
        return Err(SessionError::UnknownPlayer(player));
    }

    let mut next = snapshot.clone();
    next.players.retain(|p| p.id != player);
    if next.creator_id == player {
        if let Some(heir) = next.players.first() {
            next.creator_id = heir.id;
            tracing::info!(code = %snapshot.code, creator = %heir.id, "creator handed over");
        }
    }
    tracing::info!(
        code = %snapshot.code,
        %player,
        players = next.players.len(),
        "player left"
    );
    Ok(next)
}
