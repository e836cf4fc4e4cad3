//! Headless bots playing one session on the in-memory store.
//!
//! ```text
//! RUST_LOG=info cargo run -p simulation -- 5
//! ```
//!
//! The argument is the number of bots (2–10, default 4). The finder
//! chases the nearest hider; hiders wander.

use std::time::Duration;

use hideseek::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

type Bot = GameClient<MemoryStore, SystemClock>;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.game.time_limit_secs = 30;
    config.game.grace_period = Duration::from_secs(3);
    config
}

async fn bot(store: &MemoryStore, id: u64) -> Result<Bot, HideSeekError> {
    GameClient::connect(store.clone(), &FixedIdentity(PlayerId(id)), SystemClock, config()).await
}

/// Picks a step for `me`: toward the nearest hider for the finder, at
/// random for everyone else.
fn choose(snapshot: &Snapshot, me: PlayerId, rng: &mut StdRng) -> Direction {
    let random = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
    if !snapshot.state.is_finder(me) || rng.random_bool(0.2) {
        return random;
    }
    let Some(pos) = snapshot.player(me).map(Player::position) else {
        return random;
    };
    let target = snapshot
        .hiders_remaining()
        .map(Player::position)
        .min_by(|a, b| pos.distance(*a).total_cmp(&pos.distance(*b)));
    let Some(target) = target else {
        return random;
    };

    let (dx, dy) = (target.x - pos.x, target.y - pos.y);
    match (dx.abs() >= dy.abs(), dx >= 0.0, dy >= 0.0) {
        (true, true, _) => Direction::Right,
        (true, false, _) => Direction::Left,
        (false, _, true) => Direction::Down,
        (false, _, false) => Direction::Up,
    }
}

// ---------------------------------------------------------------------------
// Bot loop
// ---------------------------------------------------------------------------

async fn play(mut bot: Bot, seed: u64) -> Result<Snapshot, HideSeekError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let me = bot.player_id();
    let mut snapshot = bot.refresh().await?;

    while snapshot.state.phase != Phase::Finished {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let direction = choose(&snapshot, me, &mut rng);
        snapshot = match bot.move_in(direction).await {
            Ok(snapshot) => snapshot,
            Err(HideSeekError::Store(e)) => {
                tracing::debug!(player_id = %me, error = %e, "move lost, re-reading");
                bot.refresh().await?
            }
            Err(e) => return Err(e),
        };
    }
    Ok(snapshot)
}

#[tokio::main]
async fn main() -> Result<(), HideSeekError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().compact().with_target(false))
        .init();

    let bots: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(4)
        .clamp(2, 10);

    let store = MemoryStore::default();
    let referee = Referee::spawn(store.clone(), SystemClock, RefereeConfig::default());

    let mut host = bot(&store, 1).await?;
    let code = host.create("bot-1").await?;
    referee.watch(code.clone()).await?;
    tracing::info!(%code, bots, "lobby open");

    let mut players = vec![];
    for id in 2..=bots {
        let mut guest = bot(&store, id).await?;
        guest.join(code.as_str(), &format!("bot-{id}")).await?;
        players.push(guest);
    }
    players.insert(0, host);

    for (player, color) in players.iter_mut().zip(Color::PALETTE) {
        player.select_color(color).await?;
    }
    let started = players[0].start().await?;
    tracing::info!(
        finder = ?started.state.finder_id,
        "game on, hiders run!"
    );

    let tasks: Vec<_> = players
        .into_iter()
        .enumerate()
        .map(|(i, p)| tokio::spawn(play(p, i as u64)))
        .collect();

    let mut outcome = None;
    for task in tasks {
        match task.await {
            Ok(Ok(snapshot)) => outcome = Some(snapshot),
            Ok(Err(e)) => tracing::warn!(error = %e, "bot stopped"),
            Err(e) => tracing::warn!(error = %e, "bot task panicked"),
        }
    }

    if let Some(snapshot) = outcome {
        tracing::info!(
            winner = ?snapshot.state.winner,
            found = snapshot.state.found_ids.len(),
            hiders = snapshot.players.len() - 1,
            "game over"
        );
    }
    referee.shutdown().await;
    Ok(())
}
