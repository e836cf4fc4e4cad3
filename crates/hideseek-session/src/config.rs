//! Session rules configuration.

use std::time::Duration;

use hideseek_map::{Map, MoveRules};
use serde::{Deserialize, Serialize};

/// Tunables for one session. `Default` is the standard game: 2–10
/// players, five minutes, ten-second grace period, 40-unit capture radius
/// on the warehouse map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minimum players required to start.
    pub min_players: usize,

    /// Maximum players a lobby accepts.
    pub max_players: usize,

    /// Seconds until the hiders win, written into the state at start.
    pub time_limit_secs: u64,

    /// How long after the game starts the finder is harmless.
    pub grace_period: Duration,

    /// A hider strictly closer than this to the finder is found.
    pub capture_radius: f64,

    pub map: Map,

    pub moves: MoveRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 10,
            time_limit_secs: 300,
            grace_period: Duration::from_secs(10),
            capture_radius: 40.0,
            map: Map::warehouse(),
            moves: MoveRules::default(),
        }
    }
}
