//! Movement validation: from an intent to a legal position.

use hideseek_protocol::Position;
use serde::{Deserialize, Serialize};

use crate::{Map, Rect};

/// The four movement intents a player can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Maps a browser key name (`"ArrowUp"`, ...) to a direction.
    /// Any other key is not a movement intent.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }

    /// Recognizes a raw delta as one cardinal step of length `speed`.
    ///
    /// Diagonals, partial steps and oversized jumps all return `None`.
    pub fn from_delta(dx: f64, dy: f64, speed: f64) -> Option<Self> {
        if speed <= 0.0 {
            return None;
        }
        let step = (dx / speed, dy / speed);
        Self::ALL.into_iter().find(|d| d.unit() == step)
    }

    /// Unit vector in screen coordinates (y grows downwards).
    pub fn unit(self) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// Step size and avatar footprint used to validate every move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveRules {
    /// Distance covered by one move, in map units.
    pub speed: f64,
    /// Side length of the square avatar hitbox.
    pub avatar_size: f64,
}

impl Default for MoveRules {
    fn default() -> Self {
        Self {
            speed: 15.0,
            avatar_size: 20.0,
        }
    }
}

impl MoveRules {
    /// The hitbox of an avatar standing at `pos`.
    pub fn avatar_rect(&self, pos: Position) -> Rect {
        Rect::new(pos.x, pos.y, self.avatar_size, self.avatar_size)
    }

    /// Applies one step in `direction` and returns the legal result.
    ///
    /// The candidate is clamped into the world (an avatar never leaves the
    /// map), then rejected outright if it overlaps an obstacle, in which
    /// case `current` comes back unchanged. Never fails: an illegal move
    /// is simply a no-op.
    pub fn validate_move(&self, map: &Map, current: Position, direction: Direction) -> Position {
        let (ux, uy) = direction.unit();
        let max_x = (map.width - self.avatar_size).max(0.0);
        let max_y = (map.height - self.avatar_size).max(0.0);

        let candidate = Position::new(
            (current.x + ux * self.speed).clamp(0.0, max_x),
            (current.y + uy * self.speed).clamp(0.0, max_y),
        );

        if map.collides(&self.avatar_rect(candidate)) {
            return current;
        }
        candidate
    }

    /// Like [`validate_move`](Self::validate_move), but for a raw delta.
    /// Anything other than a single cardinal step is a no-op.
    pub fn validate_delta(&self, map: &Map, current: Position, dx: f64, dy: f64) -> Position {
        match Direction::from_delta(dx, dy, self.speed) {
            Some(direction) => self.validate_move(map, current, direction),
            None => current,
        }
    }

    /// Returns `true` if an avatar may stand at `pos`.
    pub fn is_legal(&self, map: &Map, pos: Position) -> bool {
        let in_bounds = pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x + self.avatar_size <= map.width
            && pos.y + self.avatar_size <= map.height;
        in_bounds && !map.collides(&self.avatar_rect(pos))
    }
}
