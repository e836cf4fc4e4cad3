//! Game code generation.

use hideseek_protocol::GameCode;
use rand::Rng;

/// Draws a random six-character code from `A-Z0-9`.
///
/// Collisions are possible; the store checks and redraws.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> GameCode {
    GameCode::from_fn(|| rng.random_range(0..GameCode::ALPHABET.len()))
}
