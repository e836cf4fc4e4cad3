//! Map geometry and movement validation for Hide & Seek.
//!
//! Two pure building blocks, both free of any notion of players or game
//! phase:
//!
//! - [`Map`] - the static obstacle layout and its collision query.
//! - [`MoveRules`] - turns a movement intent into the legal resulting
//!   position (clamped to the world edges, rejected on collision).

mod geometry;
mod movement;

pub use geometry::{Map, Rect};
pub use movement::{Direction, MoveRules};
