//! Static map layout and collision queries.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Open-interval intersection test. Rectangles that only share an
    /// edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// The factory floor every session plays on: 800×600 with fifteen
/// obstacles (doors, crates, machinery, pipes, belts, walls).
const WAREHOUSE_OBSTACLES: [Rect; 15] = [
    // doors
    Rect::new(20.0, 20.0, 60.0, 40.0),
    Rect::new(720.0, 540.0, 60.0, 40.0),
    // crates
    Rect::new(100.0, 50.0, 80.0, 80.0),
    Rect::new(150.0, 250.0, 100.0, 60.0),
    Rect::new(650.0, 150.0, 60.0, 80.0),
    Rect::new(50.0, 450.0, 80.0, 100.0),
    // machinery
    Rect::new(600.0, 20.0, 100.0, 120.0),
    Rect::new(200.0, 350.0, 120.0, 80.0),
    // pipes
    Rect::new(300.0, 100.0, 200.0, 20.0),
    Rect::new(50.0, 200.0, 20.0, 150.0),
    Rect::new(500.0, 400.0, 150.0, 20.0),
    // belts
    Rect::new(350.0, 250.0, 150.0, 40.0),
    Rect::new(200.0, 500.0, 200.0, 40.0),
    // walls
    Rect::new(50.0, 350.0, 100.0, 20.0),
    Rect::new(600.0, 450.0, 20.0, 100.0),
];

/// World bounds plus the obstacles inside them. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub width: f64,
    pub height: f64,
    pub obstacles: Vec<Rect>,
}

impl Map {
    /// The standard warehouse layout.
    pub fn warehouse() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            obstacles: WAREHOUSE_OBSTACLES.to_vec(),
        }
    }

    /// Returns `true` if `rect` overlaps any obstacle.
    pub fn collides(&self, rect: &Rect) -> bool {
        self.obstacles.iter().any(|o| rect.overlaps(o))
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::warehouse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar(x: f64, y: f64) -> Rect {
        Rect::new(x, y, 20.0, 20.0)
    }

    #[test]
    fn test_overlaps_intersecting_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_overlaps_touching_edges_do_not_count() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_overlaps_containment() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_warehouse_has_fixed_layout() {
        let map = Map::warehouse();
        assert_eq!(map.width, 800.0);
        assert_eq!(map.height, 600.0);
        assert_eq!(map.obstacles.len(), 15);
        assert_eq!(Map::default(), map);
    }

    #[test]
    fn test_collides_spawn_point_is_free() {
        // The door at (20, 20) starts exactly where a spawned avatar ends.
        assert!(!Map::warehouse().collides(&avatar(0.0, 0.0)));
    }

    #[test]
    fn test_collides_inside_crate() {
        assert!(Map::warehouse().collides(&avatar(120.0, 70.0)));
    }

    #[test]
    fn test_collides_partial_overlap_with_pipe() {
        // Pipe spans y 100..120; an avatar at y=85 reaches y=105.
        assert!(Map::warehouse().collides(&avatar(350.0, 85.0)));
    }

    #[test]
    fn test_collides_open_floor() {
        assert!(!Map::warehouse().collides(&avatar(400.0, 180.0)));
    }

    #[test]
    fn test_collides_empty_map_never() {
        let map = Map {
            width: 100.0,
            height: 100.0,
            obstacles: vec![],
        };
        assert!(!map.collides(&avatar(50.0, 50.0)));
    }
}
