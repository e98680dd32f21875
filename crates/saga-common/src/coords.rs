//! Position and area types in world space.

use serde::{Deserialize, Serialize};

/// A position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in world space
    pub x: f32,
    /// Y coordinate in world space
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in world space.
///
/// `(x, y)` is the top-left corner. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaBounds {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (non-negative)
    pub width: f32,
    /// Height (non-negative)
    pub height: f32,
}

impl AreaBounds {
    /// Creates a new area.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Checks whether a position lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edges_are_inclusive() {
        let area = AreaBounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(area.contains(Position::new(0.0, 0.0)));
        assert!(area.contains(Position::new(10.0, 10.0)));
        assert!(!area.contains(Position::new(10.1, 5.0)));
        assert!(!area.contains(Position::new(5.0, -0.1)));
    }

    #[test]
    fn test_center() {
        let area = AreaBounds::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(area.center(), Position::new(12.0, 23.0));
    }

    proptest! {
        #[test]
        fn center_is_always_inside(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 0.0f32..500.0,
            h in 0.0f32..500.0,
        ) {
            let area = AreaBounds::new(x, y, w, h);
            prop_assert!(area.contains(area.center()));
        }
    }
}
