//! World coordinates.

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// East/west coordinate
    pub x: f64,
    /// Height
    pub y: f64,
    /// North/south coordinate
    pub z: f64,
}

impl Position {
    /// Create a position from its three coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Offset along the horizontal plane by `distance` at `angle_degrees`,
    /// keeping the height.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley_core::Position;
    ///
    /// let p = Position::new(10.0, 64.0, -3.0).offset_horizontal(90.0, 2.0);
    /// assert!((p.x - 10.0).abs() < 1e-9);
    /// assert!((p.z - -1.0).abs() < 1e-9);
    /// assert_eq!(p.y, 64.0);
    /// ```
    pub fn offset_horizontal(&self, angle_degrees: f64, distance: f64) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            x: self.x + distance * radians.cos(),
            y: self.y,
            z: self.z + distance * radians.sin(),
        }
    }

    /// Horizontal distance to another position.
    pub fn horizontal_distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}
