//! Spawn placement around a player.

use parley_core::Position;
use rand::Rng;

/// A point within `radius` of `origin` on the horizontal plane.
///
/// The angle is uniform in `[0, 360)` degrees and the distance uniform in
/// `[0, radius]`. Non-positive radii place the NPC on the origin.
///
/// # Examples
///
/// ```
/// use parley_core::Position;
/// use parley_npc::spawn_offset;
///
/// let origin = Position::new(4.0, 70.0, 4.0);
/// let spot = spawn_offset(&mut rand::thread_rng(), origin, 5.0);
/// assert!(spot.horizontal_distance(&origin) <= 5.0 + 1e-9);
/// assert_eq!(spot.y, 70.0);
/// ```
pub fn spawn_offset<R: Rng + ?Sized>(rng: &mut R, origin: Position, radius: f64) -> Position {
    if radius.is_nan() || radius <= 0.0 {
        return origin;
    }
    let angle = rng.gen_range(0.0..360.0);
    let distance = rng.gen_range(0.0..=radius);
    origin.offset_horizontal(angle, distance)
}
