//! Linear trajectory calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point3;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Interpolate between `start` and `dest` at relative time `t`, each axis
/// independently.
///
/// `t` is the leg's relative time, i.e. after the [`super::TimeDirection`]
/// has been applied.
pub fn linear_position(start: &Point3<f64>, dest: &Point3<f64>, t: f64) -> Point3<f64> {
    start + (dest - start) * t
}
