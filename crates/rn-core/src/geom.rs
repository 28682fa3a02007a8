//! Vector helpers shared by the track geometry and the editor.
//!
//! Positions are `glam::DVec3` in double precision.  `x`/`y` span the
//! horizontal plane and `z` is height; curvature is always decided in the
//! horizontal plane and height is interpolated linearly along a segment.

pub use glam::{DVec2, DVec3};

/// Horizontal projection of `v`.
#[inline]
pub fn flat(v: DVec3) -> DVec2 {
    v.truncate()
}

/// Unit horizontal direction of `v`, or `None` if it has no horizontal extent.
#[inline]
pub fn flat_dir(v: DVec3) -> Option<DVec2> {
    v.truncate().try_normalize()
}

/// 2-D cross product (`z` of the 3-D cross).  Positive when `b` lies
/// counter-clockwise of `a`.
#[inline]
pub fn cross2(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Unsigned angle between two horizontal vectors, in degrees.
///
/// Returns 180 if either vector is zero, so degenerate input never passes a
/// "nearly parallel" test.
pub fn angle_deg(a: DVec2, b: DVec2) -> f64 {
    match (a.try_normalize(), b.try_normalize()) {
        (Some(a), Some(b)) => a.dot(b).clamp(-1.0, 1.0).acos().to_degrees(),
        _ => 180.0,
    }
}

/// Intersection of the rays `a + s·da` and `b + u·db`, returned as `(s, u)`.
///
/// `None` when the rays are parallel.
pub fn ray_intersection(a: DVec2, da: DVec2, b: DVec2, db: DVec2) -> Option<(f64, f64)> {
    let denom = cross2(da, db);
    if denom.abs() < 1e-12 {
        return None;
    }
    let ab = b - a;
    let s = cross2(ab, db) / denom;
    let u = cross2(ab, da) / denom;
    Some((s, u))
}
