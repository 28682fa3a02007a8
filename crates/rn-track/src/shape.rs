//! Closed-form track geometry.
//!
//! A segment is either a straight line or a circular arc in the horizontal
//! plane with height interpolated linearly by travel fraction.  Both expose
//! the same `position_at` / `direction_at` / `length` surface, so the graph,
//! router and integrator never branch on the shape kind.

use std::f64::consts::TAU;

use rn_core::geom::{cross2, flat, flat_dir};
use rn_core::{DVec2, DVec3};

/// Discriminant of a [`TrackShape`], used as the segment type tag.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Straight,
    Arc,
}

/// Geometry of one track segment, parameterised by fraction in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackShape {
    Straight {
        start: DVec3,
        end:   DVec3,
    },
    Arc {
        /// Horizontal centre of the circle.
        center:      DVec2,
        radius:      f64,
        /// Polar angle of the start point around `center`, radians.
        start_angle: f64,
        /// Signed angle swept; positive is counter-clockwise.
        sweep:       f64,
        start_z:     f64,
        end_z:       f64,
    },
}

impl TrackShape {
    #[inline]
    pub fn straight(start: DVec3, end: DVec3) -> Self {
        TrackShape::Straight { start, end }
    }

    /// Arc leaving `start` along `tangent` and ending at `end`.
    ///
    /// The centre lies on the horizontal perpendicular to `tangent` at signed
    /// distance `r = |Δ|² / (2 · Δ·perp)`; the sign of `r` (equivalently of
    /// the 2-D cross product of tangent and Δ) picks counter-clockwise or
    /// clockwise.  Returns `None` when `end` lies on the tangent line (no
    /// finite circle), or the tangent has no horizontal extent.
    pub fn arc_from_tangent(start: DVec3, tangent: DVec3, end: DVec3) -> Option<Self> {
        let d = flat_dir(tangent)?;
        let delta = flat(end - start);
        let perp = d.perp();
        let denom = 2.0 * delta.dot(perp);
        if denom.abs() < 1e-9 {
            return None;
        }
        let r = delta.length_squared() / denom;
        let center = flat(start) + perp * r;
        let a0 = polar(flat(start) - center);
        let a1 = polar(flat(end) - center);
        let sweep = if cross2(d, delta) > 0.0 {
            (a1 - a0).rem_euclid(TAU)
        } else {
            -(a0 - a1).rem_euclid(TAU)
        };
        Some(TrackShape::Arc {
            center,
            radius: r.abs(),
            start_angle: a0,
            sweep,
            start_z: start.z,
            end_z: end.z,
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            TrackShape::Straight { .. } => ShapeKind::Straight,
            TrackShape::Arc { .. } => ShapeKind::Arc,
        }
    }

    /// Horizontal run of the shape (arc length in plan view).
    fn plan_length(&self) -> f64 {
        match *self {
            TrackShape::Straight { start, end } => flat(end - start).length(),
            TrackShape::Arc { radius, sweep, .. } => radius * sweep.abs(),
        }
    }

    fn rise(&self) -> f64 {
        match *self {
            TrackShape::Straight { start, end } => end.z - start.z,
            TrackShape::Arc { start_z, end_z, .. } => end_z - start_z,
        }
    }

    /// Travel length along the track, including grade.
    pub fn length(&self) -> f64 {
        self.plan_length().hypot(self.rise())
    }

    pub fn position_at(&self, fraction: f64) -> DVec3 {
        match *self {
            TrackShape::Straight { start, end } => start.lerp(end, fraction),
            TrackShape::Arc { center, radius, start_angle, sweep, start_z, end_z } => {
                let a = start_angle + sweep * fraction;
                let p = center + DVec2::new(a.cos(), a.sin()) * radius;
                p.extend(start_z + (end_z - start_z) * fraction)
            }
        }
    }

    /// Unit direction of travel (increasing fraction) at `fraction`.
    pub fn direction_at(&self, fraction: f64) -> DVec3 {
        match *self {
            TrackShape::Straight { start, end } => (end - start).normalize_or_zero(),
            TrackShape::Arc { radius, start_angle, sweep, start_z, end_z, .. } => {
                let a = start_angle + sweep * fraction;
                let tangent = if sweep >= 0.0 {
                    DVec2::new(-a.sin(), a.cos())
                } else {
                    DVec2::new(a.sin(), -a.cos())
                };
                (tangent * radius * sweep.abs())
                    .extend(end_z - start_z)
                    .normalize_or_zero()
            }
        }
    }

    pub fn start(&self) -> DVec3 {
        self.position_at(0.0)
    }

    pub fn end(&self) -> DVec3 {
        self.position_at(1.0)
    }

    /// The part of this shape between fractions `f0` and `f1`.
    pub fn sub(&self, f0: f64, f1: f64) -> Self {
        match *self {
            TrackShape::Straight { .. } => {
                TrackShape::Straight { start: self.position_at(f0), end: self.position_at(f1) }
            }
            TrackShape::Arc { center, radius, start_angle, sweep, start_z, end_z } => {
                let dz = end_z - start_z;
                TrackShape::Arc {
                    center,
                    radius,
                    start_angle: start_angle + sweep * f0,
                    sweep:       sweep * (f1 - f0),
                    start_z:     start_z + dz * f0,
                    end_z:       start_z + dz * f1,
                }
            }
        }
    }

    /// The same track traversed from end to start.
    pub fn reversed(&self) -> Self {
        match *self {
            TrackShape::Straight { start, end } => TrackShape::Straight { start: end, end: start },
            TrackShape::Arc { center, radius, start_angle, sweep, start_z, end_z } => {
                TrackShape::Arc {
                    center,
                    radius,
                    start_angle: start_angle + sweep,
                    sweep: -sweep,
                    start_z: end_z,
                    end_z: start_z,
                }
            }
        }
    }
}

#[inline]
fn polar(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}
