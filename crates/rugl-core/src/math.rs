//! Vector math for tessellation and rendering.
//!
//! Re-exports the SIMD-accelerated [`glam`] types and adds the handful of 2D
//! line routines the tessellator relies on: orientation tests, line/line and
//! line/circle intersection, and closest-point queries.
//!
//! ```
//! use rugl_core::math::{Orientation, Vec2, relative_ccw};
//!
//! let turn = relative_ccw(Vec2::ZERO, Vec2::X, Vec2::new(1.0, 1.0));
//! assert_eq!(turn, Orientation::Left);
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub mod fast {
    pub use glam::*;
}

pub use fast::*;

/// Parallel-line tolerance for the intersection routines.
const PARALLEL_EPSILON: f32 = 1e-12;

/// Which way a path turns at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Counter-clockwise turn (y axis up).
    Left,
    /// Clockwise turn.
    Right,
    /// No turn at all: the three points are on one line.
    Colinear,
}

impl Orientation {
    /// `1.0` for left, `-1.0` for right, `0.0` for colinear.
    pub fn signum(self) -> f32 {
        match self {
            Orientation::Left => 1.0,
            Orientation::Right => -1.0,
            Orientation::Colinear => 0.0,
        }
    }
}

/// The 2D cross product (perp-dot) of `a` and `b`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Classify the turn `a -> b -> p`.
///
/// Only an exactly zero cross product is reported as colinear, so a point that
/// doubles back along the previous segment is colinear too.
pub fn relative_ccw(a: Vec2, b: Vec2, p: Vec2) -> Orientation {
    let c = cross(b - a, p - b);
    if c > 0.0 {
        Orientation::Left
    } else if c < 0.0 {
        Orientation::Right
    } else {
        Orientation::Colinear
    }
}

/// Unit direction from `from` to `to`.
///
/// Coincident points give [`Vec2::X`] rather than NaN.
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or(Vec2::X)
}

/// Intersection of the infinite lines `p1 + t * d1` and `p2 + s * d2`.
///
/// Returns `None` for parallel (or degenerate) lines.
pub fn line_intersection(p1: Vec2, d1: Vec2, p2: Vec2, d2: Vec2) -> Option<Vec2> {
    let denom = cross(d1, d2);
    if denom.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = cross(p2 - p1, d2) / denom;
    Some(p1 + d1 * t)
}

/// Intersection of the closed segments `a0..a1` and `b0..b1`.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<Vec2> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = cross(da, db);
    if denom.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let offset = b0 - a0;
    let t = cross(offset, db) / denom;
    let s = cross(offset, da) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
        Some(a0 + da * t)
    } else {
        None
    }
}

/// Points where a line crosses a circle, ordered along the line direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleHits {
    Miss,
    Tangent(Vec2),
    Secant(Vec2, Vec2),
}

impl CircleHits {
    pub fn is_miss(&self) -> bool {
        matches!(self, CircleHits::Miss)
    }

    /// The hit furthest along the line direction.
    pub fn last(&self) -> Option<Vec2> {
        match *self {
            CircleHits::Miss => None,
            CircleHits::Tangent(p) => Some(p),
            CircleHits::Secant(_, p) => Some(p),
        }
    }

    /// The hit with the greatest distance from `point`.
    pub fn farthest_from(&self, point: Vec2) -> Option<Vec2> {
        match *self {
            CircleHits::Miss => None,
            CircleHits::Tangent(p) => Some(p),
            CircleHits::Secant(a, b) => {
                if a.distance_squared(point) >= b.distance_squared(point) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
        }
    }
}

/// Intersect the infinite line `point + t * dir` with a circle.
pub fn line_circle_intersection(point: Vec2, dir: Vec2, centre: Vec2, radius: f32) -> CircleHits {
    let a = dir.length_squared();
    if a <= PARALLEL_EPSILON {
        return CircleHits::Miss;
    }
    let rel = point - centre;
    let b = 2.0 * dir.dot(rel);
    let c = rel.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;

    if disc < 0.0 {
        CircleHits::Miss
    } else if disc == 0.0 {
        CircleHits::Tangent(point + dir * (-b / (2.0 * a)))
    } else {
        let root = disc.sqrt();
        let t0 = (-b - root) / (2.0 * a);
        let t1 = (-b + root) / (2.0 * a);
        CircleHits::Secant(point + dir * t0, point + dir * t1)
    }
}

/// The point on segment `a..b` nearest to `p`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Signed area of the triangle `a, b, c`; positive when counter-clockwise.
#[inline]
pub fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    0.5 * cross(b - a, c - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_ccw() {
        let a = Vec2::ZERO;
        let b = Vec2::new(1.0, 0.0);
        assert_eq!(relative_ccw(a, b, Vec2::new(2.0, 1.0)), Orientation::Left);
        assert_eq!(relative_ccw(a, b, Vec2::new(2.0, -1.0)), Orientation::Right);
        assert_eq!(relative_ccw(a, b, Vec2::new(2.0, 0.0)), Orientation::Colinear);
        // doubling back is still colinear
        assert_eq!(relative_ccw(a, b, Vec2::new(-3.0, 0.0)), Orientation::Colinear);
    }

    #[test]
    fn test_line_intersection() {
        let hit = line_intersection(Vec2::ZERO, Vec2::X, Vec2::new(2.0, -1.0), Vec2::Y);
        assert_eq!(hit, Some(Vec2::new(2.0, 0.0)));

        let parallel = line_intersection(Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::X * 3.0);
        assert!(parallel.is_none());
    }

    #[test]
    fn test_segment_intersection() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0),
        );
        assert_eq!(hit, Some(Vec2::new(1.0, 1.0)));

        let miss = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, -1.0),
            Vec2::new(2.0, 1.0),
        );
        assert!(miss.is_none());
    }

    #[test]
    fn test_line_circle_intersection() {
        let hits = line_circle_intersection(Vec2::new(-5.0, 0.0), Vec2::X, Vec2::ZERO, 2.0);
        assert_eq!(hits, CircleHits::Secant(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)));
        assert_eq!(hits.last(), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(
            hits.farthest_from(Vec2::new(-10.0, 0.0)),
            Some(Vec2::new(2.0, 0.0))
        );

        let tangent = line_circle_intersection(Vec2::new(-5.0, 2.0), Vec2::X, Vec2::ZERO, 2.0);
        assert_eq!(tangent, CircleHits::Tangent(Vec2::new(0.0, 2.0)));

        let miss = line_circle_intersection(Vec2::new(-5.0, 3.0), Vec2::X, Vec2::ZERO, 2.0);
        assert!(miss.is_miss());
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = Vec2::ZERO;
        let b = Vec2::new(4.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(1.0, 3.0)), Vec2::new(1.0, 0.0));
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(-2.0, 1.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(9.0, 1.0)), b);
        assert_eq!(closest_point_on_segment(a, a, Vec2::new(9.0, 1.0)), a);
    }

    #[test]
    fn test_direction_of_coincident_points() {
        assert_eq!(direction(Vec2::ONE, Vec2::ONE), Vec2::X);
        assert_eq!(direction(Vec2::ZERO, Vec2::new(0.0, 5.0)), Vec2::Y);
    }

    #[test]
    fn test_signed_area() {
        assert!(signed_area(Vec2::ZERO, Vec2::X, Vec2::Y) > 0.0);
        assert!(signed_area(Vec2::ZERO, Vec2::Y, Vec2::X) < 0.0);
    }
}
