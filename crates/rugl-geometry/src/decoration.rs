//! Corner joins and end caps for [`Line`](crate::Line).
//!
//! A join fills the wedge on the outside of a corner, between the end of the
//! incoming segment and the start of the outgoing one. A cap closes a free end
//! of an open line. Both only ever add geometry: the segment quads are emitted
//! by the tessellator itself.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rugl_core::math::{cross, line_circle_intersection, line_intersection};

use crate::mesh::{MeshBuilder, MeshVertex};

/// Flat corner cut through the midpoints of the wedge's sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BevelJoin;

/// Flat rectangular cap extending half the line width past the end point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SquareCap;

/// Circular arc approximated by a triangle fan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundDecoration {
    /// Longest arc length covered by one fan triangle.
    pub max_segment_length: f32,
}

impl RoundDecoration {
    pub fn new(max_segment_length: f32) -> Self {
        Self { max_segment_length }
    }

    fn steps(&self, radius: f32, angle: f32, min: usize) -> usize {
        let length = self.max_segment_length.max(f32::EPSILON);
        let steps = (radius * angle / length).ceil();
        if steps.is_finite() {
            (steps as usize).max(min)
        } else {
            min
        }
    }
}

impl Default for RoundDecoration {
    fn default() -> Self {
        Self {
            max_segment_length: 4.0,
        }
    }
}

/// Pointed decoration that falls back to a bevel past `bevel_limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiterDecoration {
    /// Largest distance from the centre line point to the tip before the tip
    /// is cut off. Never smaller than half the line width.
    pub bevel_limit: f32,
    /// Tip distance of a cap, in half widths.
    pub cap_length: f32,
}

impl MiterDecoration {
    pub fn new(bevel_limit: f32, cap_length: f32) -> Self {
        Self {
            bevel_limit,
            cap_length,
        }
    }

    fn limit(&self, half_width: f32) -> f32 {
        self.bevel_limit.max(half_width)
    }
}

impl Default for MiterDecoration {
    fn default() -> Self {
        Self {
            bevel_limit: 10.0,
            cap_length: 2.0,
        }
    }
}

/// Decoration applied where two segments meet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LineJoin {
    /// Sharp corners: both edges meet at the intersection of their offset
    /// lines. The outer point is not limited and moves out without bound as
    /// the turn approaches 180 degrees. Once the inner offsets would reach
    /// past the middle of either segment the corner is cut flat through the
    /// centre point instead.
    #[default]
    None,
    Bevel(BevelJoin),
    Round(RoundDecoration),
    Miter(MiterDecoration),
}

/// Decoration applied to the free ends of an open line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LineCap {
    /// The line ends flush with its end points.
    #[default]
    None,
    Square(SquareCap),
    Round(RoundDecoration),
    Miter(MiterDecoration),
}

/// The outer wedge of a corner.
///
/// `inner`, `first` and `second` are counter-clockwise. `inner` is where the
/// inner offset lines meet, or `centre` itself for a corner too sharp for its
/// segments. `first` and `second` are the outer edge vertices of the two
/// segments meeting at `centre`; `first_dir` and `second_dir` are the
/// directions of the offset lines through them.
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    pub centre: Vec2,
    pub inner: MeshVertex,
    pub first: MeshVertex,
    pub second: MeshVertex,
    pub first_dir: Vec2,
    pub second_dir: Vec2,
    pub half_width: f32,
}

/// A free end of a line.
///
/// `a` and `b` are the edge vertices at `centre`; `a, b` followed by any
/// point beyond the end along `outward` is counter-clockwise.
#[derive(Debug, Clone, Copy)]
pub struct End {
    pub centre: Vec2,
    pub a: MeshVertex,
    pub b: MeshVertex,
    pub outward: Vec2,
    pub half_width: f32,
}

impl LineJoin {
    pub fn is_none(&self) -> bool {
        matches!(self, LineJoin::None)
    }

    /// Fill the wedge of `corner`.
    pub fn decorate(&self, corner: &Corner, mesh: &mut MeshBuilder) {
        match self {
            LineJoin::None => {}
            LineJoin::Bevel(_) => bevel_join(corner, mesh),
            LineJoin::Round(round) => round_join(round, corner, mesh),
            LineJoin::Miter(miter) => miter_join(miter, corner, mesh),
        }
    }
}

impl LineCap {
    pub fn is_none(&self) -> bool {
        matches!(self, LineCap::None)
    }

    /// Close `end`.
    pub fn decorate(&self, end: &End, mesh: &mut MeshBuilder) {
        match self {
            LineCap::None => {}
            LineCap::Square(_) => square_cap(end, mesh),
            LineCap::Round(round) => round_cap(round, end, mesh),
            LineCap::Miter(miter) => miter_cap(miter, end, mesh),
        }
    }
}

fn bevel_join(corner: &Corner, mesh: &mut MeshBuilder) {
    let Corner {
        inner,
        first,
        second,
        ..
    } = *corner;
    let first_mid = mesh.push((inner.position + first.position) * 0.5);
    let second_mid = mesh.push((inner.position + second.position) * 0.5);

    mesh.triangle(first_mid, first, second);
    mesh.triangle(first_mid, second, second_mid);
    mesh.triangle(inner, first_mid, second_mid);
}

fn round_join(round: &RoundDecoration, corner: &Corner, mesh: &mut MeshBuilder) {
    let from = corner.first.position - corner.centre;
    let to = corner.second.position - corner.centre;
    let mut angle = cross(from, to).atan2(from.dot(to));
    if angle < 0.0 {
        angle += TAU;
    }

    let steps = round.steps(corner.half_width, angle, 1);
    let step = Vec2::from_angle(angle / steps as f32);

    let mut previous = corner.first;
    let mut offset = from;
    for i in 1..=steps {
        let next = if i == steps {
            corner.second
        } else {
            offset = step.rotate(offset);
            mesh.push(corner.centre + offset)
        };
        mesh.triangle(corner.inner, previous, next);
        previous = next;
    }
}

fn miter_join(miter: &MiterDecoration, corner: &Corner, mesh: &mut MeshBuilder) {
    let Corner {
        centre,
        inner,
        first,
        second,
        first_dir,
        second_dir,
        half_width,
    } = *corner;
    let limit = miter.limit(half_width);

    let tip = line_intersection(first.position, first_dir, second.position, second_dir)
        .filter(|tip| tip.distance(centre) <= limit);
    if let Some(tip) = tip {
        let tip = mesh.push(tip);
        mesh.triangle(inner, first, tip);
        mesh.triangle(inner, tip, second);
        return;
    }

    // Behind the centre, opposite the tip.
    let behind = centre * 2.0 - (first.position + second.position) * 0.5;
    let first_cut = line_circle_intersection(first.position, first_dir, centre, limit)
        .farthest_from(behind);
    let second_cut = line_circle_intersection(second.position, second_dir, centre, limit)
        .farthest_from(behind);

    match (first_cut, second_cut) {
        (Some(first_cut), Some(second_cut)) => {
            let first_cut = mesh.push(first_cut);
            let second_cut = mesh.push(second_cut);
            mesh.triangle(inner, first, first_cut);
            mesh.triangle(inner, first_cut, second_cut);
            mesh.triangle(inner, second_cut, second);
        }
        _ => mesh.triangle(inner, first, second),
    }
}

fn square_cap(end: &End, mesh: &mut MeshBuilder) {
    let extent = end.outward * end.half_width;
    let b2 = mesh.push(end.b.position + extent);
    let a2 = mesh.push(end.a.position + extent);
    mesh.quad(end.a, end.b, b2, a2);
}

fn round_cap(round: &RoundDecoration, end: &End, mesh: &mut MeshBuilder) {
    let steps = round.steps(end.half_width, PI, 2);
    let step = Vec2::from_angle(PI / steps as f32);

    let mut previous = end.b;
    let mut offset = end.b.position - end.centre;
    // The last step would end on `a` itself.
    for _ in 1..steps {
        offset = step.rotate(offset);
        let next = mesh.push(end.centre + offset);
        mesh.triangle(end.a, previous, next);
        previous = next;
    }
}

fn miter_cap(miter: &MiterDecoration, end: &End, mesh: &mut MeshBuilder) {
    let length = miter.cap_length * end.half_width;
    let limit = miter.limit(end.half_width);
    let tip = end.centre + end.outward * length;

    if length <= limit {
        let tip = mesh.push(tip);
        mesh.triangle(end.a, end.b, tip);
        return;
    }

    let cut = |from: Vec2| {
        line_circle_intersection(from, tip - from, end.centre, limit)
            .last()
            .unwrap_or(tip)
    };
    let b_cut = mesh.push(cut(end.b.position));
    let a_cut = mesh.push(cut(end.a.position));
    mesh.triangle(end.a, end.b, b_cut);
    mesh.triangle(end.a, b_cut, a_cut);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rugl_core::math::signed_area;

    /// A 90 degree left turn at the origin, half width 1, coming from -x and
    /// leaving towards +y.
    fn left_corner(mesh: &mut MeshBuilder) -> Corner {
        let inner = mesh.push(Vec2::new(-1.0, 1.0));
        let first = mesh.push(Vec2::new(0.0, -1.0));
        let second = mesh.push(Vec2::new(1.0, 0.0));
        Corner {
            centre: Vec2::ZERO,
            inner,
            first,
            second,
            first_dir: Vec2::X,
            second_dir: Vec2::Y,
            half_width: 1.0,
        }
    }

    /// The right end of a horizontal line of half width 1.
    fn right_end(mesh: &mut MeshBuilder) -> End {
        let a = mesh.push(Vec2::new(0.0, 1.0));
        let b = mesh.push(Vec2::new(0.0, -1.0));
        End {
            centre: Vec2::ZERO,
            a,
            b,
            outward: Vec2::X,
            half_width: 1.0,
        }
    }

    fn assert_ccw(mesh: MeshBuilder) -> crate::Shape {
        let shape = mesh.build();
        for [a, b, c] in shape.triangle_indices() {
            let area = signed_area(
                shape.vertex(a as usize).truncate(),
                shape.vertex(b as usize).truncate(),
                shape.vertex(c as usize).truncate(),
            );
            assert!(area > 0.0, "triangle {a} {b} {c} has area {area}");
        }
        shape
    }

    #[test]
    fn test_bevel_join() {
        let mut mesh = MeshBuilder::new(0.0);
        let corner = left_corner(&mut mesh);
        LineJoin::Bevel(BevelJoin).decorate(&corner, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.vertex_count(), 5);
        assert_eq!(shape.triangle_count(), 3);
    }

    #[test]
    fn test_round_join_steps() {
        let mut mesh = MeshBuilder::new(0.0);
        let corner = left_corner(&mut mesh);
        // Quarter circle of radius 1 is ~1.57 long.
        LineJoin::Round(RoundDecoration::new(0.5)).decorate(&corner, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.triangle_count(), 4);
        assert_eq!(shape.vertex_count(), 3 + 3);
        for p in shape.positions().skip(3) {
            assert!((p.truncate().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_miter_join_sharp() {
        let mut mesh = MeshBuilder::new(0.0);
        let corner = left_corner(&mut mesh);
        LineJoin::Miter(MiterDecoration::new(2.0, 2.0)).decorate(&corner, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.triangle_count(), 2);
        assert_eq!(shape.vertex(3).truncate(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_miter_join_beyond_limit() {
        let mut mesh = MeshBuilder::new(0.0);
        let corner = left_corner(&mut mesh);
        // The tip is sqrt(2) away, past the limit of 1.2.
        LineJoin::Miter(MiterDecoration::new(1.2, 2.0)).decorate(&corner, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.triangle_count(), 3);
        for p in shape.positions().skip(3) {
            assert!((p.truncate().length() - 1.2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_square_cap() {
        let mut mesh = MeshBuilder::new(0.0);
        let end = right_end(&mut mesh);
        LineCap::Square(SquareCap).decorate(&end, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.bounds().max(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_round_cap() {
        let mut mesh = MeshBuilder::new(0.0);
        let end = right_end(&mut mesh);
        LineCap::Round(RoundDecoration::new(1.0)).decorate(&end, &mut mesh);
        let shape = assert_ccw(mesh);
        // ceil(pi) = 4 steps: 3 new vertices, 3 triangles.
        assert_eq!(shape.vertex_count(), 5);
        assert_eq!(shape.triangle_count(), 3);
        assert!(shape.positions().all(|p| p.x >= -1e-6));
    }

    #[test]
    fn test_miter_cap() {
        let mut mesh = MeshBuilder::new(0.0);
        let end = right_end(&mut mesh);
        LineCap::Miter(MiterDecoration::new(4.0, 3.0)).decorate(&end, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.triangle_count(), 1);
        assert_eq!(shape.vertex(2).truncate(), Vec2::new(3.0, 0.0));

        let mut mesh = MeshBuilder::new(0.0);
        let end = right_end(&mut mesh);
        LineCap::Miter(MiterDecoration::new(2.0, 3.0)).decorate(&end, &mut mesh);
        let shape = assert_ccw(mesh);
        assert_eq!(shape.triangle_count(), 2);
        for p in shape.positions().skip(2) {
            assert!((p.truncate().length() - 2.0).abs() < 1e-5);
        }
    }
}
