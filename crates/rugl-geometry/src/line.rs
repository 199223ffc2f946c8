//! Polyline tessellation.
//!
//! A [`Line`] collects points and turns them into a triangle strip of constant
//! width, with optional decorations at the corners ([`LineJoin`]) and at the
//! free ends ([`LineCap`]).
//!
//! ```
//! use glam::Vec2;
//! use rugl_geometry::{Line, LineJoin, BevelJoin};
//!
//! let mut line = Line::new(2.0).with_join(LineJoin::Bevel(BevelJoin));
//! line.add_point(Vec2::new(0.0, 0.0));
//! line.add_point(Vec2::new(10.0, 0.0));
//! line.add_point(Vec2::new(10.0, 10.0));
//!
//! let shape = line.build_line(0.0).unwrap();
//! assert_eq!(shape.triangle_count(), 4 + 3);
//! assert_eq!(line.point_count(), 0);
//! ```

use std::mem;

use glam::Vec2;
use rugl_core::math::{Orientation, direction, line_intersection, relative_ccw};
use rugl_core::profiling::profile_function;

use crate::Shape;
use crate::decoration::{Corner, End, LineCap, LineJoin};
use crate::mesh::{MeshBuilder, MeshVertex};

/// The two vertices across the line at one point along it.
#[derive(Debug, Clone, Copy)]
struct Edge {
    left: MeshVertex,
    right: MeshVertex,
}

impl Edge {
    fn straight(mesh: &mut MeshBuilder, point: Vec2, normal: Vec2) -> Self {
        Self {
            left: mesh.push(point + normal),
            right: mesh.push(point - normal),
        }
    }
}

/// Connect two edges with a quad.
fn bridge(mesh: &mut MeshBuilder, from: Edge, to: Edge) {
    mesh.quad(from.right, to.right, to.left, from.left);
}

/// A polyline builder.
///
/// Points are kept minimal as they are added: repeated points are dropped and
/// a point that continues straight on from the previous segment replaces the
/// previous point instead of being appended.
#[derive(Debug, Clone)]
pub struct Line {
    points: Vec<Vec2>,
    width: f32,
    cap: LineCap,
    join: LineJoin,
}

impl Line {
    pub fn new(width: f32) -> Self {
        debug_assert!(width > 0.0, "line width must be positive, got {width}");
        Self {
            points: Vec::new(),
            width,
            cap: LineCap::None,
            join: LineJoin::None,
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        debug_assert!(width > 0.0, "line width must be positive, got {width}");
        self.width = width;
    }

    pub fn cap(&self) -> LineCap {
        self.cap
    }

    pub fn join(&self) -> LineJoin {
        self.join
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn add_point(&mut self, point: Vec2) {
        let len = self.points.len();
        if len > 0 && self.points[len - 1] == point {
            return;
        }

        if len >= 2 {
            let before = self.points[len - 2];
            if relative_ccw(before, self.points[len - 1], point) == Orientation::Colinear {
                self.points[len - 1] = point;
                // Doubled straight back onto the point before.
                if point == before {
                    self.points.pop();
                }
                return;
            }
        }

        self.points.push(point);
    }

    /// Tessellate the points as an open line, capped at both ends.
    ///
    /// Returns `None` with fewer than two points. The points are cleared
    /// either way.
    pub fn build_line(&mut self, z: f32) -> Option<Shape> {
        profile_function!();
        let points = mem::take(&mut self.points);
        let shape = self.tessellate_open(&points, z);
        self.restore(points);
        shape
    }

    /// Tessellate the points as a closed loop.
    ///
    /// A closing point equal to the first is ignored, as are points that lie
    /// on the straight line through their neighbours across the seam. Two
    /// remaining points are built as an open line; fewer return `None`. The
    /// points are cleared either way.
    pub fn build_loop(&mut self, z: f32) -> Option<Shape> {
        profile_function!();
        let mut points = mem::take(&mut self.points);
        prune_seam(&mut points);

        let shape = match points.len() {
            0 | 1 => None,
            2 => self.tessellate_open(&points, z),
            _ => Some(self.tessellate_closed(&points, z)),
        };
        self.restore(points);
        shape
    }

    /// Tessellate every segment as its own capped quad.
    ///
    /// Neighbouring segments share no vertices, so each can be coloured on
    /// its own. Returns `None` with fewer than two points. The points are
    /// cleared either way.
    pub fn build_segment_shape(&mut self, z: f32) -> Option<Shape> {
        profile_function!();
        let points = mem::take(&mut self.points);
        let shape = self.tessellate_segments(&points, z);
        self.restore(points);
        shape
    }

    fn restore(&mut self, mut points: Vec<Vec2>) {
        points.clear();
        self.points = points;
    }

    fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    fn tessellate_open(&self, points: &[Vec2], z: f32) -> Option<Shape> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let hw = self.half_width();
        let mut mesh = MeshBuilder::with_capacity(z, n * 2, n * 2);

        let first_dir = direction(points[0], points[1]);
        let start = Edge::straight(&mut mesh, points[0], first_dir.perp() * hw);
        self.cap.decorate(
            &End {
                centre: points[0],
                a: start.right,
                b: start.left,
                outward: -first_dir,
                half_width: hw,
            },
            &mut mesh,
        );

        let mut previous = start;
        for window in points.windows(3) {
            let (incoming, outgoing) = self.corner(&mut mesh, window[0], window[1], window[2]);
            bridge(&mut mesh, previous, incoming);
            previous = outgoing;
        }

        let last = points[n - 1];
        let last_dir = direction(points[n - 2], last);
        let end = Edge::straight(&mut mesh, last, last_dir.perp() * hw);
        bridge(&mut mesh, previous, end);
        self.cap.decorate(
            &End {
                centre: last,
                a: end.left,
                b: end.right,
                outward: last_dir,
                half_width: hw,
            },
            &mut mesh,
        );

        tracing::trace!(
            "Tessellated line: {} points, {} vertices, {} triangles",
            n,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Some(mesh.build())
    }

    fn tessellate_closed(&self, points: &[Vec2], z: f32) -> Shape {
        let n = points.len();
        debug_assert!(n >= 3);
        let mut mesh = MeshBuilder::with_capacity(z, n * 2, n * 2);

        let corners: Vec<(Edge, Edge)> = (0..n)
            .map(|i| {
                let previous = points[(i + n - 1) % n];
                let next = points[(i + 1) % n];
                self.corner(&mut mesh, previous, points[i], next)
            })
            .collect();

        for i in 0..n {
            let (_, outgoing) = corners[i];
            let (incoming, _) = corners[(i + 1) % n];
            bridge(&mut mesh, outgoing, incoming);
        }

        tracing::trace!(
            "Tessellated loop: {} points, {} vertices, {} triangles",
            n,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        mesh.build()
    }

    fn tessellate_segments(&self, points: &[Vec2], z: f32) -> Option<Shape> {
        if points.len() < 2 {
            return None;
        }
        let hw = self.half_width();
        let segments = points.len() - 1;
        let mut mesh = MeshBuilder::with_capacity(z, segments * 4, segments * 2);

        for pair in points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let dir = direction(from, to);
            let normal = dir.perp() * hw;
            let start = Edge::straight(&mut mesh, from, normal);
            let end = Edge::straight(&mut mesh, to, normal);
            bridge(&mut mesh, start, end);

            self.cap.decorate(
                &End {
                    centre: from,
                    a: start.right,
                    b: start.left,
                    outward: -dir,
                    half_width: hw,
                },
                &mut mesh,
            );
            self.cap.decorate(
                &End {
                    centre: to,
                    a: end.left,
                    b: end.right,
                    outward: dir,
                    half_width: hw,
                },
                &mut mesh,
            );
        }

        Some(mesh.build())
    }

    /// Build the corner at `point`, returning the edge that ends the incoming
    /// segment and the edge that starts the outgoing one.
    fn corner(
        &self,
        mesh: &mut MeshBuilder,
        previous: Vec2,
        point: Vec2,
        next: Vec2,
    ) -> (Edge, Edge) {
        let hw = self.half_width();
        let d1 = direction(previous, point);
        let d2 = direction(point, next);

        let orientation = relative_ccw(previous, point, next);
        debug_assert!(
            orientation != Orientation::Colinear,
            "colinear interior point {point} should have been pruned"
        );
        if orientation == Orientation::Colinear {
            let edge = Edge::straight(mesh, point, d1.perp() * hw);
            return (edge, edge);
        }

        let side = orientation.signum();
        let turn = Turn {
            orientation,
            point,
            d1,
            d2,
            n1: d1.perp() * hw * side,
            n2: d2.perp() * hw * side,
        };

        // The inner offsets may only reach halfway along either segment, so
        // neighbouring corners never cross.
        let inner = line_intersection(point + turn.n1, d1, point + turn.n2, d2).filter(|&inner| {
            (point - inner).dot(d1) <= previous.distance(point) * 0.5
                && (inner - point).dot(d2) <= point.distance(next) * 0.5
        });
        let Some(inner) = inner else {
            return self.split_corner(mesh, &turn);
        };

        let inner = mesh.push(inner);
        if self.join.is_none() {
            let outer = line_intersection(point - turn.n1, d1, point - turn.n2, d2)
                .unwrap_or(point - turn.n1);
            let edge = turn.edge(inner, mesh.push(outer));
            return (edge, edge);
        }

        let incoming = mesh.push(point - turn.n1);
        let outgoing = mesh.push(point - turn.n2);
        self.join.decorate(&turn.wedge(inner, incoming, outgoing, hw), mesh);
        (turn.edge(inner, incoming), turn.edge(inner, outgoing))
    }

    /// A corner too sharp for its segment lengths. Each segment ends square
    /// at `point` and the outer wedge is filled around `point` itself.
    fn split_corner(&self, mesh: &mut MeshBuilder, turn: &Turn) -> (Edge, Edge) {
        let point = turn.point;
        let incoming = (mesh.push(point + turn.n1), mesh.push(point - turn.n1));
        let outgoing = (mesh.push(point + turn.n2), mesh.push(point - turn.n2));
        let centre = mesh.push(point);

        let wedge = turn.wedge(centre, incoming.1, outgoing.1, self.half_width());
        if self.join.is_none() {
            mesh.triangle(wedge.inner, wedge.first, wedge.second);
        } else {
            self.join.decorate(&wedge, mesh);
        }
        (
            turn.edge(incoming.0, incoming.1),
            turn.edge(outgoing.0, outgoing.1),
        )
    }
}

/// A non-colinear corner. `n1` and `n2` are the half width normals of the
/// incoming and outgoing segments, pointing to the inside of the turn.
struct Turn {
    orientation: Orientation,
    point: Vec2,
    d1: Vec2,
    d2: Vec2,
    n1: Vec2,
    n2: Vec2,
}

impl Turn {
    /// The edge between a vertex on the inside of the turn and one outside.
    fn edge(&self, inner: MeshVertex, outer: MeshVertex) -> Edge {
        match self.orientation {
            Orientation::Right => Edge {
                left: outer,
                right: inner,
            },
            _ => Edge {
                left: inner,
                right: outer,
            },
        }
    }

    /// The outer wedge between the incoming and outgoing outer vertices.
    fn wedge(
        &self,
        inner: MeshVertex,
        incoming: MeshVertex,
        outgoing: MeshVertex,
        half_width: f32,
    ) -> Corner {
        let (first, second, first_dir, second_dir) = match self.orientation {
            Orientation::Right => (outgoing, incoming, self.d2, self.d1),
            _ => (incoming, outgoing, self.d1, self.d2),
        };
        Corner {
            centre: self.point,
            inner,
            first,
            second,
            first_dir,
            second_dir,
            half_width,
        }
    }
}

/// Drop a repeated closing point and any point that runs straight through
/// the seam between the last and first points.
fn prune_seam(points: &mut Vec<Vec2>) {
    if points.len() >= 2 && points.first() == points.last() {
        points.pop();
    }

    while points.len() >= 3 {
        let n = points.len();
        if relative_ccw(points[n - 2], points[n - 1], points[0]) == Orientation::Colinear {
            points.pop();
        } else if relative_ccw(points[n - 1], points[0], points[1]) == Orientation::Colinear {
            points.remove(0);
        } else {
            break;
        }
    }
}
