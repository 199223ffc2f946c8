//! Factories for common shapes.
//!
//! All shapes are flat at depth `z` and wound counter-clockwise with the y
//! axis pointing up.

use std::f32::consts::TAU;

use glam::Vec2;
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;
use rugl_core::math::signed_area;
use rugl_core::profiling::profile_function;

use crate::{Line, LineJoin, MeshBuilder, Shape, ShapeError};

/// Axis aligned rectangle with its minimum corner at `(x, y)`.
pub fn rectangle(x: f32, y: f32, width: f32, height: f32, z: f32) -> Shape {
    let mut mesh = MeshBuilder::with_capacity(z, 4, 2);
    let a = mesh.push(Vec2::new(x, y));
    let b = mesh.push(Vec2::new(x + width, y));
    let c = mesh.push(Vec2::new(x + width, y + height));
    let d = mesh.push(Vec2::new(x, y + height));
    mesh.quad(a, b, c, d);
    mesh.build()
}

/// Filled circle as a fan of `segments` triangles around its centre.
///
/// At least 3 segments are used.
pub fn circle(centre: Vec2, radius: f32, segments: usize, z: f32) -> Shape {
    let segments = segments.max(3);
    let mut mesh = MeshBuilder::with_capacity(z, segments + 1, segments);
    let hub = mesh.push(centre);
    let rim: Vec<_> = rim_points(centre, radius, segments)
        .map(|p| mesh.push(p))
        .collect();
    for i in 0..segments {
        mesh.triangle(hub, rim[i], rim[(i + 1) % segments]);
    }
    mesh.build()
}

/// Annulus between `inner` and `outer` radii.
///
/// At least 3 segments are used.
pub fn ring(centre: Vec2, inner: f32, outer: f32, segments: usize, z: f32) -> Shape {
    let segments = segments.max(3);
    let mut mesh = MeshBuilder::with_capacity(z, segments * 2, segments * 2);
    let inner: Vec<_> = rim_points(centre, inner, segments)
        .map(|p| mesh.push(p))
        .collect();
    let outer: Vec<_> = rim_points(centre, outer, segments)
        .map(|p| mesh.push(p))
        .collect();
    for i in 0..segments {
        let j = (i + 1) % segments;
        mesh.quad(inner[i], outer[i], outer[j], inner[j]);
    }
    mesh.build()
}

fn rim_points(centre: Vec2, radius: f32, segments: usize) -> impl Iterator<Item = Vec2> {
    (0..segments).map(move |i| {
        let angle = i as f32 / segments as f32 * TAU;
        centre + Vec2::from_angle(angle) * radius
    })
}

/// Fill a simple polygon, convex or not, using the non-zero rule.
pub fn filled_polygon(points: &[Vec2], z: f32) -> Result<Shape, ShapeError> {
    profile_function!();

    if points.len() < 3 {
        return Err(ShapeError::TooFewPoints {
            required: 3,
            actual: points.len(),
        });
    }

    let mut builder = Path::builder();
    builder.begin(point(points[0].x, points[0].y));
    for p in &points[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::non_zero(),
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
            Vec2::new(vertex.position().x, vertex.position().y)
        }),
    );
    if let Err(e) = result {
        tracing::warn!("Polygon fill tessellation failed: {:?}", e);
        return Err(ShapeError::Tessellation(format!("{e:?}")));
    }

    let VertexBuffers {
        vertices,
        mut indices,
    } = buffers;
    for triangle in indices.chunks_exact_mut(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| vertices[i as usize]);
        if signed_area(a, b, c) < 0.0 {
            triangle.swap(1, 2);
        }
    }

    let flat = vertices.iter().flat_map(|v| [v.x, v.y, z]).collect();
    Ok(Shape::from_raw(flat, indices))
}

/// A closed outline of `width` through `points`.
///
/// Returns `None` when fewer than two distinct points remain.
pub fn outline(points: &[Vec2], width: f32, join: LineJoin, z: f32) -> Option<Shape> {
    let mut line = Line::new(width).with_join(join);
    for &p in points {
        line.add_point(p);
    }
    line.build_loop(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ccw(shape: &Shape) {
        for [a, b, c] in shape.triangle_indices() {
            let area = signed_area(
                shape.vertex(a as usize).truncate(),
                shape.vertex(b as usize).truncate(),
                shape.vertex(c as usize).truncate(),
            );
            assert!(area > 0.0);
        }
    }

    #[test]
    fn test_rectangle() {
        let shape = rectangle(1.0, 2.0, 3.0, 4.0, 0.0);
        assert_eq!(shape.triangles(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(shape.bounds().max(), Vec2::new(4.0, 6.0));
        assert_ccw(&shape);
    }

    #[test]
    fn test_circle() {
        let shape = circle(Vec2::new(5.0, 5.0), 2.0, 16, 1.0);
        assert_eq!(shape.vertex_count(), 17);
        assert_eq!(shape.triangle_count(), 16);
        assert_ccw(&shape);

        let shape = circle(Vec2::ZERO, 1.0, 1, 0.0);
        assert_eq!(shape.triangle_count(), 3);
    }

    #[test]
    fn test_ring() {
        let shape = ring(Vec2::ZERO, 1.0, 2.0, 8, 0.0);
        assert_eq!(shape.vertex_count(), 16);
        assert_eq!(shape.triangle_count(), 16);
        assert_ccw(&shape);
    }

    #[test]
    fn test_filled_polygon_concave() {
        // An L shape.
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let shape = filled_polygon(&points, 0.0).unwrap();
        assert!(shape.triangle_count() >= 4);
        assert_ccw(&shape);

        let area: f32 = shape
            .triangle_indices()
            .map(|[a, b, c]| {
                signed_area(
                    shape.vertex(a as usize).truncate(),
                    shape.vertex(b as usize).truncate(),
                    shape.vertex(c as usize).truncate(),
                )
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_filled_polygon_too_few_points() {
        let err = filled_polygon(&[Vec2::ZERO, Vec2::X], 0.0).unwrap_err();
        assert_eq!(
            err,
            ShapeError::TooFewPoints {
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_outline() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let shape = outline(&square, 0.2, LineJoin::None, 0.0).unwrap();
        assert_eq!(shape.vertex_count(), 8);
        assert_eq!(shape.triangle_count(), 8);
        assert_ccw(&shape);
    }
}
