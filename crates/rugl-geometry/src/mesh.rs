use glam::Vec2;

use crate::Shape;

/// A vertex already written to a [`MeshBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub index: u32,
    pub position: Vec2,
}

/// Accumulates a flat 2D mesh at a fixed depth.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    z: f32,
    vertices: Vec<f32>,
    triangles: Vec<u32>,
}

impl MeshBuilder {
    pub fn new(z: f32) -> Self {
        Self {
            z,
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(z: f32, vertices: usize, triangles: usize) -> Self {
        Self {
            z,
            vertices: Vec::with_capacity(vertices * 3),
            triangles: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn push(&mut self, position: Vec2) -> MeshVertex {
        let index = self.vertex_count() as u32;
        self.vertices
            .extend_from_slice(&[position.x, position.y, self.z]);
        MeshVertex { index, position }
    }

    /// Add a triangle. Callers emit counter-clockwise (y up) triangles.
    pub fn triangle(&mut self, a: MeshVertex, b: MeshVertex, c: MeshVertex) {
        self.triangles.extend_from_slice(&[a.index, b.index, c.index]);
    }

    /// Two triangles covering `a, b, c, d` in counter-clockwise order.
    pub fn quad(&mut self, a: MeshVertex, b: MeshVertex, c: MeshVertex, d: MeshVertex) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn build(self) -> Shape {
        Shape::from_raw(self.vertices, self.triangles)
    }
}
