//! Triangle meshes and their renderable wrappers.

use std::cell::OnceCell;

use glam::{Mat4, Vec2, Vec3};
use rugl_core::geometry::Rect;
use rugl_render::{Color, RenderError, State, TriangleSink};

use crate::ShapeError;

/// An indexed triangle mesh.
///
/// Vertices are stored as flat `x, y, z` triples and triangles as flat index
/// triples. Every index is below [`vertex_count`](Shape::vertex_count).
#[derive(Debug, Clone, Default)]
pub struct Shape {
    vertices: Vec<f32>,
    triangles: Vec<u32>,
    bounds: OnceCell<Rect<f32>>,
}

impl Shape {
    /// Build a shape, checking the vertex and index layout.
    pub fn new(vertices: Vec<f32>, triangles: Vec<u32>) -> Result<Self, ShapeError> {
        if vertices.len() % 3 != 0 {
            return Err(ShapeError::VertexLayout {
                len: vertices.len(),
            });
        }
        if triangles.len() % 3 != 0 {
            return Err(ShapeError::TriangleLayout {
                len: triangles.len(),
            });
        }
        let vertex_count = vertices.len() / 3;
        if let Some(&index) = triangles.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ShapeError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(Self::from_raw(vertices, triangles))
    }

    /// Build a shape from data the caller guarantees is well formed.
    pub(crate) fn from_raw(vertices: Vec<f32>, triangles: Vec<u32>) -> Self {
        debug_assert_eq!(vertices.len() % 3, 0);
        debug_assert_eq!(triangles.len() % 3, 0);
        debug_assert!(triangles.iter().all(|&i| (i as usize) < vertices.len() / 3));
        Self {
            vertices,
            triangles,
            bounds: OnceCell::new(),
        }
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Position of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn vertex(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[index * 3..index * 3 + 3])
    }

    /// Iterate over vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.chunks_exact(3).map(Vec3::from_slice)
    }

    /// Iterate over triangles as index triples.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Axis-aligned bounds of the x/y coordinates.
    ///
    /// Computed on first use and cached until the shape is modified. An empty
    /// shape has [`Rect::EMPTY`] bounds.
    pub fn bounds(&self) -> Rect<f32> {
        *self.bounds.get_or_init(|| {
            self.positions()
                .fold(Rect::EMPTY, |rect, p| rect.union_point(p.truncate()))
        })
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        for v in self.vertices.chunks_exact_mut(3) {
            v[0] += dx;
            v[1] += dy;
            v[2] += dz;
        }
        self.invalidate();
    }

    /// Scale about the origin.
    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        for v in self.vertices.chunks_exact_mut(3) {
            v[0] *= sx;
            v[1] *= sy;
            v[2] *= sz;
        }
        self.invalidate();
    }

    /// Rotate counter-clockwise by `degrees` about the z axis through `centre`.
    pub fn rotate(&mut self, degrees: f32, centre: Vec2) {
        let rotation = Vec2::from_angle(degrees.to_radians());
        for v in self.vertices.chunks_exact_mut(3) {
            let p = centre + rotation.rotate(Vec2::new(v[0], v[1]) - centre);
            v[0] = p.x;
            v[1] = p.y;
        }
        self.invalidate();
    }

    pub fn transform(&mut self, matrix: &Mat4) {
        for v in self.vertices.chunks_exact_mut(3) {
            let p = matrix.transform_point3(Vec3::new(v[0], v[1], v[2]));
            v.copy_from_slice(&p.to_array());
        }
        self.invalidate();
    }

    /// Merge `other` into this shape.
    pub fn append(&mut self, other: &Shape) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|index| index + offset));
        self.invalidate();
    }

    /// Wrap with a single colour.
    pub fn coloured(self, colour: Color, state: State) -> ColouredShape {
        ColouredShape::new(self, colour, state)
    }

    fn invalidate(&mut self) {
        self.bounds.take();
    }
}

/// A [`Shape`] with a packed colour per vertex and the state it is drawn with.
#[derive(Debug, Clone)]
pub struct ColouredShape {
    shape: Shape,
    colours: Vec<u32>,
    state: State,
}

impl ColouredShape {
    pub fn new(shape: Shape, colour: Color, state: State) -> Self {
        let colours = vec![colour.to_packed(); shape.vertex_count()];
        Self {
            shape,
            colours,
            state,
        }
    }

    /// Per-vertex colours, packed as by [`Color::to_packed`].
    pub fn with_colours(shape: Shape, colours: Vec<u32>, state: State) -> Result<Self, ShapeError> {
        if colours.len() != shape.vertex_count() {
            return Err(ShapeError::ColourCount {
                expected: shape.vertex_count(),
                actual: colours.len(),
            });
        }
        Ok(Self {
            shape,
            colours,
            state,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn colours(&self) -> &[u32] {
        &self.colours
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    pub fn set_colour(&mut self, colour: Color) {
        self.colours.fill(colour.to_packed());
    }

    pub fn set_vertex_colour(&mut self, index: usize, colour: Color) {
        self.colours[index] = colour.to_packed();
    }

    pub fn bounds(&self) -> Rect<f32> {
        self.shape.bounds()
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.shape.translate(dx, dy, dz);
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.shape.scale(sx, sy, sz);
    }

    pub fn rotate(&mut self, degrees: f32, centre: Vec2) {
        self.shape.rotate(degrees, centre);
    }

    pub fn transform(&mut self, matrix: &Mat4) {
        self.shape.transform(matrix);
    }

    /// Submit to a renderer. Shapes without triangles are skipped.
    pub fn render(&self, renderer: &mut impl TriangleSink) -> Result<(), RenderError> {
        if self.shape.is_empty() {
            return Ok(());
        }
        renderer.add_triangles(
            self.shape.vertices(),
            None,
            &self.colours,
            self.shape.triangles(),
            &self.state,
        )
    }
}

/// A [`ColouredShape`] with texture coordinates.
#[derive(Debug, Clone)]
pub struct TexturedShape {
    shape: Shape,
    tex_coords: Vec<f32>,
    colours: Vec<u32>,
    state: State,
}

impl TexturedShape {
    /// `tex_coords` holds `u, v` per vertex.
    pub fn new(
        shape: Shape,
        tex_coords: Vec<f32>,
        colour: Color,
        state: State,
    ) -> Result<Self, ShapeError> {
        let expected = shape.vertex_count() * 2;
        if tex_coords.len() != expected {
            return Err(ShapeError::TexCoordCount {
                expected,
                actual: tex_coords.len(),
            });
        }
        let colours = vec![colour.to_packed(); shape.vertex_count()];
        Ok(Self {
            shape,
            tex_coords,
            colours,
            state,
        })
    }

    /// Map the shape's bounds linearly onto `uv_rect`, e.g. an atlas entry's
    /// `uv_rect`. The top of the shape maps to the top of the rectangle.
    pub fn planar(shape: Shape, uv_rect: Rect<f32>, colour: Color, state: State) -> Self {
        let bounds = shape.bounds();
        let size = Vec2::new(bounds.width, bounds.height).max(Vec2::splat(f32::EPSILON));
        let tex_coords = shape
            .positions()
            .flat_map(|p| {
                let t = (p.truncate() - bounds.min()) / size;
                [
                    uv_rect.x + t.x * uv_rect.width,
                    uv_rect.y + (1.0 - t.y) * uv_rect.height,
                ]
            })
            .collect();
        let colours = vec![colour.to_packed(); shape.vertex_count()];
        Self {
            shape,
            tex_coords,
            colours,
            state,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    pub fn colours(&self) -> &[u32] {
        &self.colours
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn set_colour(&mut self, colour: Color) {
        self.colours.fill(colour.to_packed());
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.shape.translate(dx, dy, dz);
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.shape.scale(sx, sy, sz);
    }

    pub fn rotate(&mut self, degrees: f32, centre: Vec2) {
        self.shape.rotate(degrees, centre);
    }

    pub fn render(&self, renderer: &mut impl TriangleSink) -> Result<(), RenderError> {
        if self.shape.is_empty() {
            return Ok(());
        }
        renderer.add_triangles(
            self.shape.vertices(),
            Some(&self.tex_coords),
            &self.colours,
            self.shape.triangles(),
            &self.state,
        )
    }
}
