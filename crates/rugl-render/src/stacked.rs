//! A [`Renderer`] with a fixed-function style model-view matrix stack.

use std::sync::Arc;

use rugl_core::math::{Mat4, Vec3};
use rugl_core::profiling::profile_function;

use crate::backend::DrawBackend;
use crate::pool::CompiledState;
use crate::renderer::{Processor, RenderStats, Renderer, RendererDescriptor, TriangleSink};
use crate::{RenderError, State};

/// Transforms submitted vertices by the current matrix before batching them.
///
/// Every `push_matrix` must be paired with a `pop_matrix` before the next
/// [`render`](StackedRenderer::render). Debug builds check this and drop the
/// frame when the calls do not pair up.
pub struct StackedRenderer<B: DrawBackend> {
    renderer: Renderer<B>,
    stack: Vec<Mat4>,
    current: Mat4,
    identity: bool,
    pushes: usize,
    pops: usize,
    scratch: Vec<f32>,
}

impl<B: DrawBackend> StackedRenderer<B> {
    pub fn new(backend: B, descriptor: RendererDescriptor) -> Self {
        Self::from_renderer(Renderer::new(backend, descriptor))
    }

    pub fn from_renderer(renderer: Renderer<B>) -> Self {
        Self {
            renderer,
            stack: Vec::new(),
            current: Mat4::IDENTITY,
            identity: true,
            pushes: 0,
            pops: 0,
            scratch: Vec::new(),
        }
    }

    pub fn renderer(&self) -> &Renderer<B> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<B> {
        &mut self.renderer
    }

    pub fn backend(&self) -> &B {
        self.renderer.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.renderer.backend_mut()
    }

    /// The matrix applied to submitted vertices.
    pub fn matrix(&self) -> Mat4 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push_matrix(&mut self) {
        self.stack.push(self.current);
        self.pushes += 1;
    }

    /// Restore the matrix saved by the matching `push_matrix`.
    ///
    /// Popping an empty stack logs a warning and loads the identity.
    pub fn pop_matrix(&mut self) {
        self.pops += 1;
        match self.stack.pop() {
            Some(matrix) => self.set_matrix(matrix),
            None => {
                tracing::warn!("pop_matrix called on an empty matrix stack");
                self.load_identity();
            }
        }
    }

    pub fn load_identity(&mut self) {
        self.current = Mat4::IDENTITY;
        self.identity = true;
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.multiply(Mat4::from_translation(Vec3::new(x, y, z)));
    }

    /// Rotate by `degrees` counter-clockwise about `axis`.
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            tracing::warn!("Ignoring rotation about a zero-length axis");
            return;
        };
        self.multiply(Mat4::from_axis_angle(axis, degrees.to_radians()));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.multiply(Mat4::from_scale(Vec3::new(x, y, z)));
    }

    /// Post-multiply the current matrix, so `m` applies to vertices first.
    pub fn multiply(&mut self, m: Mat4) {
        self.set_matrix(self.current * m);
    }

    fn set_matrix(&mut self, matrix: Mat4) {
        self.current = matrix;
        self.identity = matrix == Mat4::IDENTITY;
    }

    pub fn intern(&mut self, state: &State) -> Arc<CompiledState> {
        self.renderer.intern(state)
    }

    pub fn push_processor(&mut self, processor: Box<dyn Processor>) {
        self.renderer.push_processor(processor);
    }

    pub fn pop_processor(&mut self) -> Option<Box<dyn Processor>> {
        self.renderer.pop_processor()
    }

    pub fn count_vertices(&self) -> usize {
        self.renderer.count_vertices()
    }

    pub fn count_triangles(&self) -> usize {
        self.renderer.count_triangles()
    }

    /// Same as [`Renderer::add_triangles`], with `vertices` transformed by the
    /// current matrix.
    pub fn add_triangles(
        &mut self,
        vertices: &[f32],
        tex_coords: Option<&[f32]>,
        colours: &[u32],
        triangles: &[u32],
        state: &State,
    ) -> Result<(), RenderError> {
        if self.identity {
            return self
                .renderer
                .add_triangles(vertices, tex_coords, colours, triangles, state);
        }

        profile_function!();

        if vertices.len() % 3 != 0 {
            return Err(RenderError::VertexLayout {
                len: vertices.len(),
            });
        }

        self.scratch.clear();
        self.scratch.reserve(vertices.len());
        for v in vertices.chunks_exact(3) {
            let p = self.current.transform_point3(Vec3::new(v[0], v[1], v[2]));
            self.scratch.extend_from_slice(&[p.x, p.y, p.z]);
        }

        self.renderer
            .add_triangles(&self.scratch, tex_coords, colours, triangles, state)
    }

    /// Render the frame.
    ///
    /// In debug builds an unbalanced matrix stack discards the frame, resets
    /// the stack and returns [`RenderError::UnbalancedMatrixStack`].
    pub fn render(&mut self) -> Result<RenderStats, RenderError> {
        let (pushes, pops) = (self.pushes, self.pops);
        self.pushes = 0;
        self.pops = 0;

        if cfg!(debug_assertions) && pushes != pops {
            tracing::error!(
                "Unbalanced matrix stack: {} push_matrix vs {} pop_matrix, discarding frame",
                pushes,
                pops
            );
            self.stack.clear();
            self.load_identity();
            self.renderer.discard();
            return Err(RenderError::UnbalancedMatrixStack { pushes, pops });
        }

        Ok(self.renderer.render())
    }

    pub fn discard(&mut self) {
        self.renderer.discard();
    }
}

impl<B: DrawBackend> TriangleSink for StackedRenderer<B> {
    fn add_triangles(
        &mut self,
        vertices: &[f32],
        tex_coords: Option<&[f32]>,
        colours: &[u32],
        triangles: &[u32],
        state: &State,
    ) -> Result<(), RenderError> {
        StackedRenderer::add_triangles(self, vertices, tex_coords, colours, triangles, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::VertexBatch;
    use crate::Facets;

    #[derive(Default)]
    struct CaptureBackend {
        vertices: Vec<f32>,
    }

    impl DrawBackend for CaptureBackend {
        fn begin_frame(&mut self, batch: &VertexBatch<'_>) {
            self.vertices = batch.vertices.to_vec();
        }

        fn apply_state(&mut self, _state: &State, _changes: Facets) {}

        fn draw_triangles(&mut self, _indices: &[u32]) {}

        fn end_frame(&mut self) {}
    }

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn stacked() -> StackedRenderer<CaptureBackend> {
        StackedRenderer::new(CaptureBackend::default(), RendererDescriptor::default())
    }

    #[test]
    fn test_translate_applies_to_vertices() {
        let mut renderer = stacked();
        renderer.push_matrix();
        renderer.translate(10.0, 20.0, 0.0);
        renderer
            .add_triangles(&TRIANGLE, None, &[0; 3], &[0, 1, 2], &State::new())
            .unwrap();
        renderer.pop_matrix();

        renderer.render().unwrap();
        assert_eq!(
            renderer.backend().vertices,
            vec![10.0, 20.0, 0.0, 11.0, 20.0, 0.0, 10.0, 21.0, 0.0]
        );
    }

    #[test]
    fn test_pop_restores_previous_matrix() {
        let mut renderer = stacked();
        renderer.scale(2.0, 2.0, 2.0);
        renderer.push_matrix();
        renderer.translate(1.0, 0.0, 0.0);
        renderer.pop_matrix();
        assert_eq!(renderer.matrix(), Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(renderer.depth(), 0);
    }

    #[test]
    fn test_rotate_about_z() {
        let mut renderer = stacked();
        renderer.rotate(90.0, Vec3::Z);
        let p = renderer.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-6);

        // Zero axis is ignored.
        renderer.load_identity();
        renderer.rotate(45.0, Vec3::ZERO);
        assert_eq!(renderer.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_pop_empty_stack_loads_identity() {
        let mut renderer = stacked();
        renderer.translate(3.0, 0.0, 0.0);
        renderer.pop_matrix();
        assert_eq!(renderer.matrix(), Mat4::IDENTITY);
    }
}
