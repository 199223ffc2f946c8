//! The boundary between the batch renderer and the GPU.

use crate::{Facets, State};

/// One frame's worth of vertex data, shared by every draw in the frame.
#[derive(Debug, Clone, Copy)]
pub struct VertexBatch<'a> {
    /// `x, y, z` per vertex.
    pub vertices: &'a [f32],
    /// `u, v` per vertex. Untextured submissions contribute zeros.
    pub tex_coords: &'a [f32],
    /// Packed RGBA per vertex, red in the lowest byte.
    pub colours: &'a [u32],
}

impl VertexBatch<'_> {
    pub fn vertex_count(&self) -> usize {
        self.colours.len()
    }
}

/// Something that can execute indexed triangle draws.
///
/// The renderer calls `begin_frame` once, then alternates `apply_state` and
/// `draw_triangles` once per non-empty state bucket in pool order, then
/// `end_frame`. Indices passed to `draw_triangles` address the batch given to
/// `begin_frame`.
pub trait DrawBackend {
    fn begin_frame(&mut self, batch: &VertexBatch<'_>);

    /// Switch to `state`. `changes` lists the facets that differ from the
    /// previously applied state (all facets for the first state of a frame).
    fn apply_state(&mut self, state: &State, changes: Facets);

    fn draw_triangles(&mut self, indices: &[u32]);

    fn end_frame(&mut self);
}

impl<B: DrawBackend + ?Sized> DrawBackend for Box<B> {
    fn begin_frame(&mut self, batch: &VertexBatch<'_>) {
        (**self).begin_frame(batch);
    }

    fn apply_state(&mut self, state: &State, changes: Facets) {
        (**self).apply_state(state, changes);
    }

    fn draw_triangles(&mut self, indices: &[u32]) {
        (**self).draw_triangles(indices);
    }

    fn end_frame(&mut self) {
        (**self).end_frame();
    }
}
