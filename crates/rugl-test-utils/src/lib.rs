//! Test utilities for RUGL.
//!
//! The main component is [`RecordingBackend`], a [`DrawBackend`] that draws
//! nothing and records every call it receives, so renderer behaviour can be
//! verified without a GPU.
//!
//! # Example
//!
//! ```rust
//! use rugl_render::{Renderer, RendererDescriptor, State};
//! use rugl_test_utils::RecordingBackend;
//!
//! let backend = RecordingBackend::new();
//! let mut renderer = Renderer::new(backend.clone(), RendererDescriptor::default());
//!
//! renderer
//!     .add_triangles(&[0.0; 9], None, &[0; 3], &[0, 1, 2], &State::new())
//!     .unwrap();
//! renderer.render();
//!
//! assert_eq!(backend.count_draws(), 1);
//! assert_eq!(backend.count_frames(), 1);
//! ```
//!
//! # Interior Mutability
//!
//! Clones share one call log behind a `parking_lot::Mutex`. Hand a clone to the
//! renderer and keep another for assertions.

use std::sync::Arc;

use parking_lot::Mutex;
use rugl_render::{DrawBackend, Facets, State, VertexBatch};

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    BeginFrame {
        vertex_count: usize,
        vertices: Vec<f32>,
        tex_coords: Vec<f32>,
        colours: Vec<u32>,
    },
    ApplyState {
        state: State,
        changes: Facets,
    },
    DrawTriangles {
        indices: Vec<u32>,
    },
    EndFrame,
}

/// A [`DrawBackend`] that records calls for verification in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded call.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_frames(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::BeginFrame { .. }))
    }

    pub fn count_draws(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::DrawTriangles { .. }))
    }

    /// State switches that changed at least one facet.
    pub fn count_state_changes(&self) -> usize {
        self.count(
            |call| matches!(call, BackendCall::ApplyState { changes, .. } if !changes.is_empty()),
        )
    }

    /// States applied, in order.
    pub fn applied_states(&self) -> Vec<State> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                BackendCall::ApplyState { state, .. } => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// Index lists drawn, in order.
    pub fn drawn_indices(&self) -> Vec<Vec<u32>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                BackendCall::DrawTriangles { indices } => Some(indices.clone()),
                _ => None,
            })
            .collect()
    }

    /// Vertex positions of the most recent frame.
    pub fn last_vertices(&self) -> Vec<f32> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|call| match call {
                BackendCall::BeginFrame { vertices, .. } => Some(vertices.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Packed colours of the most recent frame.
    pub fn last_colours(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|call| match call {
                BackendCall::BeginFrame { colours, .. } => Some(colours.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().push(call);
    }
}

impl DrawBackend for RecordingBackend {
    fn begin_frame(&mut self, batch: &VertexBatch<'_>) {
        self.record(BackendCall::BeginFrame {
            vertex_count: batch.vertex_count(),
            vertices: batch.vertices.to_vec(),
            tex_coords: batch.tex_coords.to_vec(),
            colours: batch.colours.to_vec(),
        });
    }

    fn apply_state(&mut self, state: &State, changes: Facets) {
        self.record(BackendCall::ApplyState {
            state: *state,
            changes,
        });
    }

    fn draw_triangles(&mut self, indices: &[u32]) {
        self.record(BackendCall::DrawTriangles {
            indices: indices.to_vec(),
        });
    }

    fn end_frame(&mut self) {
        self.record(BackendCall::EndFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let backend = RecordingBackend::new();
        let mut clone = backend.clone();
        clone.end_frame();
        assert_eq!(backend.calls(), vec![BackendCall::EndFrame]);

        backend.clear_calls();
        assert_eq!(clone.call_count(), 0);
    }
}
