//! Immediate-mode triangle batching.
//!
//! Geometry is submitted with an arbitrary [`State`]. The renderer interns the
//! state, copies the vertex data into its own growable buffers and appends the
//! (re-based) triangle indices to that state's bucket. [`Renderer::render`]
//! then issues one draw per non-empty bucket in pool order and resets for the
//! next frame.
//!
//! # Example
//!
//! ```ignore
//! let mut renderer = Renderer::new(backend, RendererDescriptor::default());
//! let state = State::new().with_blend(BlendMode::Alpha);
//!
//! renderer.add_triangles(&vertices, None, &colours, &triangles, &state)?;
//! let stats = renderer.render();
//! ```

use std::sync::Arc;

use rugl_core::profiling::{profile_function, profile_scope};

use crate::backend::{DrawBackend, VertexBatch};
use crate::color::scale_packed_alpha;
use crate::pool::{CompiledState, StatePool};
use crate::{Facets, RenderError, State};

/// Configuration for creating a [`Renderer`].
#[derive(Debug, Clone)]
pub struct RendererDescriptor {
    /// Name used in log messages.
    pub name: String,
    /// Vertices the shared buffers can hold before the first reallocation.
    pub initial_vertices: usize,
}

impl Default for RendererDescriptor {
    fn default() -> Self {
        Self {
            name: "Renderer".to_string(),
            initial_vertices: 4096,
        }
    }
}

impl RendererDescriptor {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_initial_vertices(mut self, vertices: usize) -> Self {
        self.initial_vertices = vertices;
        self
    }
}

/// Per-frame statistics returned by [`Renderer::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub vertices: usize,
    pub triangles: usize,
    pub draw_calls: usize,
    /// Draws whose state differed from the previous draw in at least one facet.
    pub state_changes: usize,
}

/// Triangle indices accumulated for one interned state.
#[derive(Debug, Default, Clone)]
pub struct TriangleList {
    indices: Vec<u32>,
}

impl TriangleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `triangles`, shifting each index by `offset`.
    fn add(&mut self, triangles: &[u32], offset: u32) {
        let needed = self.indices.len() + triangles.len();
        if needed > self.indices.capacity() {
            self.indices.reserve_exact(needed - self.indices.len());
        }
        self.indices.extend(triangles.iter().map(|index| index + offset));
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn clear(&mut self) {
        self.indices.clear();
    }
}

/// Post-processing hook run on every submission right after it is copied.
///
/// The slices cover only the newly added vertices: `x, y, z` triples,
/// `u, v` pairs and packed colours.
pub trait Processor {
    fn process(&mut self, vertices: &mut [f32], tex_coords: &mut [f32], colours: &mut [u32]);
}

impl<F> Processor for F
where
    F: FnMut(&mut [f32], &mut [f32], &mut [u32]),
{
    fn process(&mut self, vertices: &mut [f32], tex_coords: &mut [f32], colours: &mut [u32]) {
        self(vertices, tex_coords, colours)
    }
}

/// Anything that accepts triangle submissions: [`Renderer`] and
/// [`StackedRenderer`](crate::StackedRenderer).
pub trait TriangleSink {
    fn add_triangles(
        &mut self,
        vertices: &[f32],
        tex_coords: Option<&[f32]>,
        colours: &[u32],
        triangles: &[u32],
        state: &State,
    ) -> Result<(), RenderError>;
}

/// Scales the alpha of every submitted vertex.
#[derive(Debug, Clone, Copy)]
pub struct AlphaFade {
    pub alpha: f32,
}

impl Processor for AlphaFade {
    fn process(&mut self, _vertices: &mut [f32], _tex_coords: &mut [f32], colours: &mut [u32]) {
        for colour in colours {
            *colour = scale_packed_alpha(*colour, self.alpha);
        }
    }
}

/// State-batching triangle renderer.
///
/// Single threaded: submissions and `render` are expected to happen on the
/// same thread within one frame.
pub struct Renderer<B: DrawBackend> {
    backend: B,
    descriptor: RendererDescriptor,
    pool: StatePool,
    /// Parallel to the pool: `buckets[i]` belongs to the state with compiled index `i`.
    buckets: Vec<TriangleList>,
    vertices: Vec<f32>,
    tex_coords: Vec<f32>,
    colours: Vec<u32>,
    triangle_count: usize,
    processors: Vec<Box<dyn Processor>>,
}

impl<B: DrawBackend> Renderer<B> {
    pub fn new(backend: B, descriptor: RendererDescriptor) -> Self {
        let capacity = descriptor.initial_vertices;
        Self {
            backend,
            descriptor,
            pool: StatePool::new(),
            buckets: Vec::new(),
            vertices: Vec::with_capacity(capacity * 3),
            tex_coords: Vec::with_capacity(capacity * 2),
            colours: Vec::with_capacity(capacity),
            triangle_count: 0,
            processors: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &RendererDescriptor {
        &self.descriptor
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn states(&self) -> &StatePool {
        &self.pool
    }

    /// Canonical pooled instance of `state`.
    pub fn intern(&mut self, state: &State) -> Arc<CompiledState> {
        let interned = self.pool.intern(state);
        if interned.inserted {
            self.buckets
                .insert(interned.state.compiled_index(), TriangleList::new());
        }
        interned.state
    }

    /// Queue triangles for this frame.
    ///
    /// `vertices` holds `x, y, z` per vertex, `tex_coords` (if any) `u, v` per
    /// vertex and `colours` one packed colour per vertex. `triangles` indexes
    /// into this submission's vertices only. The data is copied; nothing is
    /// retained past the call.
    pub fn add_triangles(
        &mut self,
        vertices: &[f32],
        tex_coords: Option<&[f32]>,
        colours: &[u32],
        triangles: &[u32],
        state: &State,
    ) -> Result<(), RenderError> {
        profile_function!();

        if let Err(err) = validate(vertices, tex_coords, colours, triangles) {
            tracing::warn!("{}: rejected submission: {}", self.descriptor.name, err);
            return Err(err);
        }

        let compiled = self.intern(state);
        let vertex_count = colours.len();
        let base = self.colours.len();

        self.reserve(vertex_count);
        self.vertices.extend_from_slice(vertices);
        match tex_coords {
            Some(tex_coords) => self.tex_coords.extend_from_slice(tex_coords),
            None => self.tex_coords.resize(self.tex_coords.len() + vertex_count * 2, 0.0),
        }
        self.colours.extend_from_slice(colours);

        self.buckets[compiled.compiled_index()].add(triangles, base as u32);
        self.triangle_count += triangles.len() / 3;

        if !self.processors.is_empty() {
            profile_scope!("processors");
            let Self {
                processors,
                vertices,
                tex_coords,
                colours,
                ..
            } = self;
            let vertices = &mut vertices[base * 3..];
            let tex_coords = &mut tex_coords[base * 2..];
            let colours = &mut colours[base..];
            for processor in processors.iter_mut() {
                processor.process(vertices, tex_coords, colours);
            }
        }

        Ok(())
    }

    /// Install a processor on top of the stack.
    pub fn push_processor(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(processor);
    }

    pub fn pop_processor(&mut self) -> Option<Box<dyn Processor>> {
        self.processors.pop()
    }

    /// Vertices queued since the last render.
    pub fn count_vertices(&self) -> usize {
        self.colours.len()
    }

    /// Triangles queued since the last render.
    pub fn count_triangles(&self) -> usize {
        self.triangle_count
    }

    /// Draw everything queued this frame, then reset for the next one.
    pub fn render(&mut self) -> RenderStats {
        profile_function!();

        let mut stats = RenderStats {
            vertices: self.count_vertices(),
            triangles: self.triangle_count,
            ..Default::default()
        };

        self.backend.begin_frame(&VertexBatch {
            vertices: &self.vertices,
            tex_coords: &self.tex_coords,
            colours: &self.colours,
        });

        let mut previous: Option<&State> = None;
        for (compiled, bucket) in self.pool.iter().zip(&self.buckets) {
            if bucket.is_empty() {
                continue;
            }
            let state = compiled.state();
            let changes = previous.map_or(Facets::all(), |prev| state.changes_from(prev));
            self.backend.apply_state(state, changes);
            self.backend.draw_triangles(bucket.indices());

            stats.draw_calls += 1;
            if !changes.is_empty() {
                stats.state_changes += 1;
            }
            previous = Some(state);
        }

        self.backend.end_frame();

        tracing::trace!(
            "{}: rendered {} triangles ({} vertices) in {} draw calls",
            self.descriptor.name,
            stats.triangles,
            stats.vertices,
            stats.draw_calls
        );

        self.discard();
        stats
    }

    /// Drop everything queued this frame without drawing it.
    pub fn discard(&mut self) {
        self.vertices.clear();
        self.tex_coords.clear();
        self.colours.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.triangle_count = 0;
    }

    /// Make room for `additional` vertices, doubling the buffers when full.
    fn reserve(&mut self, additional: usize) {
        let needed = self.colours.len() + additional;
        let capacity = self.colours.capacity();
        if needed <= capacity {
            return;
        }
        let new_capacity = (capacity * 2).max(needed);
        tracing::debug!(
            "{}: growing vertex buffers from {} to {} vertices",
            self.descriptor.name,
            capacity,
            new_capacity
        );
        let grow = new_capacity - self.colours.len();
        self.vertices.reserve_exact(grow * 3);
        self.tex_coords.reserve_exact(grow * 2);
        self.colours.reserve_exact(grow);
    }
}

impl<B: DrawBackend> TriangleSink for Renderer<B> {
    fn add_triangles(
        &mut self,
        vertices: &[f32],
        tex_coords: Option<&[f32]>,
        colours: &[u32],
        triangles: &[u32],
        state: &State,
    ) -> Result<(), RenderError> {
        Renderer::add_triangles(self, vertices, tex_coords, colours, triangles, state)
    }
}

fn validate(
    vertices: &[f32],
    tex_coords: Option<&[f32]>,
    colours: &[u32],
    triangles: &[u32],
) -> Result<(), RenderError> {
    if vertices.len() % 3 != 0 {
        return Err(RenderError::VertexLayout {
            len: vertices.len(),
        });
    }
    let vertex_count = vertices.len() / 3;
    if colours.len() != vertex_count {
        return Err(RenderError::ColourCount {
            expected: vertex_count,
            actual: colours.len(),
        });
    }
    if let Some(tex_coords) = tex_coords
        && tex_coords.len() != vertex_count * 2
    {
        return Err(RenderError::TexCoordCount {
            expected: vertex_count * 2,
            actual: tex_coords.len(),
        });
    }
    if triangles.is_empty() {
        return Err(RenderError::EmptyTriangles);
    }
    if triangles.len() % 3 != 0 {
        return Err(RenderError::TriangleLayout {
            len: triangles.len(),
        });
    }
    if let Some(&index) = triangles.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(RenderError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }
    Ok(())
}
