//! RUGL Render - State-batching immediate-mode triangle renderer
//!
//! This crate provides:
//! - Immutable render [`State`]s, interned into a sorted [`StatePool`]
//! - A [`Renderer`] that buckets triangles per state and draws each bucket once
//! - A [`StackedRenderer`] with a model-view matrix stack
//! - The [`DrawBackend`] boundary and a wgpu implementation of it
//! - Rectangle packing and a keyed [`TextureAtlas`]
//!
//! # Example
//!
//! ```ignore
//! use rugl_render::*;
//!
//! let backend = WgpuBackend::new(&device, &queue, WgpuBackendDescriptor::default());
//! let mut renderer = Renderer::new(backend, RendererDescriptor::default());
//!
//! let state = State::new().with_blend(BlendMode::Additive);
//! renderer.add_triangles(&vertices, None, &colours, &triangles, &state)?;
//!
//! let stats = renderer.render();
//! renderer.backend().encode(&mut pass);
//! ```

// State
mod blend;
mod color;
mod pool;
mod state;

// Batching
mod backend;
mod error;
mod renderer;
mod stacked;

// GPU
mod wgpu_backend;

// Textures
mod atlas;
mod packer;

// Re-exports
pub use blend::*;
pub use color::*;
pub use pool::*;
pub use state::*;

pub use backend::*;
pub use error::*;
pub use renderer::*;
pub use stacked::*;

pub use wgpu_backend::*;

pub use atlas::*;
pub use packer::*;
