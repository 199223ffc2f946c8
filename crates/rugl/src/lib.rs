//! RUGL - A state-batching triangle renderer with a polyline tessellator
//!
//! - **Rendering**: triangles are bucketed by render [`State`](render::State)
//!   and drawn with one call per state, through any
//!   [`DrawBackend`](render::DrawBackend) (wgpu included)
//! - **Geometry**: lines with joins and caps, shape factories, and meshes
//!   that submit themselves to a renderer
//!
//! # Quick Start
//!
//! ```ignore
//! use rugl::prelude::*;
//!
//! rugl::init(&Config::default());
//!
//! let backend = WgpuBackend::new(&device, &queue, WgpuBackendDescriptor::default());
//! let mut renderer = Renderer::new(backend, RendererDescriptor::default());
//!
//! let mut line = Line::new(2.0).with_join(LineJoin::Bevel(BevelJoin));
//! line.add_point(Vec2::new(0.0, 0.0));
//! line.add_point(Vec2::new(100.0, 40.0));
//! line.add_point(Vec2::new(200.0, 0.0));
//! if let Some(shape) = line.build_line(0.0) {
//!     shape.coloured(Color::WHITE, State::new()).render(&mut renderer)?;
//! }
//!
//! renderer.render();
//! renderer.backend().encode(&mut pass);
//! ```

use rugl_core::config::{Config, ProfilingMode};
use rugl_core::logging;
use rugl_core::profiling::{ProfilingBackend, init_profiling};

// Re-export core types
pub use rugl_core as core;
pub use rugl_core::math;

pub use rugl_render as render;

#[cfg(feature = "geometry")]
pub use rugl_geometry as geometry;

/// Apply the engine-wide [`Config`].
///
/// Installs the global `tracing` subscriber unless one is already set, and
/// starts the puffin HTTP server when profiling is requested.
pub fn init(config: &Config) {
    if let Err(e) = logging::try_init(config.log_filter.as_deref()) {
        tracing::debug!("Keeping existing tracing subscriber: {}", e);
    }

    match config.profiling {
        ProfilingMode::Off => {}
        ProfilingMode::PuffinHttp => init_profiling(ProfilingBackend::PuffinHttp),
    }

    tracing::info!("RUGL {} initialised", env!("CARGO_PKG_VERSION"));
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use rugl_core::config::{Config, ProfilingMode};
    pub use rugl_core::geometry::Rect;

    // Core math types
    pub use rugl_core::math::{Mat4, Vec2, Vec3, Vec4};

    // Render types
    pub use rugl_render::{
        BlendMode, Color, DrawBackend, RenderError, RenderStats, Renderer, RendererDescriptor,
        StackedRenderer, State, TextureAtlas, TextureId, TriangleSink, WgpuBackend,
        WgpuBackendDescriptor,
    };

    // Geometry types
    #[cfg(feature = "geometry")]
    pub use rugl_geometry::{
        BevelJoin, ColouredShape, Line, LineCap, LineJoin, MiterDecoration, RoundDecoration,
        Shape, ShapeError, SquareCap, TexturedShape, shapes,
    };
}
