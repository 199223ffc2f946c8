//! RUGL Geometry - Line tessellation and shape primitives
//!
//! This crate provides:
//! - Indexed triangle meshes ([`Shape`]) and their coloured and textured
//!   wrappers, which submit themselves to a renderer
//! - A polyline tessellator ([`Line`]) with configurable corner joins and
//!   end caps
//! - Factories for rectangles, circles, rings, filled polygons and outlines
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use rugl_geometry::*;
//! use rugl_render::{Color, State};
//!
//! let mut line = Line::new(4.0)
//!     .with_join(LineJoin::Round(RoundDecoration::default()))
//!     .with_cap(LineCap::Square(SquareCap));
//! line.add_point(Vec2::new(0.0, 0.0));
//! line.add_point(Vec2::new(100.0, 0.0));
//! line.add_point(Vec2::new(100.0, 50.0));
//!
//! let shape = line.build_line(0.0).unwrap();
//! let coloured = shape.coloured(Color::WHITE, State::new());
//! assert!(coloured.bounds().contains(Vec2::new(100.0, 25.0)));
//! ```

// Meshes
mod error;
mod mesh;
mod shape;

// Tessellation
mod decoration;
mod line;

pub mod shapes;

// Re-exports
pub use error::*;
pub use mesh::*;
pub use shape::*;

pub use decoration::*;
pub use line::*;
