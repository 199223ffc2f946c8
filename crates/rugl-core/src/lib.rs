//! RUGL Core
//!
//! Math, geometry primitives, logging and profiling shared by the rest of the
//! RUGL crates.

pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
