use std::fmt;

/// Errors reported when building shapes from caller data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Vertex array length is not a multiple of 3.
    VertexLayout { len: usize },
    /// Index array length is not a multiple of 3.
    TriangleLayout { len: usize },
    /// A triangle refers to a vertex the shape does not contain.
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// One packed colour per vertex is required.
    ColourCount { expected: usize, actual: usize },
    /// Two texture coordinates per vertex are required.
    TexCoordCount { expected: usize, actual: usize },
    /// Not enough points to describe the requested shape.
    TooFewPoints { required: usize, actual: usize },
    /// The fill tessellator rejected the outline.
    Tessellation(String),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::VertexLayout { len } => {
                write!(f, "vertex array length {len} is not a multiple of 3")
            }
            ShapeError::TriangleLayout { len } => {
                write!(f, "triangle index array length {len} is not a multiple of 3")
            }
            ShapeError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "triangle index {index} out of range for {vertex_count} vertices"
            ),
            ShapeError::ColourCount { expected, actual } => {
                write!(f, "expected {expected} colours, got {actual}")
            }
            ShapeError::TexCoordCount { expected, actual } => {
                write!(f, "expected {expected} texture coordinates, got {actual}")
            }
            ShapeError::TooFewPoints { required, actual } => {
                write!(f, "need at least {required} points, got {actual}")
            }
            ShapeError::Tessellation(reason) => write!(f, "fill tessellation failed: {reason}"),
        }
    }
}

impl std::error::Error for ShapeError {}
