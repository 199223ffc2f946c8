use std::fmt;

/// Errors reported by the renderer for malformed submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Vertex array length is not a multiple of 3.
    VertexLayout { len: usize },
    /// One packed colour per vertex is required.
    ColourCount { expected: usize, actual: usize },
    /// Two texture coordinates per vertex are required.
    TexCoordCount { expected: usize, actual: usize },
    /// A submission must contain at least one triangle.
    EmptyTriangles,
    /// Index array length is not a multiple of 3.
    TriangleLayout { len: usize },
    /// A triangle refers to a vertex the submission does not contain.
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// `push_matrix` and `pop_matrix` calls did not pair up within a frame.
    UnbalancedMatrixStack { pushes: usize, pops: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::VertexLayout { len } => {
                write!(f, "vertex array length {len} is not a multiple of 3")
            }
            RenderError::ColourCount { expected, actual } => {
                write!(f, "expected {expected} colours, got {actual}")
            }
            RenderError::TexCoordCount { expected, actual } => {
                write!(f, "expected {expected} texture coordinates, got {actual}")
            }
            RenderError::EmptyTriangles => write!(f, "submission contains no triangles"),
            RenderError::TriangleLayout { len } => {
                write!(f, "triangle index array length {len} is not a multiple of 3")
            }
            RenderError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "triangle index {index} out of range for {vertex_count} vertices"
            ),
            RenderError::UnbalancedMatrixStack { pushes, pops } => write!(
                f,
                "unbalanced matrix stack: {pushes} push_matrix vs {pops} pop_matrix calls"
            ),
        }
    }
}

impl std::error::Error for RenderError {}
