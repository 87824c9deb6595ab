//! Error types for formfind.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`FormError`].
pub type Result<T> = std::result::Result<T, FormError>;

/// Errors that can occur while building meshes or running the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three distinct vertices.
    #[error("face {face} is degenerate (fewer than 3 distinct vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is claimed by more than one face.
    #[error("directed edge ({v0}, {v1}) is used by more than one face")]
    NonManifoldEdge {
        /// Start vertex of the directed edge.
        v0: usize,
        /// End vertex of the directed edge.
        v1: usize,
    },

    /// The per-face vertex counts do not match the flattened index array.
    #[error("face counts sum to {expected} indices but {actual} were supplied")]
    FaceCountMismatch {
        /// Sum of the per-face vertex counts.
        expected: usize,
        /// Length of the flattened index array.
        actual: usize,
    },

    /// A boundary half-edge could not be linked into a closed loop.
    #[error("boundary half-edge {halfedge} cannot be linked into a loop")]
    BoundaryLoop {
        /// The boundary half-edge index.
        halfedge: usize,
    },

    /// An element index is outside the current container.
    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Element kind ("vertex", "edge", "face", ...).
        kind: &'static str,
        /// The offending index.
        index: usize,
        /// Current container length.
        len: usize,
    },

    /// An input array has the wrong length.
    #[error("size mismatch for {name}: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Name of the offending input.
        name: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Invalid solver state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl FormError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        FormError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a size mismatch error.
    pub(crate) fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        FormError::SizeMismatch {
            name,
            expected,
            actual,
        }
    }
}
