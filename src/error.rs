//! Error types for whittle.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::mesh::FaceHandle;

/// Result type alias using [`SimplifyError`].
pub type Result<T> = std::result::Result<T, SimplifyError>;

/// Errors that can occur during mesh construction or error-metric evaluation.
#[derive(Error, Debug)]
pub enum SimplifyError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A surface fit over a face neighborhood did not reach a stable solution.
    ///
    /// Raised by fit-based metrics when the weighted neighborhood is too
    /// small or too degenerate to pin down an algebraic surface. Callers
    /// may skip or defer the offending edge.
    #[error("surface fit is not stable for {face:?}")]
    UnstableFit {
        /// The face whose neighborhood was fit.
        face: FaceHandle,
    },

    /// A surface fit produced no surface at all (undefined state).
    #[error("surface fit is undefined for {face:?}")]
    UndefinedFit {
        /// The face whose neighborhood was fit.
        face: FaceHandle,
    },

    /// An edge has no incident faces, so no local primitive can be built.
    #[error("edge has no incident faces")]
    IsolatedEdge,
}
