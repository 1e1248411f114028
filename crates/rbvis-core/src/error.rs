//! Error types for model loading and kinematic updates.

use std::path::PathBuf;

/// Errors that can occur while loading a model descriptor.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The path does not exist or is not a regular file.
    #[error("not a regular file: {}", .0.display())]
    InvalidFile(PathBuf),

    #[error("IO error: {0}")]
    Io(String),

    /// The descriptor was rejected by one of the two parse passes.
    #[error("failed to parse descriptor: {0}")]
    ParseFailure(String),

    /// A visual frame names a segment the joint tree does not define.
    #[error("segment '{0}' is not part of the model")]
    UnresolvedSegment(String),
}

/// Errors raised by kinematic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KinematicsError {
    #[error("configuration has {got} values but the model has {expected} degrees of freedom")]
    DofMismatch { expected: usize, got: usize },
}
