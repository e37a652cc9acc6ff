//! Error types for tissue construction and stepping.

use thiserror::Error;

use crate::types::EntityKind;

/// Errors raised by the entity arena and the topology operators.
#[derive(Debug, Error)]
pub enum TissueError {
    /// A fixed-capacity arena has no free slot left.
    #[error("{kind} arena is full (capacity {capacity})")]
    CapacityExceeded { kind: EntityKind, capacity: usize },

    /// A structural edit referenced an entity that is not where the caller
    /// claimed it is. Indicates a bug in the caller.
    #[error("invalid topology edit: {0}")]
    InvalidTopologyEdit(String),

    /// A geometric quantity came out non-finite or non-positive where a
    /// positive value is required. The offending entity is deferred.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The seeding input is malformed.
    #[error("seeding error: {0}")]
    Seeding(String),

    /// A graph invariant does not hold.
    #[error("broken invariant: {0}")]
    BrokenInvariant(String),
}

pub type Result<T> = std::result::Result<T, TissueError>;

/// Shorthand for building an [`TissueError::InvalidTopologyEdit`].
pub(crate) fn invalid_edit(msg: impl Into<String>) -> TissueError {
    TissueError::InvalidTopologyEdit(msg.into())
}

/// Shorthand for building a [`TissueError::DegenerateGeometry`].
pub(crate) fn degenerate(msg: impl Into<String>) -> TissueError {
    TissueError::DegenerateGeometry(msg.into())
}
