//! MeshError: Unified error type for mesh-bucket public APIs
//!
//! Every fallible operation in the crate returns this error. Variants that
//! concern a particular mesh or interface carry its handle so callers can
//! tell which part of the mixed-dimensional graph caused a failure.

use crate::topology::handle::{EdgeId, GridKey, MeshId};
use thiserror::Error;

/// Unified error type for mesh-bucket operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A mesh handle was registered twice in the same graph.
    #[error("mesh {0} is already a node of this graph")]
    DuplicateNode(MeshId),
    /// A mesh handle was referenced but never registered.
    #[error("mesh {0} is not a node of this graph")]
    UnknownNode(MeshId),
    /// An edge handle was referenced but never registered.
    #[error("edge {0} is not an edge of this graph")]
    UnknownEdge(EdgeId),
    /// Edge endpoints must differ by exactly one dimension (parent = child + 1).
    #[error("edge {parent} -> {child}: parent dimension {parent_dim} is not child dimension {child_dim} + 1")]
    DimensionMismatch {
        parent: MeshId,
        child: MeshId,
        parent_dim: usize,
        child_dim: usize,
    },
    /// An edge was requested from a mesh to itself.
    #[error("edge {0} -> {0} would be a self-loop")]
    SelfLoop(MeshId),
    /// The same (parent, child) pair was connected twice.
    #[error("edge {parent} -> {child} already exists")]
    DuplicateEdge { parent: MeshId, child: MeshId },
    /// The node ordering is frozen; the graph can no longer take new nodes.
    #[error("node ordering is already assigned; cannot add mesh {0}")]
    AlreadyOrdered(MeshId),
    /// A property that an operator requires was never set for this handle.
    #[error("missing property `{key}` on {owner}")]
    MissingProperty { owner: GridKey, key: &'static str },
    /// A property exists but holds a value of another type.
    #[error("property `{key}` on {owner} is not of type {expected}")]
    PropertyTypeMismatch {
        owner: GridKey,
        key: &'static str,
        expected: &'static str,
    },
    /// Local physics could not be discretized (singular data, wrong lengths, ...).
    #[error("discretization failed on {owner}: {message}")]
    Discretization { owner: GridKey, message: String },
    /// Interface projections do not match the mortar grid or an endpoint mesh.
    #[error("interface shape mismatch: {0}")]
    InterfaceShapeMismatch(String),
    /// A coupling block does not fit the DOF range it is inserted into.
    #[error("block ({row}, {col}) on {owner}: expected {expected_rows}x{expected_cols}, found {rows}x{cols}")]
    BlockShapeMismatch {
        owner: GridKey,
        row: &'static str,
        col: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    /// A vector does not match the length implied by a DOF map.
    #[error("vector length mismatch for {owner}: expected {expected}, found {found}")]
    VectorLengthMismatch {
        owner: GridKey,
        expected: usize,
        found: usize,
    },
    /// A DOF map entry was inserted twice.
    #[error("DOF map already has an entry for {0}")]
    DuplicateDofEntry(GridKey),
    /// DOF map invariants are violated.
    #[error("DOF map invariant violated: {0}")]
    DofMapInvariant(String),
    /// Mesh connectivity or geometry is malformed or unsupported.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Geometry was requested before `compute_geometry` ran.
    #[error("geometry of mesh {0} has not been computed")]
    GeometryNotComputed(MeshId),
}

impl MeshError {
    /// Shorthand for a [`MeshError::Discretization`] on `owner`.
    pub fn discretization(owner: impl Into<GridKey>, message: impl Into<String>) -> Self {
        MeshError::Discretization {
            owner: owner.into(),
            message: message.into(),
        }
    }
}
