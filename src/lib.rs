#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-bucket
//!
//! mesh-bucket models fractured domains as a hierarchy of meshes of
//! decreasing dimension (a 3-d matrix cut by 2-d fractures meeting in 1-d
//! lines and 0-d points) and assembles one global sparse system over the
//! whole hierarchy.
//!
//! ## Features
//! - Single-dimension meshes with signed face-cell incidence and cached geometry
//! - A mesh graph whose edges carry mortar interfaces between adjacent dimensions
//! - Typed per-mesh and per-interface property storage
//! - A generic [`Coupler`](algs::assembly::Coupler) that combines any
//!   discretization with any coupling law into one CSR matrix and rhs
//! - Reference upwind transport, mass matrices and source terms
//!
//! ## Determinism
//!
//! Node ordering is frozen once per graph (descending dimension, then
//! insertion order) and drives DOF numbering and traversal, so assembling
//! the same inputs twice gives bit-identical output.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mesh-bucket = "0.1"
//! # Optional features:
//! # features = ["rayon", "check-invariants"]
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod discretization;
pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod mesh_generation;
pub mod mesh_graph;
pub mod physics;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::assembly::{AssemblyOptions, Coupler, LinearSystem};
    pub use crate::algs::meshgen::{CartGridOptions, cart_grid};
    pub use crate::data::atlas::DofMap;
    pub use crate::data::bc::{BcKind, BoundaryCondition};
    pub use crate::data::properties::{PropertyKey, PropertyStore, PropertyView};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::discretization::{
        CouplingBlocks, CouplingOperator, CouplingSide, Discretization, LocalSystem, Side,
    };
    pub use crate::mesh_error::MeshError;
    pub use crate::mesh_graph::MeshGraph;
    pub use crate::physics::{InvMassMatrix, Integral, MassMatrix, NoCoupling, Upwind, UpwindCoupling};
    pub use crate::topology::handle::{EdgeId, GridKey, MeshId};
    pub use crate::topology::labels::LabelSet;
    pub use crate::topology::mesh::Mesh;
    pub use crate::topology::mortar::{Interface, MortarGrid};
}
