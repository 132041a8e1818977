//! Mesh topology: single-dimension meshes, handles, labels and mortar interfaces.
//!
//! - [`mesh::Mesh`] stores vertices, face-vertex lists and the signed
//!   face-cell incidence of one mesh together with its cached geometry.
//! - [`handle`] defines the `MeshId`, `EdgeId` and `GridKey` handles.
//! - [`mortar::Interface`] links a mesh to an embedded mesh one dimension lower.

pub mod connectivity;
pub mod handle;
pub mod labels;
pub mod mesh;
pub mod mortar;

pub use handle::{EdgeId, GridKey, MeshId};
pub use mesh::{Mesh, MeshGeometry};
pub use mortar::{Interface, MortarGrid};
