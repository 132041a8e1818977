//! Data attached to a mesh graph: DOF maps, properties and boundary conditions.

pub mod atlas;
pub mod bc;
pub mod properties;
pub mod sparse;

pub use atlas::DofMap;
pub use bc::{BcKind, BoundaryCondition, LabelQuery};
pub use properties::{PropertyKey, PropertyStore, PropertyView};
