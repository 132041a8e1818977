//! Strong, zero-cost handles for meshes and interfaces.
//!
//! A [`MeshId`] wraps a nonzero `u64` so that 0 stays reserved as an invalid
//! value. Every [`Mesh`](crate::topology::mesh::Mesh) draws a fresh id when
//! it is constructed, so two meshes never share a handle unless one is a
//! clone of the other. [`EdgeId`] indexes the edges of one
//! [`MeshGraph`](crate::mesh_graph::MeshGraph), and [`GridKey`] names either
//! kind of graph entity for DOF maps, property stores and error messages.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::mesh_error::MeshError;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of a single-dimension mesh.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct MeshId(NonZeroU64);

impl MeshId {
    /// Creates a `MeshId` from a raw value.
    ///
    /// # Errors
    /// Returns `InvalidGeometry` if `raw == 0`.
    #[inline]
    pub fn new(raw: u64) -> Result<Self, MeshError> {
        NonZeroU64::new(raw)
            .map(MeshId)
            .ok_or_else(|| MeshError::InvalidGeometry("MeshId must be non-zero".into()))
    }

    /// Draws a process-unique handle.
    pub(crate) fn fresh() -> Self {
        let raw = NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed);
        // the counter starts at 1 and would need 2^64 meshes to wrap
        MeshId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MAX))
    }

    /// Returns the raw `u64`.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MeshId").field(&self.get()).finish()
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.get())
    }
}

/// Handle of an edge (interface) inside one mesh graph.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        EdgeId(index as u32)
    }

    /// Position of the edge in its graph's insertion order.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EdgeId").field(&self.0).finish()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// Either a node or an edge of a mesh graph.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum GridKey {
    Node(MeshId),
    Edge(EdgeId),
}

impl GridKey {
    /// The mesh handle, if this key names a node.
    pub fn as_node(self) -> Option<MeshId> {
        match self {
            GridKey::Node(id) => Some(id),
            GridKey::Edge(_) => None,
        }
    }

    /// The edge handle, if this key names an edge.
    pub fn as_edge(self) -> Option<EdgeId> {
        match self {
            GridKey::Edge(id) => Some(id),
            GridKey::Node(_) => None,
        }
    }
}

impl From<MeshId> for GridKey {
    fn from(id: MeshId) -> Self {
        GridKey::Node(id)
    }
}

impl From<EdgeId> for GridKey {
    fn from(id: EdgeId) -> Self {
        GridKey::Edge(id)
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridKey::Node(id) => write!(f, "node {id}"),
            GridKey::Edge(id) => write!(f, "edge {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(MeshId::new(0).is_err());
        assert_eq!(MeshId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let a = MeshId::fresh();
        let b = MeshId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn grid_key_display_names_kind() {
        let node = GridKey::from(MeshId::new(3).unwrap());
        let edge = GridKey::from(EdgeId::from_index(2));
        assert_eq!(node.to_string(), "node mesh#3");
        assert_eq!(edge.to_string(), "edge edge#2");
        assert_eq!(edge.as_edge().map(EdgeId::index), Some(2));
        assert!(node.as_edge().is_none());
    }
}
