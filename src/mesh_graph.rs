//! `MeshGraph`: the mixed-dimensional hierarchy of meshes.
//!
//! Nodes are meshes; a directed edge links a parent mesh of dimension `d`
//! to a child mesh of dimension `d - 1` embedded in it, and owns the
//! [`Interface`] between the two.
//!
//! # Ordering
//!
//! Until [`MeshGraph::assign_node_ordering`] runs, nodes iterate in insertion
//! order. Afterwards the order is frozen: descending dimension, ties broken by
//! insertion order. Edges always iterate grouped by parent in node order, then
//! by child in node order. DOF numbering in the assembly follows both orders.
//!
//! # Invariants
//!
//! - every edge joins meshes whose dimensions differ by exactly one,
//! - no self-loops and at most one edge per (parent, child) pair,
//! - every interface fits its endpoint meshes,
//! - once frozen, the ordering is a permutation of the registered nodes.

use std::collections::{BTreeMap, HashMap};

use itertools::{Either, Itertools};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::handle::{EdgeId, MeshId};
use crate::topology::labels::LabelSet;
use crate::topology::mesh::Mesh;
use crate::topology::mortar::Interface;

#[derive(Clone, Debug)]
struct EdgeRecord {
    parent: MeshId,
    child: MeshId,
    interface: Interface,
}

/// Directed graph of meshes of adjacent dimension.
#[derive(Clone, Debug, Default)]
pub struct MeshGraph {
    meshes: Vec<Mesh>,
    slot: HashMap<MeshId, usize>,
    edges: Vec<EdgeRecord>,
    edge_lookup: HashMap<(MeshId, MeshId), EdgeId>,
    /// Frozen node order and the position of each node in it.
    order: Option<(Vec<MeshId>, HashMap<MeshId, usize>)>,
}

impl MeshGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mesh` as a node and return its handle.
    ///
    /// # Errors
    /// - `AlreadyOrdered` once the node ordering is frozen,
    /// - `DuplicateNode` if a mesh with the same handle is registered.
    pub fn add_node(&mut self, mesh: Mesh) -> Result<MeshId, MeshError> {
        let id = mesh.id();
        if self.order.is_some() {
            return Err(MeshError::AlreadyOrdered(id));
        }
        if self.slot.contains_key(&id) {
            return Err(MeshError::DuplicateNode(id));
        }
        log::trace!("added {id} ({}-d) as node {}", mesh.dim(), self.meshes.len());
        self.slot.insert(id, self.meshes.len());
        self.meshes.push(mesh);
        Ok(id)
    }

    /// Connect `parent` to the embedded `child` through `interface`.
    ///
    /// # Errors
    /// `SelfLoop`, `UnknownNode`, `DimensionMismatch` unless
    /// `dim(parent) == dim(child) + 1`, `DuplicateEdge`, or
    /// `InterfaceShapeMismatch` when the projections do not fit the meshes.
    pub fn add_edge(
        &mut self,
        parent: MeshId,
        child: MeshId,
        interface: Interface,
    ) -> Result<EdgeId, MeshError> {
        if parent == child {
            return Err(MeshError::SelfLoop(parent));
        }
        let (p, c) = (self.mesh(parent)?, self.mesh(child)?);
        if p.dim() != c.dim() + 1 {
            return Err(MeshError::DimensionMismatch {
                parent,
                child,
                parent_dim: p.dim(),
                child_dim: c.dim(),
            });
        }
        if self.edge_lookup.contains_key(&(parent, child)) {
            return Err(MeshError::DuplicateEdge { parent, child });
        }
        interface.validate_against(p, c)?;

        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(EdgeRecord {
            parent,
            child,
            interface,
        });
        self.edge_lookup.insert((parent, child), id);
        log::trace!("added {id}: {parent} -> {child}");
        Ok(id)
    }

    /// Freeze the node ordering (descending dimension, then insertion order)
    /// and return it. Later calls return the frozen order unchanged.
    pub fn assign_node_ordering(&mut self) -> &[MeshId] {
        if self.order.is_none() {
            let ids: Vec<MeshId> = self
                .meshes
                .iter()
                .enumerate()
                .sorted_by_key(|(i, m)| (std::cmp::Reverse(m.dim()), *i))
                .map(|(_, m)| m.id())
                .collect();
            let rank = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
            log::debug!("froze node ordering over {} meshes", ids.len());
            self.order = Some((ids, rank));
        }
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        self.order.as_ref().map_or(&[], |(ids, _)| ids.as_slice())
    }

    /// Whether the node ordering has been frozen.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.order.is_some()
    }

    /// Compute geometry on every mesh and interface. Idempotent.
    pub fn compute_geometry(&mut self) -> Result<(), MeshError> {
        for mesh in &mut self.meshes {
            mesh.compute_geometry()?;
        }
        for edge in &mut self.edges {
            edge.interface.compute_geometry()?;
        }
        Ok(())
    }

    /// Node handles in frozen order (insertion order before freezing).
    pub fn nodes(&self) -> impl Iterator<Item = MeshId> + '_ {
        match &self.order {
            Some((ids, _)) => Either::Left(ids.iter().copied()),
            None => Either::Right(self.meshes.iter().map(Mesh::id)),
        }
    }

    /// Edge handles grouped by parent in node order, then by child in node order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len())
            .map(EdgeId::from_index)
            .sorted_by_key(|&e| {
                let rec = &self.edges[e.index()];
                (self.rank(rec.parent), self.rank(rec.child))
            })
    }

    /// `(parent, child)` handles of `edge`: the higher-dimensional mesh first.
    pub fn sorted_nodes_of_edge(&self, edge: EdgeId) -> Result<(MeshId, MeshId), MeshError> {
        let rec = self.record(edge)?;
        Ok((rec.parent, rec.child))
    }

    /// Edge joining `parent` and `child`, if any.
    pub fn edge_between(&self, parent: MeshId, child: MeshId) -> Option<EdgeId> {
        self.edge_lookup.get(&(parent, child)).copied()
    }

    pub fn mesh(&self, id: MeshId) -> Result<&Mesh, MeshError> {
        self.slot
            .get(&id)
            .map(|&i| &self.meshes[i])
            .ok_or(MeshError::UnknownNode(id))
    }

    /// Face labels of a registered mesh, open for relabelling. The mesh
    /// itself stays read-only so its id and dimension cannot change.
    pub fn face_labels_mut(&mut self, id: MeshId) -> Result<&mut LabelSet, MeshError> {
        match self.slot.get(&id) {
            Some(&i) => Ok(self.meshes[i].face_labels_mut()),
            None => Err(MeshError::UnknownNode(id)),
        }
    }

    pub fn interface(&self, edge: EdgeId) -> Result<&Interface, MeshError> {
        Ok(&self.record(edge)?.interface)
    }

    /// Meshes of dimension `dim`, in node order.
    pub fn meshes_of_dimension(&self, dim: usize) -> Vec<MeshId> {
        self.nodes()
            .filter(|id| self.slot.get(id).is_some_and(|&i| self.meshes[i].dim() == dim))
            .collect()
    }

    pub fn dim_max(&self) -> Option<usize> {
        self.meshes.iter().map(Mesh::dim).max()
    }

    pub fn dim_min(&self) -> Option<usize> {
        self.meshes.iter().map(Mesh::dim).min()
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of meshes per dimension.
    pub fn size_by_dimension(&self) -> BTreeMap<usize, usize> {
        self.meshes.iter().map(Mesh::dim).counts().into_iter().collect()
    }

    /// Edges touching `id` as parent or child, in edge order.
    pub fn edges_of_node(&self, id: MeshId) -> Result<Vec<EdgeId>, MeshError> {
        self.mesh(id)?;
        Ok(self
            .edges()
            .filter(|e| {
                let rec = &self.edges[e.index()];
                rec.parent == id || rec.child == id
            })
            .collect())
    }

    /// Position of `id` in [`MeshGraph::nodes`].
    pub fn node_number(&self, id: MeshId) -> Result<usize, MeshError> {
        match &self.order {
            Some((_, rank)) => rank.get(&id).copied().ok_or(MeshError::UnknownNode(id)),
            None => self.slot.get(&id).copied().ok_or(MeshError::UnknownNode(id)),
        }
    }

    fn rank(&self, id: MeshId) -> usize {
        self.node_number(id).unwrap_or(usize::MAX)
    }

    fn record(&self, edge: EdgeId) -> Result<&EdgeRecord, MeshError> {
        self.edges
            .get(edge.index())
            .ok_or(MeshError::UnknownEdge(edge))
    }
}

impl DebugInvariants for MeshGraph {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "MeshGraph");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        for (i, mesh) in self.meshes.iter().enumerate() {
            if self.slot.get(&mesh.id()) != Some(&i) {
                return Err(MeshError::UnknownNode(mesh.id()));
            }
        }
        for rec in &self.edges {
            if rec.parent == rec.child {
                return Err(MeshError::SelfLoop(rec.parent));
            }
            let (p, c) = (self.mesh(rec.parent)?, self.mesh(rec.child)?);
            if p.dim() != c.dim() + 1 {
                return Err(MeshError::DimensionMismatch {
                    parent: rec.parent,
                    child: rec.child,
                    parent_dim: p.dim(),
                    child_dim: c.dim(),
                });
            }
            rec.interface.validate_against(p, c)?;
        }
        if let Some((ids, rank)) = &self.order {
            if ids.len() != self.meshes.len() || rank.len() != ids.len() {
                return Err(MeshError::InvalidGeometry(format!(
                    "frozen ordering lists {} of {} meshes",
                    ids.len(),
                    self.meshes.len()
                )));
            }
            for pair in ids.windows(2) {
                if self.mesh(pair[0])?.dim() < self.mesh(pair[1])?.dim() {
                    return Err(MeshError::InvalidGeometry(format!(
                        "frozen ordering puts {} before higher-dimensional {}",
                        pair[0], pair[1]
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_generation::{line_grid, point_grid};

    #[test]
    fn ordering_puts_higher_dimensions_first() {
        let mut g = MeshGraph::new();
        let p = g.add_node(point_grid([0.5, 0.0, 0.0]).unwrap()).unwrap();
        let l = g
            .add_node(line_grid(&[[0.0; 3], [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap())
            .unwrap();
        assert_eq!(g.nodes().collect::<Vec<_>>(), vec![p, l]);
        assert_eq!(g.assign_node_ordering().to_vec(), vec![l, p]);
        assert_eq!(g.node_number(p).unwrap(), 1);
        g.validate_invariants().unwrap();
    }
}
