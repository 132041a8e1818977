//! Global assembly over a mixed-dimensional mesh graph.
//!
//! A [`Coupler`] combines one [`Discretization`] applied to every mesh with
//! one [`CouplingOperator`] applied to every interface:
//!
//! 1. freeze the node ordering and compute geometry,
//! 2. number the unknowns: nodes in node order, then edges in edge order,
//! 3. discretize every mesh and place its local system on the diagonal,
//! 4. assemble every interface and place its blocks at the intersections
//!    of the parent, child and edge ranges,
//! 5. sum all triplets into CSR.
//!
//! The traversal order is fixed and triplets are summed in push order, so
//! assembling the same graph and properties twice gives bit-identical
//! results. Any error aborts the whole call; no partial system escapes.

use std::collections::BTreeMap;

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::data::atlas::DofMap;
use crate::data::properties::PropertyStore;
use crate::data::sparse::coo_to_csr;
use crate::debug_invariants::DebugInvariants;
use crate::discretization::{
    CouplingBlocks, CouplingOperator, CouplingSide, Discretization, LocalSystem, Side,
};
use crate::mesh_error::MeshError;
use crate::mesh_graph::MeshGraph;
use crate::topology::handle::{EdgeId, GridKey, MeshId};

/// Options for [`Coupler::assemble`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Discretize meshes on the rayon pool (needs the `rayon` feature;
    /// ignored with a warning otherwise). Output is identical either way.
    pub parallel_discretize: bool,
    /// Drop stored entries that sum to exactly zero.
    pub drop_zeros: bool,
    /// Validate the DOF map before returning the system.
    pub validate_dof_map: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            parallel_discretize: false,
            drop_zeros: false,
            validate_dof_map: true,
        }
    }
}

/// Assembled global system.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSystem {
    pub matrix: CsrMatrix<f64>,
    pub rhs: DVector<f64>,
    pub dof_map: DofMap,
}

/// Assembly engine for one discretization and one coupling law.
#[derive(Clone, Debug, Default)]
pub struct Coupler<D, C> {
    discretization: D,
    coupling: C,
    options: AssemblyOptions,
}

impl<D, C> Coupler<D, C>
where
    D: Discretization,
    C: CouplingOperator,
{
    pub fn new(discretization: D, coupling: C) -> Self {
        Self::with_options(discretization, coupling, AssemblyOptions::default())
    }

    pub fn with_options(discretization: D, coupling: C, options: AssemblyOptions) -> Self {
        Self {
            discretization,
            coupling,
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    #[inline]
    pub fn discretization(&self) -> &D {
        &self.discretization
    }

    #[inline]
    pub fn coupling(&self) -> &C {
        &self.coupling
    }

    /// DOF map of `graph` under this coupler's operators. Freezes the node
    /// ordering.
    pub fn dof_map(&self, graph: &mut MeshGraph) -> Result<DofMap, MeshError> {
        graph.assign_node_ordering();
        self.build_dof_map(graph)
    }

    /// Assemble the global matrix and rhs.
    ///
    /// # Errors
    /// Whatever an operator reports (typically `MissingProperty` or
    /// `Discretization`), `BlockShapeMismatch` / `VectorLengthMismatch` when
    /// an operator returns data that does not fit its DOF range, and
    /// geometry errors from `compute_geometry`.
    pub fn assemble(
        &self,
        graph: &mut MeshGraph,
        store: &PropertyStore,
    ) -> Result<LinearSystem, MeshError> {
        graph.assign_node_ordering();
        graph.compute_geometry()?;
        let graph: &MeshGraph = graph;

        let dofs = self.build_dof_map(graph)?;
        let n = dofs.total_len();
        log::debug!(
            "assembling {} meshes and {} interfaces, {n} unknowns",
            graph.num_nodes(),
            graph.num_edges()
        );
        if graph.num_nodes() == 0 {
            log::warn!("assembling an empty mesh graph");
        }

        let systems = self.discretize_nodes(graph, store, &dofs)?;

        let mut coo = CooMatrix::new(n, n);
        let mut rhs = DVector::zeros(n);
        for (id, local) in graph.nodes().zip(&systems) {
            let offset = dofs.range(id)?.start;
            for (i, j, &v) in local.matrix.triplet_iter() {
                coo.push(offset + i, offset + j, v);
            }
            for (i, &v) in local.rhs.iter().enumerate() {
                rhs[offset + i] += v;
            }
        }

        for edge in graph.edges() {
            let (parent, child) = graph.sorted_nodes_of_edge(edge)?;
            let interface = graph.interface(edge)?;
            if interface.num_mortar_cells() == 0 {
                log::warn!("{edge} ({parent} -> {child}) has no mortar cells");
            }
            let blocks = self.coupling.assemble_coupling(
                interface,
                &coupling_side(graph, store, &systems, &dofs, parent)?,
                &coupling_side(graph, store, &systems, &dofs, child)?,
                &store.edge(edge),
            )?;
            insert_blocks(&mut coo, &mut rhs, &dofs, edge, parent, child, &blocks)?;
            log::trace!("coupled {edge}: {parent} -> {child}");
        }

        if self.options.validate_dof_map {
            dofs.validate_invariants()?;
        }
        let matrix = coo_to_csr(&coo, self.options.drop_zeros);
        log::debug!("assembled {n}x{n} system with {} stored entries", matrix.nnz());
        Ok(LinearSystem {
            matrix,
            rhs,
            dof_map: dofs,
        })
    }

    /// Cut a global vector into per-mesh and per-interface pieces.
    pub fn split(
        &self,
        dof_map: &DofMap,
        x: &DVector<f64>,
    ) -> Result<BTreeMap<GridKey, DVector<f64>>, MeshError> {
        dof_map
            .keys()
            .map(|key| Ok((key, dof_map.restrict(key, x)?)))
            .collect()
    }

    /// Inverse of [`Coupler::split`]: every key of `dof_map` needs a piece of
    /// the right length.
    pub fn merge(
        &self,
        dof_map: &DofMap,
        parts: &BTreeMap<GridKey, DVector<f64>>,
    ) -> Result<DVector<f64>, MeshError> {
        if let Some(stray) = parts.keys().find(|k| !dof_map.contains(**k)) {
            return Err(MeshError::DofMapInvariant(format!("{stray} has no DOF range")));
        }
        let mut x = DVector::zeros(dof_map.total_len());
        for (key, (offset, len)) in dof_map.iter() {
            let part = parts
                .get(&key)
                .ok_or_else(|| MeshError::DofMapInvariant(format!("no values for {key}")))?;
            if part.len() != len {
                return Err(MeshError::VectorLengthMismatch {
                    owner: key,
                    expected: len,
                    found: part.len(),
                });
            }
            x.rows_mut(offset, len).copy_from(part);
        }
        Ok(x)
    }

    fn build_dof_map(&self, graph: &MeshGraph) -> Result<DofMap, MeshError> {
        let mut dofs = DofMap::new();
        for id in graph.nodes() {
            let ndof = self.discretization.ndof(graph.mesh(id)?);
            if ndof == 0 {
                log::warn!("{id} has no unknowns");
            }
            dofs.try_insert(id, ndof)?;
        }
        for edge in graph.edges() {
            dofs.try_insert(edge, self.coupling.ndof(graph.interface(edge)?))?;
        }
        Ok(dofs)
    }

    fn discretize_nodes(
        &self,
        graph: &MeshGraph,
        store: &PropertyStore,
        dofs: &DofMap,
    ) -> Result<Vec<LocalSystem>, MeshError> {
        let ids: Vec<MeshId> = graph.nodes().collect();
        let one = |id: MeshId| -> Result<LocalSystem, MeshError> {
            let local = self.discretization.discretize(graph.mesh(id)?, &store.node(id))?;
            let expected = dofs.range(id)?.len();
            if local.matrix.nrows() != expected || local.matrix.ncols() != expected {
                return Err(MeshError::BlockShapeMismatch {
                    owner: GridKey::Node(id),
                    row: "local",
                    col: "local",
                    expected_rows: expected,
                    expected_cols: expected,
                    rows: local.matrix.nrows(),
                    cols: local.matrix.ncols(),
                });
            }
            if local.rhs.len() != expected {
                return Err(MeshError::VectorLengthMismatch {
                    owner: GridKey::Node(id),
                    expected,
                    found: local.rhs.len(),
                });
            }
            log::trace!("discretized {id}: {expected} unknowns");
            Ok(local)
        };

        if self.options.parallel_discretize {
            #[cfg(feature = "rayon")]
            return ids.par_iter().map(|&id| one(id)).collect();
            #[cfg(not(feature = "rayon"))]
            log::warn!("parallel_discretize requested without the `rayon` feature; running serially");
        }
        ids.iter().map(|&id| one(id)).collect()
    }
}

fn coupling_side<'a>(
    graph: &'a MeshGraph,
    store: &'a PropertyStore,
    systems: &'a [LocalSystem],
    dofs: &DofMap,
    id: MeshId,
) -> Result<CouplingSide<'a>, MeshError> {
    Ok(CouplingSide {
        mesh: graph.mesh(id)?,
        system: &systems[graph.node_number(id)?],
        properties: store.node(id),
        ndof: dofs.range(id)?.len(),
    })
}

fn insert_blocks(
    coo: &mut CooMatrix<f64>,
    rhs: &mut DVector<f64>,
    dofs: &DofMap,
    edge: EdgeId,
    parent: MeshId,
    child: MeshId,
    blocks: &CouplingBlocks,
) -> Result<(), MeshError> {
    let range = |side: Side| match side {
        Side::Parent => dofs.range(parent),
        Side::Child => dofs.range(child),
        Side::Edge => dofs.range(edge),
    };
    for ((row, col), block) in blocks.blocks() {
        let (rows, cols) = (range(row)?, range(col)?);
        if block.nrows() != rows.len() || block.ncols() != cols.len() {
            return Err(MeshError::BlockShapeMismatch {
                owner: GridKey::Edge(edge),
                row: row.name(),
                col: col.name(),
                expected_rows: rows.len(),
                expected_cols: cols.len(),
                rows: block.nrows(),
                cols: block.ncols(),
            });
        }
        for (i, j, &v) in block.triplet_iter() {
            coo.push(rows.start + i, cols.start + j, v);
        }
    }
    for (side, part) in blocks.rhs_parts() {
        let rows = range(side)?;
        if part.len() != rows.len() {
            return Err(MeshError::VectorLengthMismatch {
                owner: GridKey::Edge(edge),
                expected: rows.len(),
                found: part.len(),
            });
        }
        for (i, &v) in part.iter().enumerate() {
            rhs[rows.start + i] += v;
        }
    }
    Ok(())
}
