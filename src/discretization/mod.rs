//! Contracts for physics plugged into the assembly.
//!
//! A [`Discretization`] turns one mesh and its properties into a square
//! local system. A [`CouplingOperator`] turns one interface, the local data
//! of both endpoint meshes and the edge properties into coupling blocks.
//! Both are pure functions of their inputs: the same inputs must give the
//! same output, bit for bit.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::data::properties::PropertyView;
use crate::mesh_error::MeshError;
use crate::topology::handle::GridKey;
use crate::topology::mesh::Mesh;
use crate::topology::mortar::Interface;

/// Square local matrix and right-hand side of one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalSystem {
    pub matrix: CsrMatrix<f64>,
    pub rhs: DVector<f64>,
}

impl LocalSystem {
    /// Bundle a local matrix and rhs.
    ///
    /// # Errors
    /// `BlockShapeMismatch` if the matrix is not square, or
    /// `VectorLengthMismatch` if the rhs does not match it.
    pub fn new(
        owner: impl Into<GridKey>,
        matrix: CsrMatrix<f64>,
        rhs: DVector<f64>,
    ) -> Result<Self, MeshError> {
        let owner = owner.into();
        let n = matrix.nrows();
        if matrix.ncols() != n {
            return Err(MeshError::BlockShapeMismatch {
                owner,
                row: "local",
                col: "local",
                expected_rows: n,
                expected_cols: n,
                rows: n,
                cols: matrix.ncols(),
            });
        }
        if rhs.len() != n {
            return Err(MeshError::VectorLengthMismatch {
                owner,
                expected: n,
                found: rhs.len(),
            });
        }
        Ok(Self { matrix, rhs })
    }

    /// Zero matrix and rhs of size `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            matrix: CsrMatrix::zeros(n, n),
            rhs: DVector::zeros(n),
        }
    }

    #[inline]
    pub fn ndof(&self) -> usize {
        self.rhs.len()
    }
}

/// Physics on a single mesh.
pub trait Discretization: Send + Sync {
    /// Number of unknowns on `mesh`.
    fn ndof(&self, mesh: &Mesh) -> usize;

    /// Local matrix (`ndof x ndof`) and rhs (`ndof`) for `mesh`.
    fn discretize(&self, mesh: &Mesh, properties: &PropertyView<'_>) -> Result<LocalSystem, MeshError>;
}

/// Which unknowns a coupling block row or column refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The higher-dimensional mesh of the edge.
    Parent,
    /// The lower-dimensional mesh of the edge.
    Child,
    /// Unknowns owned by the edge itself (e.g. mortar fluxes).
    Edge,
}

impl Side {
    pub const fn name(self) -> &'static str {
        match self {
            Side::Parent => "parent",
            Side::Child => "child",
            Side::Edge => "edge",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coupling contributions of one interface, in the endpoint meshes' own
/// cell indexing (and the edge's own unknown indexing).
#[derive(Clone, Debug)]
pub struct CouplingBlocks {
    owner: GridKey,
    sizes: [usize; 3],
    blocks: BTreeMap<(Side, Side), CooMatrix<f64>>,
    rhs: BTreeMap<Side, DVector<f64>>,
}

impl CouplingBlocks {
    /// Empty blocks for an edge with the given unknown counts per side.
    pub fn new(owner: impl Into<GridKey>, parent: usize, child: usize, edge: usize) -> Self {
        Self {
            owner: owner.into(),
            sizes: [parent, child, edge],
            blocks: BTreeMap::new(),
            rhs: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn owner(&self) -> GridKey {
        self.owner
    }

    /// Unknown count of `side`.
    #[inline]
    pub fn size(&self, side: Side) -> usize {
        self.sizes[side as usize]
    }

    /// Add `value` at `(i, j)` of block `(row, col)`.
    ///
    /// # Errors
    /// `BlockShapeMismatch` if `(i, j)` is outside the block.
    pub fn add(&mut self, row: Side, col: Side, i: usize, j: usize, value: f64) -> Result<(), MeshError> {
        let (nr, nc) = (self.size(row), self.size(col));
        if i >= nr || j >= nc {
            return Err(MeshError::BlockShapeMismatch {
                owner: self.owner,
                row: row.name(),
                col: col.name(),
                expected_rows: nr,
                expected_cols: nc,
                rows: i + 1,
                cols: j + 1,
            });
        }
        self.blocks
            .entry((row, col))
            .or_insert_with(|| CooMatrix::new(nr, nc))
            .push(i, j, value);
        Ok(())
    }

    /// Add `value` to entry `i` of the rhs of `side`.
    pub fn add_rhs(&mut self, side: Side, i: usize, value: f64) -> Result<(), MeshError> {
        let n = self.size(side);
        if i >= n {
            return Err(MeshError::VectorLengthMismatch {
                owner: self.owner,
                expected: n,
                found: i + 1,
            });
        }
        self.rhs.entry(side).or_insert_with(|| DVector::zeros(n))[i] += value;
        Ok(())
    }

    /// Replace block `(row, col)` with a caller-built matrix; its shape is
    /// checked when the blocks are inserted into the global system.
    pub fn set_block(&mut self, row: Side, col: Side, block: CooMatrix<f64>) {
        self.blocks.insert((row, col), block);
    }

    /// Replace the rhs of `side`; its length is checked on insertion.
    pub fn set_rhs(&mut self, side: Side, rhs: DVector<f64>) {
        self.rhs.insert(side, rhs);
    }

    pub fn block(&self, row: Side, col: Side) -> Option<&CooMatrix<f64>> {
        self.blocks.get(&(row, col))
    }

    pub fn rhs(&self, side: Side) -> Option<&DVector<f64>> {
        self.rhs.get(&side)
    }

    /// Non-empty blocks in `(row, col)` order.
    pub fn blocks(&self) -> impl Iterator<Item = ((Side, Side), &CooMatrix<f64>)> + '_ {
        self.blocks.iter().map(|(&k, v)| (k, v))
    }

    /// Rhs contributions in side order.
    pub fn rhs_parts(&self) -> impl Iterator<Item = (Side, &DVector<f64>)> + '_ {
        self.rhs.iter().map(|(&k, v)| (k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.values().all(|b| b.nnz() == 0) && self.rhs.is_empty()
    }
}

/// One endpoint of an interface as seen by a coupling operator.
#[derive(Clone, Copy, Debug)]
pub struct CouplingSide<'a> {
    pub mesh: &'a Mesh,
    /// The mesh's local system from the node pass.
    pub system: &'a LocalSystem,
    pub properties: PropertyView<'a>,
    /// Unknowns of this mesh in the global system.
    pub ndof: usize,
}

/// Physics across one interface.
pub trait CouplingOperator: Send + Sync {
    /// Unknowns owned by the interface itself; zero for algebraic couplings.
    fn ndof(&self, interface: &Interface) -> usize;

    /// Coupling blocks for one edge. `edge.owner()` names the edge.
    fn assemble_coupling(
        &self,
        interface: &Interface,
        parent: &CouplingSide<'_>,
        child: &CouplingSide<'_>,
        edge: &PropertyView<'_>,
    ) -> Result<CouplingBlocks, MeshError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::handle::EdgeId;

    #[test]
    fn out_of_range_entries_are_rejected() {
        let mut blocks = CouplingBlocks::new(EdgeId::from_index(0), 2, 1, 0);
        blocks.add(Side::Parent, Side::Child, 1, 0, 1.0).unwrap();
        assert!(matches!(
            blocks.add(Side::Child, Side::Parent, 1, 0, 1.0),
            Err(MeshError::BlockShapeMismatch { row: "child", col: "parent", .. })
        ));
        assert!(blocks.add_rhs(Side::Edge, 0, 1.0).is_err());
        assert_eq!(blocks.block(Side::Parent, Side::Child).map(|b| b.nnz()), Some(1));
        assert!(!blocks.is_empty());
    }

    #[test]
    fn local_system_shape_is_checked() {
        let owner = EdgeId::from_index(3);
        let err = LocalSystem::new(owner, CsrMatrix::zeros(2, 2), DVector::zeros(3)).unwrap_err();
        assert!(matches!(err, MeshError::VectorLengthMismatch { expected: 2, found: 3, .. }));
        assert_eq!(LocalSystem::zeros(4).ndof(), 4);
    }
}
