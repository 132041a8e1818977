//! Mortar interfaces between a mesh and an embedded lower-dimensional mesh.
//!
//! An [`Interface`] lives on one edge of the mesh graph. It owns a
//! [`MortarGrid`] (one copy of the child mesh per side of the parent it
//! touches) and two projections:
//!
//! - `parent_proj`: mortar cells x parent faces,
//! - `child_proj`: mortar cells x child cells.
//!
//! Mortar cell `k` on side `s` sits on child cell `k - s * n_child`.

use std::collections::{BTreeMap, HashMap};

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::data::sparse::csr_row;
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh;

/// The mortar mesh of an interface: one side mesh per side of the parent.
#[derive(Clone, Debug)]
pub struct MortarGrid {
    dim: usize,
    side_meshes: Vec<Mesh>,
}

impl MortarGrid {
    /// Build a mortar grid from its side meshes; all sides share one dimension.
    pub fn new(side_meshes: Vec<Mesh>) -> Result<Self, MeshError> {
        let dim = side_meshes.first().map_or(0, Mesh::dim);
        if side_meshes.iter().any(|m| m.dim() != dim) {
            return Err(MeshError::InterfaceShapeMismatch(
                "mortar side meshes differ in dimension".into(),
            ));
        }
        Ok(Self { dim, side_meshes })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn num_sides(&self) -> usize {
        self.side_meshes.len()
    }

    pub fn side_meshes(&self) -> &[Mesh] {
        &self.side_meshes
    }

    /// Total number of mortar cells over all sides.
    pub fn num_cells(&self) -> usize {
        self.side_meshes.iter().map(Mesh::num_cells).sum()
    }

    /// Cell measures of all sides, side by side.
    pub fn cell_volumes(&self) -> Result<Vec<f64>, MeshError> {
        let mut out = Vec::with_capacity(self.num_cells());
        for side in &self.side_meshes {
            out.extend_from_slice(&side.geometry()?.cell_volumes);
        }
        Ok(out)
    }

    /// Compute geometry on every side mesh. Idempotent.
    pub fn compute_geometry(&mut self) -> Result<(), MeshError> {
        for side in &mut self.side_meshes {
            side.compute_geometry()?;
        }
        Ok(())
    }
}

/// Mortar grid plus projections onto the parent faces and child cells.
#[derive(Clone, Debug)]
pub struct Interface {
    mortar: MortarGrid,
    parent_proj: CsrMatrix<f64>,
    child_proj: CsrMatrix<f64>,
}

impl Interface {
    /// Bundle a mortar grid with its projections.
    ///
    /// # Errors
    /// `InterfaceShapeMismatch` when either projection does not have one
    /// row per mortar cell.
    pub fn new(
        mortar: MortarGrid,
        parent_proj: CsrMatrix<f64>,
        child_proj: CsrMatrix<f64>,
    ) -> Result<Self, MeshError> {
        let n = mortar.num_cells();
        if parent_proj.nrows() != n || child_proj.nrows() != n {
            return Err(MeshError::InterfaceShapeMismatch(format!(
                "mortar grid has {n} cells, projections have {} (parent) and {} (child) rows",
                parent_proj.nrows(),
                child_proj.nrows()
            )));
        }
        Ok(Self {
            mortar,
            parent_proj,
            child_proj,
        })
    }

    /// Build an interface from `(child cell, parent face)` matches.
    ///
    /// Faces matched to the same child cell are sorted ascending and the
    /// `k`-th one goes to mortar side `k`. Every child cell must match the
    /// same number of parent faces (one for a boundary interface, two for
    /// a fracture seen from both sides).
    ///
    /// Each matched parent face must bound exactly one parent cell: faces
    /// inside the parent have to be split before an interface can sit on
    /// them.
    pub fn from_face_cells(
        parent: &Mesh,
        child: &Mesh,
        pairs: &[(usize, usize)],
    ) -> Result<Self, MeshError> {
        let nl = child.num_cells();
        let mut faces_of: Vec<Vec<usize>> = vec![Vec::new(); nl];
        for &(c, f) in pairs {
            if c >= nl || f >= parent.num_faces() {
                return Err(MeshError::InterfaceShapeMismatch(format!(
                    "match (cell {c}, face {f}) out of range for {nl} child cells and {} parent faces",
                    parent.num_faces()
                )));
            }
            let adjacent = parent.cells_of_face(f).count();
            if adjacent != 1 {
                return Err(MeshError::InterfaceShapeMismatch(format!(
                    "parent face {f} of {} bounds {adjacent} cells; an interface face must bound exactly one",
                    parent.id()
                )));
            }
            faces_of[c].push(f);
        }
        for faces in &mut faces_of {
            faces.sort_unstable();
            faces.dedup();
        }
        let num_sides = faces_of.first().map_or(0, Vec::len);
        if let Some(c) = faces_of.iter().position(|f| f.len() != num_sides) {
            return Err(MeshError::InterfaceShapeMismatch(format!(
                "child cell {c} matches {} parent faces, cell 0 matches {num_sides}",
                faces_of[c].len()
            )));
        }
        if num_sides == 0 && nl > 0 {
            return Err(MeshError::InterfaceShapeMismatch(
                "no child cell matches a parent face".into(),
            ));
        }

        let n = num_sides * nl;
        let mut parent_coo = CooMatrix::new(n, parent.num_faces());
        let mut child_coo = CooMatrix::new(n, nl);
        for side in 0..num_sides {
            for (c, faces) in faces_of.iter().enumerate() {
                let k = side * nl + c;
                parent_coo.push(k, faces[side], 1.0);
                child_coo.push(k, c, 1.0);
            }
        }
        let sides = (0..num_sides).map(|_| child.duplicate()).collect();
        Self::new(
            MortarGrid::new(sides)?,
            CsrMatrix::from(&parent_coo),
            CsrMatrix::from(&child_coo),
        )
    }

    /// Build an interface by matching child cells with parent faces that
    /// have the same vertices in the shared (global) vertex numbering.
    pub fn from_shared_vertices(parent: &Mesh, child: &Mesh) -> Result<Self, MeshError> {
        let pairs = shared_vertex_matches(parent, child);
        log::trace!(
            "matched {} parent faces of {} against {} child cells of {}",
            pairs.len(),
            parent.id(),
            child.num_cells(),
            child.id()
        );
        Self::from_face_cells(parent, child, &pairs)
    }

    #[inline]
    pub fn mortar(&self) -> &MortarGrid {
        &self.mortar
    }

    #[inline]
    pub fn num_mortar_cells(&self) -> usize {
        self.mortar.num_cells()
    }

    /// Mortar cells x parent faces.
    #[inline]
    pub fn parent_proj(&self) -> &CsrMatrix<f64> {
        &self.parent_proj
    }

    /// Mortar cells x child cells.
    #[inline]
    pub fn child_proj(&self) -> &CsrMatrix<f64> {
        &self.child_proj
    }

    /// Mortar cells x parent cells: the parent projection composed with the
    /// unsigned face-cell incidence of `parent`.
    pub fn mortar_to_parent_cells(&self, parent: &Mesh) -> Result<CsrMatrix<f64>, MeshError> {
        if self.parent_proj.ncols() != parent.num_faces() {
            return Err(self.column_mismatch("parent", parent.num_faces(), self.parent_proj.ncols()));
        }
        let mut coo = CooMatrix::new(self.num_mortar_cells(), parent.num_cells());
        for k in 0..self.num_mortar_cells() {
            let (faces, weights) = csr_row(&self.parent_proj, k);
            let mut row: BTreeMap<usize, f64> = BTreeMap::new();
            for (&f, &w) in faces.iter().zip(weights) {
                for (c, _) in parent.cells_of_face(f) {
                    *row.entry(c).or_insert(0.0) += w;
                }
            }
            for (c, w) in row {
                coo.push(k, c, w);
            }
        }
        Ok(CsrMatrix::from(&coo))
    }

    /// Check the projection column counts against the endpoint meshes.
    pub fn validate_against(&self, parent: &Mesh, child: &Mesh) -> Result<(), MeshError> {
        if self.parent_proj.ncols() != parent.num_faces() {
            return Err(self.column_mismatch("parent", parent.num_faces(), self.parent_proj.ncols()));
        }
        if self.child_proj.ncols() != child.num_cells() {
            return Err(self.column_mismatch("child", child.num_cells(), self.child_proj.ncols()));
        }
        if self.mortar.num_sides() > 0 && self.mortar.dim() != child.dim() {
            return Err(MeshError::InterfaceShapeMismatch(format!(
                "mortar grid is {}-d, child mesh {} is {}-d",
                self.mortar.dim(),
                child.id(),
                child.dim()
            )));
        }
        Ok(())
    }

    /// Compute mortar geometry. Idempotent.
    pub fn compute_geometry(&mut self) -> Result<(), MeshError> {
        self.mortar.compute_geometry()
    }

    fn column_mismatch(&self, side: &str, expected: usize, found: usize) -> MeshError {
        MeshError::InterfaceShapeMismatch(format!(
            "{side} projection has {found} columns, {side} mesh has {expected} entities"
        ))
    }
}

/// `(child cell, parent face)` pairs whose vertex sets agree in the shared
/// vertex numbering, ordered by child cell then parent face.
pub fn shared_vertex_matches(parent: &Mesh, child: &Mesh) -> Vec<(usize, usize)> {
    let pg = parent.global_point_ind();
    let mut by_vertices: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
    for f in 0..parent.num_faces() {
        let mut key: Vec<usize> = parent.face_nodes(f).iter().map(|&v| pg[v]).collect();
        key.sort_unstable();
        by_vertices.entry(key).or_default().push(f);
    }
    let cg = child.global_point_ind();
    let mut pairs = Vec::new();
    for c in 0..child.num_cells() {
        let mut key: Vec<usize> = child.cell_nodes(c).iter().map(|&v| cg[v]).collect();
        key.sort_unstable();
        if let Some(faces) = by_vertices.get(&key) {
            pairs.extend(faces.iter().map(|&f| (c, f)));
        }
    }
    pairs
}
