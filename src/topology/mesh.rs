//! `Mesh`: a single-dimension computational mesh.
//!
//! A mesh of dimension `d` has cells of dimension `d` and faces of dimension
//! `d - 1`. Connectivity is stored as
//! - `face_nodes`: ordered vertex list per face (cyclic for polygonal faces),
//! - `cell_faces`: a signed `faces x cells` incidence matrix where `+1` means
//!   the face normal points out of the cell.
//!
//! Zero-dimensional meshes have no faces; cell `c` sits at vertex `c`.
//!
//! Geometry (areas, normals, centers, volumes) is computed on demand by
//! [`Mesh::compute_geometry`] and cached; it is either fully present or absent.

use std::collections::HashSet;

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::data::sparse::csr_row;
use crate::geometry::metrics::compute_mesh_geometry;
use crate::mesh_error::MeshError;
use crate::topology::connectivity::Connectivity;
use crate::topology::handle::MeshId;
use crate::topology::labels::{DOMAIN_BOUNDARY, LabelSet};

/// Cached geometric quantities of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGeometry {
    /// Face measure (length, area; 1 for point faces).
    pub face_areas: Vec<f64>,
    /// Face normals scaled by the face area.
    pub face_normals: Vec<[f64; 3]>,
    /// Face centroids.
    pub face_centers: Vec<[f64; 3]>,
    /// Cell measure (1 for point cells).
    pub cell_volumes: Vec<f64>,
    /// Cell centroids.
    pub cell_centers: Vec<[f64; 3]>,
}

/// Single-dimension mesh with signed cell-face incidence.
#[derive(Clone, Debug)]
pub struct Mesh {
    id: MeshId,
    dim: usize,
    name: String,
    nodes: Vec<[f64; 3]>,
    face_nodes: Connectivity,
    /// faces x cells
    cell_faces: CsrMatrix<i8>,
    /// cells x faces (transpose of `cell_faces`)
    faces_of_cell: CsrMatrix<i8>,
    num_cells: usize,
    face_labels: LabelSet,
    global_point_ind: Vec<usize>,
    geometry: Option<MeshGeometry>,
}

impl Mesh {
    /// Build a mesh from vertices, face-vertex lists and signed `(face, cell, sign)` triplets.
    ///
    /// Faces with exactly one adjacent cell are labelled as domain boundary.
    ///
    /// # Errors
    /// Returns `InvalidGeometry` when the dimension exceeds 3, an index is out
    /// of range, a sign is not ±1, a face has no or more than two cells, a
    /// face has the wrong vertex count for the dimension, or a `(face, cell)`
    /// pair repeats.
    pub fn new(
        dim: usize,
        nodes: Vec<[f64; 3]>,
        face_nodes: Connectivity,
        cell_faces: &[(usize, usize, i8)],
        num_cells: usize,
        name: impl Into<String>,
    ) -> Result<Self, MeshError> {
        if dim > 3 {
            return Err(invalid(format!("dimension {dim} exceeds 3")));
        }
        let num_faces = face_nodes.num_rows();
        if let Some(max) = face_nodes.max_index() {
            if max >= nodes.len() {
                return Err(invalid(format!(
                    "face references vertex {max}, mesh has {} vertices",
                    nodes.len()
                )));
            }
        }
        if dim == 0 {
            if num_faces != 0 || !cell_faces.is_empty() {
                return Err(invalid("0-d meshes have no faces"));
            }
            if nodes.len() != num_cells {
                return Err(invalid(format!(
                    "0-d mesh needs one vertex per cell, found {} vertices for {num_cells} cells",
                    nodes.len()
                )));
            }
        }
        for (f, row) in face_nodes.rows().enumerate() {
            let ok = match dim {
                1 => row.len() == 1,
                2 => row.len() == 2,
                3 => row.len() >= 3,
                _ => true,
            };
            if !ok {
                return Err(invalid(format!(
                    "face {f} has {} vertices, not valid for a {dim}-d mesh",
                    row.len()
                )));
            }
        }

        let mut seen = HashSet::with_capacity(cell_faces.len());
        let mut coo = CooMatrix::new(num_faces, num_cells);
        let mut cells_per_face = vec![0usize; num_faces];
        for &(f, c, s) in cell_faces {
            if f >= num_faces || c >= num_cells {
                return Err(invalid(format!(
                    "incidence ({f}, {c}) out of range for {num_faces} faces x {num_cells} cells"
                )));
            }
            if s != 1 && s != -1 {
                return Err(invalid(format!("incidence ({f}, {c}) has sign {s}")));
            }
            if !seen.insert((f, c)) {
                return Err(invalid(format!("incidence ({f}, {c}) given twice")));
            }
            cells_per_face[f] += 1;
            coo.push(f, c, s);
        }
        if let Some(f) = cells_per_face.iter().position(|&n| n == 0 || n > 2) {
            return Err(invalid(format!(
                "face {f} has {} adjacent cells",
                cells_per_face[f]
            )));
        }
        let cell_faces = CsrMatrix::from(&coo);
        let faces_of_cell = cell_faces.transpose();

        let mut face_labels = LabelSet::new();
        for (f, &n) in cells_per_face.iter().enumerate() {
            if n == 1 {
                face_labels.set_label(f, DOMAIN_BOUNDARY, 1);
            }
        }
        let global_point_ind = (0..nodes.len()).collect();

        Ok(Self {
            id: MeshId::fresh(),
            dim,
            name: name.into(),
            nodes,
            face_nodes,
            cell_faces,
            faces_of_cell,
            num_cells,
            face_labels,
            global_point_ind,
            geometry: None,
        })
    }

    /// A copy of this mesh under a fresh handle.
    pub fn duplicate(&self) -> Self {
        let mut out = self.clone();
        out.id = MeshId::fresh();
        out
    }

    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_nodes.num_rows()
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Vertex coordinates (always three components).
    #[inline]
    pub fn nodes(&self) -> &[[f64; 3]] {
        &self.nodes
    }

    /// Ordered vertices of face `f`.
    #[inline]
    pub fn face_nodes(&self, f: usize) -> &[usize] {
        self.face_nodes.row(f)
    }

    /// Face-vertex connectivity for all faces.
    #[inline]
    pub fn face_node_connectivity(&self) -> &Connectivity {
        &self.face_nodes
    }

    /// Signed `faces x cells` incidence.
    #[inline]
    pub fn cell_faces(&self) -> &CsrMatrix<i8> {
        &self.cell_faces
    }

    /// `(cell, sign)` pairs adjacent to face `f`, by ascending cell index.
    pub fn cells_of_face(&self, f: usize) -> impl Iterator<Item = (usize, i8)> + '_ {
        let (cols, vals) = csr_row(&self.cell_faces, f);
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// `(face, sign)` pairs bounding cell `c`, by ascending face index.
    pub fn faces_of_cell(&self, c: usize) -> impl Iterator<Item = (usize, i8)> + '_ {
        let (cols, vals) = csr_row(&self.faces_of_cell, c);
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// All `(face, cell, sign)` triplets in face-major order.
    pub fn cell_face_triplets(&self) -> Vec<(usize, usize, i8)> {
        self.cell_faces
            .triplet_iter()
            .map(|(f, c, &s)| (f, c, s))
            .collect()
    }

    /// Sorted, deduplicated vertices of cell `c`.
    pub fn cell_nodes(&self, c: usize) -> Vec<usize> {
        if self.dim == 0 {
            return vec![c];
        }
        let mut out: Vec<usize> = self
            .faces_of_cell(c)
            .flat_map(|(f, _)| self.face_nodes(f).iter().copied())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Face labels (boundary, fracture, tip, ...).
    #[inline]
    pub fn face_labels(&self) -> &LabelSet {
        &self.face_labels
    }

    #[inline]
    pub fn face_labels_mut(&mut self) -> &mut LabelSet {
        &mut self.face_labels
    }

    /// Faces on the outer boundary of the computational domain, ascending.
    pub fn domain_boundary_faces(&self) -> Vec<usize> {
        self.face_labels.stratum_points(DOMAIN_BOUNDARY, 1)
    }

    /// Index of each local vertex in the vertex numbering shared by all meshes of a model.
    #[inline]
    pub fn global_point_ind(&self) -> &[usize] {
        &self.global_point_ind
    }

    /// Replace the shared vertex numbering.
    pub fn set_global_point_ind(&mut self, ind: Vec<usize>) -> Result<(), MeshError> {
        if ind.len() != self.nodes.len() {
            return Err(invalid(format!(
                "global point index has {} entries for {} vertices",
                ind.len(),
                self.nodes.len()
            )));
        }
        self.global_point_ind = ind;
        Ok(())
    }

    /// Compute and cache geometry. Idempotent.
    pub fn compute_geometry(&mut self) -> Result<(), MeshError> {
        if self.geometry.is_none() {
            let geometry = compute_mesh_geometry(self)?;
            log::trace!(
                "computed geometry for {} ({}-d, {} cells)",
                self.id,
                self.dim,
                self.num_cells
            );
            self.geometry = Some(geometry);
        }
        Ok(())
    }

    #[inline]
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Cached geometry.
    ///
    /// # Errors
    /// `GeometryNotComputed` before [`Mesh::compute_geometry`] ran.
    pub fn geometry(&self) -> Result<&MeshGeometry, MeshError> {
        self.geometry
            .as_ref()
            .ok_or(MeshError::GeometryNotComputed(self.id))
    }
}

fn invalid(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_segments() -> Mesh {
        let nodes = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        let faces = Connectivity::from_rows([vec![0], vec![1], vec![2]]);
        let incidence = [(0, 0, -1), (1, 0, 1), (1, 1, -1), (2, 1, 1)];
        Mesh::new(1, nodes, faces, &incidence, 2, "line").unwrap()
    }

    #[test]
    fn incidence_is_queryable_both_ways() {
        let m = two_segments();
        assert_eq!(m.cells_of_face(1).collect::<Vec<_>>(), vec![(0, 1), (1, -1)]);
        assert_eq!(m.faces_of_cell(1).collect::<Vec<_>>(), vec![(1, -1), (2, 1)]);
        assert_eq!(m.cell_nodes(1), vec![1, 2]);
        assert_eq!(m.domain_boundary_faces(), vec![0, 2]);
    }

    #[test]
    fn geometry_is_all_or_nothing() {
        let mut m = two_segments();
        assert!(matches!(m.geometry(), Err(MeshError::GeometryNotComputed(_))));
        m.compute_geometry().unwrap();
        let g = m.geometry().unwrap();
        assert_eq!(g.cell_volumes, vec![1.0, 2.0]);
        assert_eq!(g.cell_centers[1], [2.0, 0.0, 0.0]);
        assert_eq!(g.face_normals[1], [1.0, 0.0, 0.0]);
        m.compute_geometry().unwrap();
        assert!(m.has_geometry());
    }

    #[test]
    fn rejects_bad_incidence() {
        let nodes = vec![[0.0; 3], [1.0, 0.0, 0.0]];
        let faces = Connectivity::from_rows([vec![0], vec![1]]);
        let err = Mesh::new(1, nodes.clone(), faces.clone(), &[(0, 0, 2), (1, 0, 1)], 1, "x")
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidGeometry(_)));
        let err = Mesh::new(1, nodes, faces, &[(0, 0, -1)], 1, "x").unwrap_err();
        assert!(matches!(err, MeshError::InvalidGeometry(_)));
    }

    #[test]
    fn duplicate_draws_a_new_handle() {
        let m = two_segments();
        assert_eq!(m.clone().id(), m.id());
        assert_ne!(m.duplicate().id(), m.id());
    }
}
