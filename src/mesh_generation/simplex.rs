//! Simplex meshes from cell-to-vertex connectivity.
//!
//! Faces are discovered by dropping one vertex of each cell at a time and
//! deduplicating on the sorted vertex tuple. Face numbering follows first
//! appearance (cells in order, then the dropped vertex in local order), so
//! the output is deterministic for a given input. A face shared by two cells
//! has sign `+1` in the lower-numbered cell and `-1` in the other.

use std::collections::HashMap;

use crate::mesh_error::MeshError;
use crate::topology::connectivity::Connectivity;
use crate::topology::mesh::Mesh;

/// Build a `dim`-dimensional simplex mesh (points, segments, triangles or
/// tetrahedra) from `nodes` and `cells`, each cell listing `dim + 1` vertices.
pub fn simplex_mesh(
    dim: usize,
    nodes: Vec<[f64; 3]>,
    cells: &[Vec<usize>],
) -> Result<Mesh, MeshError> {
    if dim > 3 {
        return Err(MeshError::InvalidGeometry(format!(
            "no simplex cells of dimension {dim}"
        )));
    }
    for (c, cell) in cells.iter().enumerate() {
        if cell.len() != dim + 1 {
            return Err(MeshError::InvalidGeometry(format!(
                "cell {c} has {} vertices, a {dim}-simplex needs {}",
                cell.len(),
                dim + 1
            )));
        }
        if let Some(&v) = cell.iter().find(|&&v| v >= nodes.len()) {
            return Err(MeshError::InvalidGeometry(format!(
                "cell {c} references vertex {v}, mesh has {} vertices",
                nodes.len()
            )));
        }
    }

    if dim == 0 {
        let points = cells.iter().map(|cell| nodes[cell[0]]).collect::<Vec<_>>();
        let mut mesh = Mesh::new(0, points, Connectivity::new(), &[], cells.len(), "PointGrid")?;
        mesh.set_global_point_ind(cells.iter().map(|cell| cell[0]).collect())?;
        return Ok(mesh);
    }

    let mut face_index: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut faces = Connectivity::new();
    let mut incidence = Vec::with_capacity(cells.len() * (dim + 1));
    for (c, cell) in cells.iter().enumerate() {
        for drop in 0..=dim {
            let mut key: Vec<usize> = cell
                .iter()
                .enumerate()
                .filter_map(|(k, &v)| (k != drop).then_some(v))
                .collect();
            key.sort_unstable();
            let next = face_index.len();
            let f = *face_index.entry(key.clone()).or_insert_with(|| {
                faces.push_row(key);
                next
            });
            let sign = if f == next { 1 } else { -1 };
            incidence.push((f, c, sign));
        }
    }

    let name = match dim {
        1 => "LineGrid",
        2 => "TriangleGrid",
        _ => "TetrahedralGrid",
    };
    Mesh::new(dim, nodes, faces, &incidence, cells.len(), name)
}
