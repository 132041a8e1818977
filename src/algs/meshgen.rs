//! Fractured Cartesian mesh graphs for 2-d test problems.
//!
//! [`cart_grid`] builds a 2-d Cartesian mesh cut by straight fractures that
//! run along grid lines, plus one 1-d mesh per fracture and the interface
//! between them. Fracture faces of the 2-d mesh are split: the original face
//! stays with the cell on its `+1` side and a copy, appended after all
//! original faces, takes the cell on the `-1` side. Only non-intersecting,
//! axis-aligned fractures are supported.

use crate::mesh_error::MeshError;
use crate::mesh_generation::{cart_grid_2d, line_grid};
use crate::mesh_graph::MeshGraph;
use crate::topology::labels::{DOMAIN_BOUNDARY, FRACTURE, TIP};
use crate::topology::mesh::Mesh;
use crate::topology::mortar::Interface;

const TOL: f64 = 1e-9;

/// Options for [`cart_grid`].
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CartGridOptions {
    /// Physical extent of the domain; defaults to one unit per cell.
    pub physdims: Option<[f64; 2]>,
}

/// One fracture on grid lines, resolved to grid indices.
#[derive(Clone, Copy, Debug)]
struct GridFracture {
    /// `true` for a fracture along y (constant x).
    vertical: bool,
    /// Index of the grid line the fracture lies on.
    line: usize,
    /// Half-open range of cells along the fracture.
    start: usize,
    end: usize,
}

/// Build a mesh graph of a 2-d Cartesian grid with `nx[0] x nx[1]` cells and
/// the given fractures.
///
/// Each fracture is given as `[[x0, x1], [y0, y1]]`, i.e. coordinate rows of
/// its two endpoints.
///
/// # Errors
/// `InvalidGeometry` for fractures that are not axis-aligned, do not lie on
/// interior grid lines, have zero length, or touch another fracture.
pub fn cart_grid(
    fractures: &[[[f64; 2]; 2]],
    nx: [usize; 2],
    opts: CartGridOptions,
) -> Result<MeshGraph, MeshError> {
    let physdims = opts.physdims.unwrap_or([nx[0] as f64, nx[1] as f64]);
    let base = cart_grid_2d(nx, physdims)?;
    let h = [physdims[0] / nx[0] as f64, physdims[1] / nx[1] as f64];

    let resolved = fractures
        .iter()
        .map(|f| resolve(f, nx, h))
        .collect::<Result<Vec<_>, _>>()?;
    check_disjoint(&resolved)?;

    let x_face = |i: usize, j: usize| i + (nx[0] + 1) * j;
    let y_face = |i: usize, j: usize| (nx[0] + 1) * nx[1] + i + nx[0] * j;
    let vertex = |i: usize, j: usize| i + (nx[0] + 1) * j;

    // parent faces along each fracture, following the 1-d cell order
    let fracture_faces: Vec<Vec<usize>> = resolved
        .iter()
        .map(|fr| {
            (fr.start..fr.end)
                .rev()
                .map(|k| {
                    if fr.vertical {
                        x_face(fr.line, k)
                    } else {
                        y_face(k, fr.line)
                    }
                })
                .collect()
        })
        .collect();

    let mut split: Vec<usize> = fracture_faces.iter().flatten().copied().collect();
    split.sort_unstable();
    let num_faces = base.num_faces();
    let copy_of = |f: usize| split.binary_search(&f).ok().map(|k| num_faces + k);

    let mut faces = base.face_node_connectivity().clone();
    for &f in &split {
        faces.push_row(base.face_nodes(f).iter().copied());
    }
    let incidence: Vec<(usize, usize, i8)> = base
        .cell_face_triplets()
        .into_iter()
        .map(|(f, c, s)| match copy_of(f) {
            Some(copy) if s < 0 => (copy, c, s),
            _ => (f, c, s),
        })
        .collect();
    let mut parent = Mesh::new(
        2,
        base.nodes().to_vec(),
        faces,
        &incidence,
        base.num_cells(),
        base.name(),
    )?;
    for f in split.iter().copied().chain(num_faces..num_faces + split.len()) {
        parent.face_labels_mut().clear_label(f, DOMAIN_BOUNDARY);
        parent.face_labels_mut().set_label(f, FRACTURE, 1);
    }

    let mut children = Vec::with_capacity(resolved.len());
    for (fr, parent_faces) in resolved.iter().zip(&fracture_faces) {
        let globals: Vec<usize> = (fr.start..=fr.end)
            .rev()
            .map(|k| {
                if fr.vertical {
                    vertex(fr.line, k)
                } else {
                    vertex(k, fr.line)
                }
            })
            .collect();
        let points: Vec<[f64; 3]> = globals.iter().map(|&v| base.nodes()[v]).collect();
        let mut child = line_grid(&points)?;
        child.set_global_point_ind(globals)?;
        let last = child.num_faces() - 1;
        let along = if fr.vertical { nx[1] } else { nx[0] };
        for (face, index) in [(0, fr.end), (last, fr.start)] {
            if index != 0 && index != along {
                child.face_labels_mut().clear_label(face, DOMAIN_BOUNDARY);
                child.face_labels_mut().set_label(face, TIP, 1);
            }
        }

        let mut pairs = Vec::with_capacity(2 * parent_faces.len());
        for (c, &f) in parent_faces.iter().enumerate() {
            pairs.push((c, f));
            if let Some(copy) = copy_of(f) {
                pairs.push((c, copy));
            }
        }
        let interface = Interface::from_face_cells(&parent, &child, &pairs)?;
        children.push((child, interface));
    }

    let mut graph = MeshGraph::new();
    let parent_id = graph.add_node(parent)?;
    for (child, interface) in children {
        let child_id = graph.add_node(child)?;
        graph.add_edge(parent_id, child_id, interface)?;
    }
    log::debug!(
        "cart_grid {}x{} with {} fractures: {} split faces",
        nx[0],
        nx[1],
        resolved.len(),
        split.len()
    );
    Ok(graph)
}

fn resolve(f: &[[f64; 2]; 2], nx: [usize; 2], h: [f64; 2]) -> Result<GridFracture, MeshError> {
    let [[x0, x1], [y0, y1]] = *f;
    let vertical = (x0 - x1).abs() < TOL * h[0];
    let horizontal = (y0 - y1).abs() < TOL * h[1];
    let (line_coord, line_h, line_max, a, b, along_h, along_max) = match (vertical, horizontal) {
        (true, false) => (x0, h[0], nx[0], y0.min(y1), y0.max(y1), h[1], nx[1]),
        (false, true) => (y0, h[1], nx[1], x0.min(x1), x0.max(x1), h[0], nx[0]),
        (true, true) => return Err(invalid(format!("fracture {f:?} has zero length"))),
        (false, false) => return Err(invalid(format!("fracture {f:?} is not axis-aligned"))),
    };
    let line = grid_index(line_coord, line_h)
        .ok_or_else(|| invalid(format!("fracture {f:?} is not on a grid line")))?;
    if line == 0 || line >= line_max {
        return Err(invalid(format!("fracture {f:?} lies on the domain boundary")));
    }
    let start = grid_index(a, along_h);
    let end = grid_index(b, along_h);
    match (start, end) {
        (Some(start), Some(end)) if end <= along_max => Ok(GridFracture {
            vertical,
            line,
            start,
            end,
        }),
        _ => Err(invalid(format!(
            "fracture {f:?} does not end on grid vertices inside the domain"
        ))),
    }
}

fn grid_index(coord: f64, h: f64) -> Option<usize> {
    let t = coord / h;
    let r = t.round();
    (r >= 0.0 && (t - r).abs() < TOL).then_some(r as usize)
}

fn check_disjoint(fractures: &[GridFracture]) -> Result<(), MeshError> {
    for (a_idx, a) in fractures.iter().enumerate() {
        for (b_idx, b) in fractures.iter().enumerate().skip(a_idx + 1) {
            let touching = if a.vertical == b.vertical {
                a.line == b.line && a.start <= b.end && b.start <= a.end
            } else {
                // a and b cross when each one's line falls inside the other's span
                a.start <= b.line && b.line <= a.end && b.start <= a.line && a.line <= b.end
            };
            if touching {
                return Err(invalid(format!(
                    "fractures {a_idx} and {b_idx} intersect; only disjoint fractures are supported"
                )));
            }
        }
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_faces_are_appended() {
        let graph = cart_grid(&[[[2.0, 2.0], [0.0, 2.0]]], [4, 2], CartGridOptions::default()).unwrap();
        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 1);
        let ids: Vec<_> = graph.nodes().collect();
        let parent = graph.mesh(ids[0]).unwrap();
        assert_eq!(parent.num_faces(), 24);
        assert_eq!(parent.cells_of_face(2).collect::<Vec<_>>(), vec![(1, 1)]);
        assert_eq!(parent.cells_of_face(22).collect::<Vec<_>>(), vec![(2, -1)]);
        assert_eq!(parent.face_labels().stratum_points(FRACTURE, 1), vec![2, 7, 22, 23]);
        assert_eq!(parent.domain_boundary_faces().len(), 12);

        let child = graph.mesh(ids[1]).unwrap();
        assert_eq!(child.global_point_ind(), &[12, 7, 2]);
        assert_eq!(child.domain_boundary_faces(), vec![0, 2]);
        assert_eq!(graph.interface(graph.edges().next().unwrap()).unwrap().num_mortar_cells(), 4);
    }

    #[test]
    fn interior_fracture_has_tips() {
        let graph = cart_grid(&[[[1.0, 3.0], [1.0, 1.0]]], [4, 2], CartGridOptions::default()).unwrap();
        let child = graph.mesh(graph.nodes().nth(1).unwrap()).unwrap();
        assert_eq!(child.num_cells(), 2);
        assert_eq!(child.face_labels().stratum_points(TIP, 1), vec![0, 2]);
        assert!(child.domain_boundary_faces().is_empty());
    }

    #[test]
    fn crossing_fractures_are_rejected() {
        let err = cart_grid(
            &[[[2.0, 2.0], [0.0, 2.0]], [[1.0, 3.0], [1.0, 1.0]]],
            [4, 2],
            CartGridOptions::default(),
        );
        assert!(matches!(err, Err(MeshError::InvalidGeometry(_))));
        let err = cart_grid(&[[[0.5, 1.5], [0.5, 1.5]]], [4, 2], CartGridOptions::default());
        assert!(matches!(err, Err(MeshError::InvalidGeometry(_))));
    }
}
