//! Structured mesh generators: Cartesian boxes, polylines and points.
//!
//! Numbering follows the usual tensor-product layout. In 2-d, vertex
//! `(i, j)` is `i + (nx + 1) * j`, cell `(i, j)` is `i + nx * j`, x-faces
//! (normal along +x) come first followed by y-faces; in 3-d z-faces follow.
//! For every cell the face on its low side has sign `-1` and the face on its
//! high side `+1`.

pub mod simplex;

use crate::mesh_error::MeshError;
use crate::topology::connectivity::Connectivity;
use crate::topology::mesh::Mesh;

/// Build a 2-d Cartesian mesh with `nx[0] x nx[1]` cells on `[0, physdims[0]] x [0, physdims[1]]`.
pub fn cart_grid_2d(nx: [usize; 2], physdims: [f64; 2]) -> Result<Mesh, MeshError> {
    let [nx0, ny0] = nx;
    if nx0 == 0 || ny0 == 0 {
        return Err(invalid("cell counts must be non-zero"));
    }
    let (hx, hy) = (physdims[0] / nx0 as f64, physdims[1] / ny0 as f64);
    let node = |i: usize, j: usize| i + (nx0 + 1) * j;

    let mut nodes = Vec::with_capacity((nx0 + 1) * (ny0 + 1));
    for j in 0..=ny0 {
        for i in 0..=nx0 {
            nodes.push([i as f64 * hx, j as f64 * hy, 0.0]);
        }
    }

    let mut faces = Connectivity::new();
    for j in 0..ny0 {
        for i in 0..=nx0 {
            faces.push_row([node(i, j), node(i, j + 1)]);
        }
    }
    for j in 0..=ny0 {
        for i in 0..nx0 {
            faces.push_row([node(i, j), node(i + 1, j)]);
        }
    }

    let x_face = |i: usize, j: usize| i + (nx0 + 1) * j;
    let y_face = |i: usize, j: usize| (nx0 + 1) * ny0 + i + nx0 * j;
    let mut incidence = Vec::with_capacity(4 * nx0 * ny0);
    for j in 0..ny0 {
        for i in 0..nx0 {
            let c = i + nx0 * j;
            incidence.push((x_face(i, j), c, -1));
            incidence.push((x_face(i + 1, j), c, 1));
            incidence.push((y_face(i, j), c, -1));
            incidence.push((y_face(i, j + 1), c, 1));
        }
    }
    Mesh::new(2, nodes, faces, &incidence, nx0 * ny0, "CartGrid")
}

/// Build a 3-d Cartesian mesh with `nx[0] x nx[1] x nx[2]` cells.
pub fn cart_grid_3d(nx: [usize; 3], physdims: [f64; 3]) -> Result<Mesh, MeshError> {
    let [n0, n1, n2] = nx;
    if n0 == 0 || n1 == 0 || n2 == 0 {
        return Err(invalid("cell counts must be non-zero"));
    }
    let h = [
        physdims[0] / n0 as f64,
        physdims[1] / n1 as f64,
        physdims[2] / n2 as f64,
    ];
    let node = |i: usize, j: usize, k: usize| i + (n0 + 1) * (j + (n1 + 1) * k);

    let mut nodes = Vec::with_capacity((n0 + 1) * (n1 + 1) * (n2 + 1));
    for k in 0..=n2 {
        for j in 0..=n1 {
            for i in 0..=n0 {
                nodes.push([i as f64 * h[0], j as f64 * h[1], k as f64 * h[2]]);
            }
        }
    }

    let num_x = (n0 + 1) * n1 * n2;
    let num_y = n0 * (n1 + 1) * n2;
    let x_face = |i: usize, j: usize, k: usize| i + (n0 + 1) * (j + n1 * k);
    let y_face = |i: usize, j: usize, k: usize| num_x + i + n0 * (j + (n1 + 1) * k);
    let z_face = |i: usize, j: usize, k: usize| num_x + num_y + i + n0 * (j + n1 * k);

    let mut faces = Connectivity::new();
    for k in 0..n2 {
        for j in 0..n1 {
            for i in 0..=n0 {
                faces.push_row([
                    node(i, j, k),
                    node(i, j + 1, k),
                    node(i, j + 1, k + 1),
                    node(i, j, k + 1),
                ]);
            }
        }
    }
    for k in 0..n2 {
        for j in 0..=n1 {
            for i in 0..n0 {
                faces.push_row([
                    node(i, j, k),
                    node(i + 1, j, k),
                    node(i + 1, j, k + 1),
                    node(i, j, k + 1),
                ]);
            }
        }
    }
    for k in 0..=n2 {
        for j in 0..n1 {
            for i in 0..n0 {
                faces.push_row([
                    node(i, j, k),
                    node(i + 1, j, k),
                    node(i + 1, j + 1, k),
                    node(i, j + 1, k),
                ]);
            }
        }
    }

    let mut incidence = Vec::with_capacity(6 * n0 * n1 * n2);
    for k in 0..n2 {
        for j in 0..n1 {
            for i in 0..n0 {
                let c = i + n0 * (j + n1 * k);
                incidence.push((x_face(i, j, k), c, -1));
                incidence.push((x_face(i + 1, j, k), c, 1));
                incidence.push((y_face(i, j, k), c, -1));
                incidence.push((y_face(i, j + 1, k), c, 1));
                incidence.push((z_face(i, j, k), c, -1));
                incidence.push((z_face(i, j, k + 1), c, 1));
            }
        }
    }
    Mesh::new(3, nodes, faces, &incidence, n0 * n1 * n2, "CartGrid")
}

/// Build a 1-d mesh along a polyline; cell `k` joins vertices `k` and `k + 1`.
pub fn line_grid(points: &[[f64; 3]]) -> Result<Mesh, MeshError> {
    if points.len() < 2 {
        return Err(invalid("a line grid needs at least two vertices"));
    }
    let faces = Connectivity::from_rows((0..points.len()).map(|k| [k]));
    let num_cells = points.len() - 1;
    let mut incidence = Vec::with_capacity(2 * num_cells);
    for k in 0..num_cells {
        incidence.push((k, k, -1));
        incidence.push((k + 1, k, 1));
    }
    Mesh::new(1, points.to_vec(), faces, &incidence, num_cells, "LineGrid")
}

/// Build a 0-d mesh with a single cell at `point`.
pub fn point_grid(point: [f64; 3]) -> Result<Mesh, MeshError> {
    Mesh::new(0, vec![point], Connectivity::new(), &[], 1, "PointGrid")
}

fn invalid(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}
