//! Geometry metrics for meshes of dimension 0 to 3.
//!
//! Face normals are scaled by the face area and oriented by the signed
//! incidence: for the lowest-numbered cell `c` adjacent to a face with sign
//! `s`, the normal points out of `c` when `s = +1` and into it when `s = -1`.
//! Cell volumes and centroids are integrated over sub-simplices spanned by
//! the faces and an interior point of the cell, which is exact for
//! star-shaped cells with planar faces.

use crate::mesh_error::MeshError;
use crate::topology::mesh::{Mesh, MeshGeometry};

const EPS: f64 = 1e-12;

/// Compute all geometric quantities of `mesh`.
pub fn compute_mesh_geometry(mesh: &Mesh) -> Result<MeshGeometry, MeshError> {
    if mesh.dim() == 0 {
        return Ok(MeshGeometry {
            face_areas: Vec::new(),
            face_normals: Vec::new(),
            face_centers: Vec::new(),
            cell_volumes: vec![1.0; mesh.num_cells()],
            cell_centers: mesh.nodes()[..mesh.num_cells()].to_vec(),
        });
    }

    let nodes = mesh.nodes();
    let num_faces = mesh.num_faces();
    let mut face_areas = Vec::with_capacity(num_faces);
    let mut face_centers = Vec::with_capacity(num_faces);
    // unoriented unit normals; only meaningful for 3-d meshes
    let mut raw_normals = Vec::with_capacity(num_faces);
    for f in 0..num_faces {
        let fnodes = mesh.face_nodes(f);
        match mesh.dim() {
            1 => {
                face_areas.push(1.0);
                face_centers.push(nodes[fnodes[0]]);
                raw_normals.push([0.0; 3]);
            }
            2 => {
                let (a, b) = (nodes[fnodes[0]], nodes[fnodes[1]]);
                face_areas.push(norm(sub(b, a)));
                face_centers.push(scale(add(a, b), 0.5));
                raw_normals.push([0.0; 3]);
            }
            _ => {
                let (area, center, normal) = polygon_metrics(fnodes.iter().map(|&i| nodes[i]))?;
                face_areas.push(area);
                face_centers.push(center);
                raw_normals.push(normal);
            }
        }
    }

    let approx_centers: Vec<[f64; 3]> = (0..mesh.num_cells())
        .map(|c| {
            let mut sum = [0.0; 3];
            let mut n = 0usize;
            for (f, _) in mesh.faces_of_cell(c) {
                sum = add(sum, face_centers[f]);
                n += 1;
            }
            if n == 0 { sum } else { scale(sum, 1.0 / n as f64) }
        })
        .collect();

    let mut face_normals = Vec::with_capacity(num_faces);
    for f in 0..num_faces {
        let (c, s) = mesh
            .cells_of_face(f)
            .next()
            .ok_or_else(|| invalid(format!("face {f} has no adjacent cell")))?;
        let s = f64::from(s);
        let outward = sub(face_centers[f], approx_centers[c]);
        let normal = match mesh.dim() {
            1 => scale(unit(outward, f)?, s),
            2 => {
                let fnodes = mesh.face_nodes(f);
                let t = unit(sub(nodes[fnodes[1]], nodes[fnodes[0]]), f)?;
                let w = sub(outward, scale(t, dot(outward, t)));
                scale(unit(w, f)?, s * face_areas[f])
            }
            _ => {
                let n = raw_normals[f];
                let flip = if dot(n, outward) * s < 0.0 { -1.0 } else { 1.0 };
                scale(n, flip * face_areas[f])
            }
        };
        face_normals.push(normal);
    }

    let mut cell_volumes = Vec::with_capacity(mesh.num_cells());
    let mut cell_centers = Vec::with_capacity(mesh.num_cells());
    for c in 0..mesh.num_cells() {
        let x0 = approx_centers[c];
        let (volume, center) = match mesh.dim() {
            1 => {
                let faces: Vec<usize> = mesh.faces_of_cell(c).map(|(f, _)| f).collect();
                if faces.len() != 2 {
                    return Err(invalid(format!(
                        "1-d cell {c} has {} faces, expected 2",
                        faces.len()
                    )));
                }
                let (a, b) = (face_centers[faces[0]], face_centers[faces[1]]);
                (norm(sub(b, a)), scale(add(a, b), 0.5))
            }
            2 => {
                let mut vol = 0.0;
                let mut moment = [0.0; 3];
                for (f, _) in mesh.faces_of_cell(c) {
                    let fnodes = mesh.face_nodes(f);
                    let (a, b) = (nodes[fnodes[0]], nodes[fnodes[1]]);
                    let area = 0.5 * norm(cross(sub(a, x0), sub(b, x0)));
                    vol += area;
                    moment = add(moment, scale(add(add(x0, a), b), area / 3.0));
                }
                (vol, moment)
            }
            _ => {
                let mut vol = 0.0;
                let mut moment = [0.0; 3];
                for (f, _) in mesh.faces_of_cell(c) {
                    let n = face_normals[f];
                    let h = (dot(n, sub(face_centers[f], x0)) / face_areas[f].max(EPS)).abs();
                    let sub_vol = face_areas[f] * h / 3.0;
                    vol += sub_vol;
                    let centroid = add(x0, scale(sub(face_centers[f], x0), 0.75));
                    moment = add(moment, scale(centroid, sub_vol));
                }
                (vol, moment)
            }
        };
        if volume <= EPS {
            return Err(invalid(format!("cell {c} has zero measure")));
        }
        cell_volumes.push(volume);
        cell_centers.push(if mesh.dim() == 1 {
            center
        } else {
            scale(center, 1.0 / volume)
        });
    }

    Ok(MeshGeometry {
        face_areas,
        face_normals,
        face_centers,
        cell_volumes,
        cell_centers,
    })
}

/// Area, centroid and unit normal (right-hand rule over vertex order) of a planar polygon.
fn polygon_metrics(
    points: impl Iterator<Item = [f64; 3]>,
) -> Result<(f64, [f64; 3], [f64; 3]), MeshError> {
    let pts: Vec<[f64; 3]> = points.collect();
    let x0 = scale(
        pts.iter().fold([0.0; 3], |acc, &p| add(acc, p)),
        1.0 / pts.len() as f64,
    );
    let mut normal = [0.0; 3];
    let mut total = 0.0;
    let mut moment = [0.0; 3];
    for i in 0..pts.len() {
        let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
        let n = scale(cross(sub(a, x0), sub(b, x0)), 0.5);
        let area = norm(n);
        normal = add(normal, n);
        total += area;
        moment = add(moment, scale(add(add(x0, a), b), area / 3.0));
    }
    let area = norm(normal);
    if area <= EPS || total <= EPS {
        return Err(invalid("degenerate polygonal face"));
    }
    Ok((area, scale(moment, 1.0 / total), scale(normal, 1.0 / area)))
}

fn unit(v: [f64; 3], face: usize) -> Result<[f64; 3], MeshError> {
    let n = norm(v);
    if n <= EPS {
        return Err(invalid(format!("face {face} has a degenerate normal")));
    }
    Ok(scale(v, 1.0 / n))
}

fn invalid(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}

pub(crate) fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
