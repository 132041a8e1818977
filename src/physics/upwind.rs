//! First-order upwind discretization of advective transport on one mesh.
//!
//! One unknown per cell. For every face the signed flux `q` leaving the
//! first adjacent cell decides the donor: the donor's diagonal gains `|q|`
//! and the receiver's row loses `|q|` in the donor's column. Boundary faces
//! only contribute when a [`BoundaryCondition`] is given:
//!
//! - Dirichlet outflow adds `q` to the diagonal,
//! - Dirichlet inflow moves `|q| * value` into the rhs,
//! - Neumann moves `-value` (the prescribed outward flux) into the rhs.
//!
//! Faces without a condition (fracture faces, tips) are left to the
//! interface couplings.

use nalgebra::DVector;
use nalgebra_sparse::CooMatrix;

use crate::data::bc::{BcKind, BoundaryCondition};
use crate::data::properties::{PropertyKey, PropertyView};
use crate::data::sparse::coo_to_csr;
use crate::discretization::{Discretization, LocalSystem};
use crate::geometry::metrics::dot;
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh;

/// Signed flux through every face, oriented along the face normal.
pub const FACE_FLUX: PropertyKey<Vec<f64>> = PropertyKey::new("face_flux");
/// Cell apertures (thickness of a lower-dimensional mesh; 1 for the matrix).
pub const APERTURE: PropertyKey<Vec<f64>> = PropertyKey::new("aperture");
/// Optional boundary condition types.
pub const BC: PropertyKey<BoundaryCondition> = PropertyKey::new("bc");
/// Boundary values per face; required whenever [`BC`] is set.
pub const BC_VALUES: PropertyKey<Vec<f64>> = PropertyKey::new("bc_values");

/// Upwind transport operator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Upwind;

impl Upwind {
    pub fn new() -> Self {
        Self
    }

    /// Face fluxes of the constant velocity `velocity`, scaled by the face
    /// aperture (mean of the adjacent cell apertures, 1 when `apertures` is
    /// `None`).
    pub fn beta_n(
        mesh: &Mesh,
        velocity: [f64; 3],
        apertures: Option<&[f64]>,
    ) -> Result<Vec<f64>, MeshError> {
        if let Some(a) = apertures {
            if a.len() != mesh.num_cells() {
                return Err(MeshError::discretization(
                    mesh.id(),
                    format!("{} apertures for {} cells", a.len(), mesh.num_cells()),
                ));
            }
        }
        let geo = mesh.geometry()?;
        let flux = (0..mesh.num_faces())
            .map(|f| {
                let aperture = match apertures {
                    Some(a) => {
                        let (sum, n) = mesh
                            .cells_of_face(f)
                            .fold((0.0, 0usize), |(s, n), (c, _)| (s + a[c], n + 1));
                        sum / n.max(1) as f64
                    }
                    None => 1.0,
                };
                aperture * dot(velocity, geo.face_normals[f])
            })
            .collect();
        Ok(flux)
    }

    /// Largest stable explicit time step: `min_c aperture_c * volume_c / outflow_c`
    /// over cells with positive outflow; infinite when nothing flows out.
    pub fn cfl(mesh: &Mesh, properties: &PropertyView<'_>) -> Result<f64, MeshError> {
        let flux = face_flux(mesh, properties)?;
        let aperture = properties.get(APERTURE)?;
        if aperture.len() != mesh.num_cells() {
            return Err(MeshError::discretization(
                mesh.id(),
                format!("{} apertures for {} cells", aperture.len(), mesh.num_cells()),
            ));
        }
        let geo = mesh.geometry()?;
        let mut dt = f64::INFINITY;
        for c in 0..mesh.num_cells() {
            let outflow: f64 = mesh
                .faces_of_cell(c)
                .map(|(f, s)| (f64::from(s) * flux[f]).max(0.0))
                .sum();
            if outflow > 0.0 {
                dt = dt.min(aperture[c] * geo.cell_volumes[c] / outflow);
            }
        }
        Ok(dt)
    }
}

fn face_flux<'a>(mesh: &Mesh, properties: &PropertyView<'a>) -> Result<&'a Vec<f64>, MeshError> {
    let flux = properties.get(FACE_FLUX)?;
    if flux.len() != mesh.num_faces() {
        return Err(MeshError::discretization(
            mesh.id(),
            format!("{} face fluxes for {} faces", flux.len(), mesh.num_faces()),
        ));
    }
    Ok(flux)
}

impl Discretization for Upwind {
    fn ndof(&self, mesh: &Mesh) -> usize {
        mesh.num_cells()
    }

    fn discretize(&self, mesh: &Mesh, properties: &PropertyView<'_>) -> Result<LocalSystem, MeshError> {
        let n = mesh.num_cells();
        let flux = face_flux(mesh, properties)?;
        let bc = match properties.get_optional(BC)? {
            Some(bc) => {
                let values = properties.get(BC_VALUES)?;
                if bc.num_faces() != mesh.num_faces() || values.len() != mesh.num_faces() {
                    return Err(MeshError::discretization(
                        mesh.id(),
                        format!(
                            "boundary data covers {} types and {} values for {} faces",
                            bc.num_faces(),
                            values.len(),
                            mesh.num_faces()
                        ),
                    ));
                }
                Some((bc, values))
            }
            None => None,
        };

        let mut coo = CooMatrix::new(n, n);
        let mut rhs = DVector::zeros(n);
        for f in 0..mesh.num_faces() {
            let mut cells = mesh.cells_of_face(f);
            let Some((c0, s0)) = cells.next() else {
                continue;
            };
            let q = f64::from(s0) * flux[f];
            match cells.next() {
                Some((c1, _)) => {
                    if q > 0.0 {
                        coo.push(c0, c0, q);
                        coo.push(c1, c0, -q);
                    } else if q < 0.0 {
                        coo.push(c1, c1, -q);
                        coo.push(c0, c1, q);
                    }
                }
                None => {
                    let Some((bc, values)) = bc else { continue };
                    match bc.kind(f) {
                        Some(BcKind::Dirichlet) => {
                            if q > 0.0 {
                                coo.push(c0, c0, q);
                            } else {
                                rhs[c0] += -q * values[f];
                            }
                        }
                        Some(BcKind::Neumann) => rhs[c0] -= values[f],
                        None => {}
                    }
                }
            }
        }
        log::trace!("upwind on {}: {} cells, {} entries", mesh.id(), n, coo.nnz());
        LocalSystem::new(mesh.id(), coo_to_csr(&coo, false), rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::properties::PropertyStore;
    use crate::data::sparse::csr_value;
    use crate::mesh_generation::line_grid;

    #[test]
    fn line_with_inflow_dirichlet() {
        let mut m = line_grid(&[[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]).unwrap();
        m.compute_geometry().unwrap();
        let flux = Upwind::beta_n(&m, [1.0, 0.0, 0.0], None).unwrap();
        assert_eq!(flux, vec![1.0, 1.0, 1.0]);

        let mut store = PropertyStore::new();
        store.set_node_property(m.id(), FACE_FLUX, flux);
        store.set_node_property(m.id(), BC, BoundaryCondition::dirichlet(&m));
        store.set_node_property(m.id(), BC_VALUES, vec![2.0, 0.0, 5.0]);
        let sys = Upwind.discretize(&m, &store.node(m.id())).unwrap();
        assert_eq!(csr_value(&sys.matrix, 0, 0), 1.0);
        assert_eq!(csr_value(&sys.matrix, 1, 0), -1.0);
        assert_eq!(csr_value(&sys.matrix, 1, 1), 1.0);
        assert_eq!(sys.rhs.as_slice(), &[2.0, 0.0]);

        store.set_node_property(m.id(), APERTURE, vec![0.5, 1.0]);
        assert_eq!(Upwind::cfl(&m, &store.node(m.id())).unwrap(), 0.5);
    }

    #[test]
    fn bc_without_values_is_missing_property() {
        let mut m = line_grid(&[[0.0; 3], [1.0, 0.0, 0.0]]).unwrap();
        m.compute_geometry().unwrap();
        let mut store = PropertyStore::new();
        store.set_node_property(m.id(), FACE_FLUX, vec![0.0, 0.0]);
        store.set_node_property(m.id(), BC, BoundaryCondition::neumann(&m));
        assert!(matches!(
            Upwind.discretize(&m, &store.node(m.id())),
            Err(MeshError::MissingProperty { key: "bc_values", .. })
        ));
    }
}
