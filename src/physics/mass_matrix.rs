//! Lumped mass matrices and the algebraic zero coupling.

use nalgebra::DVector;
use nalgebra_sparse::CooMatrix;

use crate::data::properties::{PropertyKey, PropertyView};
use crate::data::sparse::coo_to_csr;
use crate::discretization::{
    CouplingBlocks, CouplingOperator, CouplingSide, Discretization, LocalSystem,
};
use crate::mesh_error::MeshError;
use crate::physics::upwind::APERTURE;
use crate::topology::mesh::Mesh;
use crate::topology::mortar::Interface;

/// Cell porosities.
pub const POROSITY: PropertyKey<Vec<f64>> = PropertyKey::new("porosity");
/// Time step of the surrounding scheme.
pub const TIME_STEP: PropertyKey<f64> = PropertyKey::new("time_step");

/// `diag(porosity * aperture * volume / dt)`, zero rhs.
#[derive(Clone, Copy, Debug, Default)]
pub struct MassMatrix;

/// Inverse of [`MassMatrix`]; fails on a zero diagonal entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct InvMassMatrix;

fn lumped_mass(mesh: &Mesh, properties: &PropertyView<'_>) -> Result<Vec<f64>, MeshError> {
    let porosity = properties.get(POROSITY)?;
    let aperture = properties.get(APERTURE)?;
    let dt = *properties.get(TIME_STEP)?;
    let n = mesh.num_cells();
    if porosity.len() != n || aperture.len() != n {
        return Err(MeshError::discretization(
            mesh.id(),
            format!(
                "{} porosities and {} apertures for {n} cells",
                porosity.len(),
                aperture.len()
            ),
        ));
    }
    if dt <= 0.0 {
        return Err(MeshError::discretization(mesh.id(), format!("time step {dt} is not positive")));
    }
    let volumes = &mesh.geometry()?.cell_volumes;
    Ok((0..n).map(|c| porosity[c] * aperture[c] * volumes[c] / dt).collect())
}

fn diagonal(mesh: &Mesh, values: &[f64]) -> Result<LocalSystem, MeshError> {
    let n = values.len();
    let mut coo = CooMatrix::new(n, n);
    for (c, &v) in values.iter().enumerate() {
        coo.push(c, c, v);
    }
    LocalSystem::new(mesh.id(), coo_to_csr(&coo, false), DVector::zeros(n))
}

impl Discretization for MassMatrix {
    fn ndof(&self, mesh: &Mesh) -> usize {
        mesh.num_cells()
    }

    fn discretize(&self, mesh: &Mesh, properties: &PropertyView<'_>) -> Result<LocalSystem, MeshError> {
        diagonal(mesh, &lumped_mass(mesh, properties)?)
    }
}

impl Discretization for InvMassMatrix {
    fn ndof(&self, mesh: &Mesh) -> usize {
        mesh.num_cells()
    }

    fn discretize(&self, mesh: &Mesh, properties: &PropertyView<'_>) -> Result<LocalSystem, MeshError> {
        let mass = lumped_mass(mesh, properties)?;
        if let Some(c) = mass.iter().position(|&m| m == 0.0) {
            return Err(MeshError::discretization(
                mesh.id(),
                format!("mass of cell {c} is zero and cannot be inverted"),
            ));
        }
        let inv: Vec<f64> = mass.iter().map(|m| 1.0 / m).collect();
        diagonal(mesh, &inv)
    }
}

/// Coupling that contributes nothing and owns no unknowns.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCoupling;

impl CouplingOperator for NoCoupling {
    fn ndof(&self, _interface: &Interface) -> usize {
        0
    }

    fn assemble_coupling(
        &self,
        _interface: &Interface,
        parent: &CouplingSide<'_>,
        child: &CouplingSide<'_>,
        edge: &PropertyView<'_>,
    ) -> Result<CouplingBlocks, MeshError> {
        Ok(CouplingBlocks::new(edge.owner(), parent.ndof, child.ndof, 0))
    }
}
