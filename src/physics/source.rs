//! Cell-integrated source terms.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::data::properties::{PropertyKey, PropertyView};
use crate::discretization::{Discretization, LocalSystem};
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh;

/// Source integrated over each cell.
pub const SOURCE: PropertyKey<Vec<f64>> = PropertyKey::new("source");

/// Rhs-only discretization: zero matrix, rhs equal to [`SOURCE`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Integral;

impl Discretization for Integral {
    fn ndof(&self, mesh: &Mesh) -> usize {
        mesh.num_cells()
    }

    fn discretize(&self, mesh: &Mesh, properties: &PropertyView<'_>) -> Result<LocalSystem, MeshError> {
        let n = mesh.num_cells();
        let source = properties.get(SOURCE)?;
        if source.len() != n {
            return Err(MeshError::discretization(
                mesh.id(),
                format!("{} source values for {n} cells", source.len()),
            ));
        }
        LocalSystem::new(
            mesh.id(),
            CsrMatrix::zeros(n, n),
            DVector::from_column_slice(source),
        )
    }
}
