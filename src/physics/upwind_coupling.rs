//! Upwind coupling across an interface.
//!
//! The mortar flux `λ_k` (edge property [`MORTAR_FLUX`]) is oriented from the
//! parent into the child. With `M_h` the mortar-to-parent-cell map and
//! `M_l` the child projection, each mortar cell adds
//!
//! - `λ > 0` (parent donates): `pp += λ M_hᵀ M_h`, `cp -= λ M_lᵀ M_h`,
//! - `λ < 0` (child donates): `cc += |λ| M_lᵀ M_l`, `pc -= |λ| M_hᵀ M_l`,
//!
//! and nothing when `λ == 0`.

use crate::data::properties::{PropertyKey, PropertyView};
use crate::data::sparse::csr_row;
use crate::discretization::{CouplingBlocks, CouplingOperator, CouplingSide, Side};
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh;
use crate::topology::mortar::Interface;

/// Flux per mortar cell, positive from parent to child.
pub const MORTAR_FLUX: PropertyKey<Vec<f64>> = PropertyKey::new("mortar_flux");

/// Upwind interface law; owns no unknowns.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpwindCoupling;

impl UpwindCoupling {
    pub fn new() -> Self {
        Self
    }

    /// Mortar flux from the parent's face fluxes: each parent face flux is
    /// turned into an outflow of its parent cell, then projected.
    pub fn mortar_flux(
        interface: &Interface,
        parent: &Mesh,
        parent_face_flux: &[f64],
    ) -> Result<Vec<f64>, MeshError> {
        if parent_face_flux.len() != parent.num_faces() {
            return Err(MeshError::discretization(
                parent.id(),
                format!(
                    "{} face fluxes for {} faces",
                    parent_face_flux.len(),
                    parent.num_faces()
                ),
            ));
        }
        let proj = interface.parent_proj();
        if proj.ncols() != parent.num_faces() {
            return Err(MeshError::InterfaceShapeMismatch(format!(
                "parent projection has {} columns, {} has {} faces",
                proj.ncols(),
                parent.id(),
                parent.num_faces()
            )));
        }
        Ok((0..proj.nrows())
            .map(|k| {
                let (faces, weights) = csr_row(proj, k);
                faces
                    .iter()
                    .zip(weights)
                    .map(|(&f, &w)| {
                        let sign = parent.cells_of_face(f).next().map_or(1.0, |(_, s)| f64::from(s));
                        w * sign * parent_face_flux[f]
                    })
                    .sum()
            })
            .collect())
    }
}

impl CouplingOperator for UpwindCoupling {
    fn ndof(&self, _interface: &Interface) -> usize {
        0
    }

    fn assemble_coupling(
        &self,
        interface: &Interface,
        parent: &CouplingSide<'_>,
        child: &CouplingSide<'_>,
        edge: &PropertyView<'_>,
    ) -> Result<CouplingBlocks, MeshError> {
        let owner = edge.owner();
        let lambda = edge.get(MORTAR_FLUX)?;
        if lambda.len() != interface.num_mortar_cells() {
            return Err(MeshError::Discretization {
                owner,
                message: format!(
                    "{} mortar fluxes for {} mortar cells",
                    lambda.len(),
                    interface.num_mortar_cells()
                ),
            });
        }
        let m_h = interface.mortar_to_parent_cells(parent.mesh)?;
        let m_l = interface.child_proj();

        let mut blocks = CouplingBlocks::new(owner, parent.ndof, child.ndof, 0);
        for (k, &l) in lambda.iter().enumerate() {
            let (hc, hw) = csr_row(&m_h, k);
            let (lc, lw) = csr_row(m_l, k);
            if l > 0.0 {
                for (&i, &wi) in hc.iter().zip(hw) {
                    for (&j, &wj) in hc.iter().zip(hw) {
                        blocks.add(Side::Parent, Side::Parent, i, j, l * wi * wj)?;
                    }
                }
                for (&i, &wi) in lc.iter().zip(lw) {
                    for (&j, &wj) in hc.iter().zip(hw) {
                        blocks.add(Side::Child, Side::Parent, i, j, -l * wi * wj)?;
                    }
                }
            } else if l < 0.0 {
                let a = -l;
                for (&i, &wi) in lc.iter().zip(lw) {
                    for (&j, &wj) in lc.iter().zip(lw) {
                        blocks.add(Side::Child, Side::Child, i, j, a * wi * wj)?;
                    }
                }
                for (&i, &wi) in hc.iter().zip(hw) {
                    for (&j, &wj) in lc.iter().zip(lw) {
                        blocks.add(Side::Parent, Side::Child, i, j, -a * wi * wj)?;
                    }
                }
            }
        }
        if blocks.is_empty() {
            log::trace!("{owner}: all mortar fluxes vanish");
        }
        Ok(blocks)
    }
}
