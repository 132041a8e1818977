//! Per-face boundary conditions selected by index or by label query.
//!
//! Faces on the domain boundary default to Neumann; every
//! other face carries no condition until one is set explicitly.

use crate::mesh_error::MeshError;
use crate::topology::labels::{DOMAIN_BOUNDARY, LabelSet};
use crate::topology::mesh::Mesh;

/// Label query selector for boundary condition assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelQuery {
    name: String,
    value: i32,
}

impl LabelQuery {
    /// Create a new label query.
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// All faces on the domain boundary.
    pub fn domain_boundary() -> Self {
        Self::new(DOMAIN_BOUNDARY, 1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    fn faces(&self, labels: &LabelSet) -> Vec<usize> {
        labels.stratum_points(&self.name, self.value)
    }
}

/// Type of condition on one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BcKind {
    /// Prescribed flux.
    Neumann,
    /// Prescribed value.
    Dirichlet,
}

/// Boundary condition type per face of one mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryCondition {
    kinds: Vec<Option<BcKind>>,
}

impl BoundaryCondition {
    /// Neumann on the domain boundary of `mesh`, nothing elsewhere.
    pub fn neumann(mesh: &Mesh) -> Self {
        let mut kinds = vec![None; mesh.num_faces()];
        for f in mesh.domain_boundary_faces() {
            kinds[f] = Some(BcKind::Neumann);
        }
        Self { kinds }
    }

    /// Dirichlet on the whole domain boundary of `mesh`.
    pub fn dirichlet(mesh: &Mesh) -> Self {
        let mut kinds = vec![None; mesh.num_faces()];
        for f in mesh.domain_boundary_faces() {
            kinds[f] = Some(BcKind::Dirichlet);
        }
        Self { kinds }
    }

    /// Neumann defaults overridden on `faces` by the matching `kinds`.
    ///
    /// # Errors
    /// `InvalidGeometry` on length mismatch or an out-of-range face.
    pub fn new(mesh: &Mesh, faces: &[usize], kinds: &[BcKind]) -> Result<Self, MeshError> {
        if faces.len() != kinds.len() {
            return Err(MeshError::InvalidGeometry(format!(
                "{} boundary faces but {} condition types",
                faces.len(),
                kinds.len()
            )));
        }
        let mut bc = Self::neumann(mesh);
        for (&f, &kind) in faces.iter().zip(kinds) {
            bc.set(f, kind)?;
        }
        Ok(bc)
    }

    /// Neumann defaults overridden with `kind` on every face matching `query`.
    pub fn from_label(mesh: &Mesh, query: &LabelQuery, kind: BcKind) -> Self {
        let mut bc = Self::neumann(mesh);
        for f in query.faces(mesh.face_labels()) {
            if let Some(slot) = bc.kinds.get_mut(f) {
                *slot = Some(kind);
            }
        }
        bc
    }

    /// Set the condition on face `f`.
    pub fn set(&mut self, f: usize, kind: BcKind) -> Result<(), MeshError> {
        let n = self.kinds.len();
        let slot = self.kinds.get_mut(f).ok_or_else(|| {
            MeshError::InvalidGeometry(format!("boundary face {f} out of range for {n} faces"))
        })?;
        *slot = Some(kind);
        Ok(())
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn kind(&self, f: usize) -> Option<BcKind> {
        self.kinds.get(f).copied().flatten()
    }

    #[inline]
    pub fn is_dirichlet(&self, f: usize) -> bool {
        self.kind(f) == Some(BcKind::Dirichlet)
    }

    #[inline]
    pub fn is_neumann(&self, f: usize) -> bool {
        self.kind(f) == Some(BcKind::Neumann)
    }

    /// Faces with a Dirichlet condition, ascending.
    pub fn dirichlet_faces(&self) -> Vec<usize> {
        (0..self.kinds.len()).filter(|&f| self.is_dirichlet(f)).collect()
    }
}
