//! Reference physics: upwind transport, mass matrices and sources.

pub mod mass_matrix;
pub mod source;
pub mod upwind;
pub mod upwind_coupling;

pub use mass_matrix::{InvMassMatrix, MassMatrix, NoCoupling};
pub use source::Integral;
pub use upwind::Upwind;
pub use upwind_coupling::UpwindCoupling;
