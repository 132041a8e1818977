//! Algorithms over mesh graphs: global assembly and fractured grid generation.

pub mod assembly;
pub mod meshgen;

pub use assembly::{AssemblyOptions, Coupler, LinearSystem};
pub use meshgen::{CartGridOptions, cart_grid};
