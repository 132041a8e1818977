//! Geometric quantities of meshes: measures, centroids and oriented normals.

pub mod metrics;
