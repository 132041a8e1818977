#![allow(dead_code)]
use mesh_bucket::algs::meshgen::{CartGridOptions, cart_grid};
use mesh_bucket::data::bc::BoundaryCondition;
use mesh_bucket::data::properties::PropertyStore;
use mesh_bucket::data::sparse::csr_value;
use mesh_bucket::mesh_graph::MeshGraph;
use mesh_bucket::physics::upwind::{BC, BC_VALUES, FACE_FLUX, Upwind};
use mesh_bucket::physics::upwind_coupling::{MORTAR_FLUX, UpwindCoupling};
use nalgebra_sparse::CsrMatrix;

/// 4x2 unit grid cut by the vertical fracture x = 2.
pub fn fractured_4x2() -> MeshGraph {
    let mut graph = cart_grid(&[[[2.0, 2.0], [0.0, 2.0]]], [4, 2], CartGridOptions::default())
        .unwrap();
    graph.assign_node_ordering();
    graph.compute_geometry().unwrap();
    graph
}

/// Face fluxes of `velocity` on every mesh and the matching mortar fluxes on
/// every edge. `aperture(dim)` scales the fluxes; `None` means unit aperture.
pub fn upwind_store(
    graph: &MeshGraph,
    velocity: [f64; 3],
    aperture: Option<&dyn Fn(usize) -> f64>,
) -> PropertyStore {
    let mut store = PropertyStore::new();
    for id in graph.nodes() {
        let mesh = graph.mesh(id).unwrap();
        let apertures = aperture.map(|a| vec![a(mesh.dim()); mesh.num_cells()]);
        let flux = Upwind::beta_n(mesh, velocity, apertures.as_deref()).unwrap();
        store.set_node_property(id, FACE_FLUX, flux);
    }
    for edge in graph.edges() {
        let (parent, _) = graph.sorted_nodes_of_edge(edge).unwrap();
        let flux = store.get_node_property(parent, FACE_FLUX).unwrap();
        let lambda =
            UpwindCoupling::mortar_flux(graph.interface(edge).unwrap(), graph.mesh(parent).unwrap(), flux)
                .unwrap();
        store.set_edge_property(edge, MORTAR_FLUX, lambda);
    }
    store
}

/// Dirichlet on the domain boundary of every mesh, all boundary values `value`.
pub fn dirichlet_everywhere(graph: &MeshGraph, store: &mut PropertyStore, value: f64) {
    for id in graph.nodes() {
        let mesh = graph.mesh(id).unwrap();
        store.set_node_property(id, BC, BoundaryCondition::dirichlet(mesh));
        store.set_node_property(id, BC_VALUES, vec![value; mesh.num_faces()]);
    }
}

pub fn dense(m: &CsrMatrix<f64>) -> Vec<Vec<f64>> {
    (0..m.nrows())
        .map(|i| (0..m.ncols()).map(|j| csr_value(m, i, j)).collect())
        .collect()
}

/// Compare a sparse matrix against `(row, col, value)` entries; everything
/// else must be zero.
pub fn assert_entries(m: &CsrMatrix<f64>, entries: &[(usize, usize, f64)], tol: f64) {
    let mut want = vec![vec![0.0; m.ncols()]; m.nrows()];
    for &(i, j, v) in entries {
        want[i][j] = v;
    }
    let got = dense(m);
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            assert!(
                (got[i][j] - want[i][j]).abs() <= tol,
                "M[{i},{j}] = {}, expected {}",
                got[i][j],
                want[i][j]
            );
        }
    }
}
