mod util;

use mesh_bucket::algs::assembly::Coupler;
use mesh_bucket::data::properties::PropertyStore;
use mesh_bucket::mesh_error::MeshError;
use mesh_bucket::mesh_graph::MeshGraph;
use mesh_bucket::physics::mass_matrix::{InvMassMatrix, MassMatrix, NoCoupling, POROSITY, TIME_STEP};
use mesh_bucket::physics::source::{Integral, SOURCE};
use mesh_bucket::physics::upwind::APERTURE;
use mesh_bucket::topology::handle::GridKey;
use nalgebra::DVector;
use util::{dense, fractured_4x2};

fn storage_store(graph: &MeshGraph, porosity: f64) -> PropertyStore {
    let mut store = PropertyStore::new();
    for id in graph.nodes() {
        let mesh = graph.mesh(id).unwrap();
        let n = mesh.num_cells();
        let aperture = 0.1f64.powi(2 - mesh.dim() as i32);
        store.set_node_property(id, POROSITY, vec![porosity; n]);
        store.set_node_property(id, APERTURE, vec![aperture; n]);
        store.set_node_property(id, TIME_STEP, 0.5);
    }
    store
}

#[test]
fn lumped_mass_scales_with_aperture() {
    let mut graph = fractured_4x2();
    let store = storage_store(&graph, 0.2);
    let sys = Coupler::new(MassMatrix, NoCoupling)
        .assemble(&mut graph, &store)
        .unwrap();
    let m = dense(&sys.matrix);
    for i in 0..10 {
        let expected = if i < 8 { 0.4 } else { 0.04 };
        assert!((m[i][i] - expected).abs() < 1e-12, "M[{i},{i}] = {}", m[i][i]);
        for j in (0..10).filter(|&j| j != i) {
            assert_eq!(m[i][j], 0.0);
        }
    }
    assert_eq!(sys.matrix.nnz(), 10);

    let inv = Coupler::new(InvMassMatrix, NoCoupling)
        .assemble(&mut graph, &store)
        .unwrap();
    let m = dense(&inv.matrix);
    assert!((m[0][0] - 2.5).abs() < 1e-12);
    assert!((m[9][9] - 25.0).abs() < 1e-9);
}

#[test]
fn zero_mass_cannot_be_inverted() {
    let mut graph = fractured_4x2();
    let store = storage_store(&graph, 0.0);
    let parent = graph.meshes_of_dimension(2)[0];
    let err = Coupler::new(InvMassMatrix, NoCoupling)
        .assemble(&mut graph, &store)
        .unwrap_err();
    assert!(matches!(
        err,
        MeshError::Discretization { owner: GridKey::Node(id), .. } if id == parent
    ));
}

#[test]
fn non_positive_time_step_is_rejected() {
    let mut graph = fractured_4x2();
    let mut store = storage_store(&graph, 0.2);
    let fracture = graph.meshes_of_dimension(1)[0];
    store.set_node_property(fracture, TIME_STEP, 0.0);
    assert!(
        Coupler::new(MassMatrix, NoCoupling)
            .assemble(&mut graph, &store)
            .is_err()
    );
}

#[test]
fn split_and_merge_follow_the_dof_map() {
    let mut graph = fractured_4x2();
    let mut store = PropertyStore::new();
    for id in graph.nodes() {
        let n = graph.mesh(id).unwrap().num_cells();
        let rank = graph.node_number(id).unwrap() as f64;
        store.set_node_property(id, SOURCE, vec![rank + 1.0; n]);
    }
    let coupler = Coupler::new(Integral, NoCoupling);
    let sys = coupler.assemble(&mut graph, &store).unwrap();
    assert_eq!(sys.matrix.nnz(), 0);

    let parts = coupler.split(&sys.dof_map, &sys.rhs).unwrap();
    let ids: Vec<_> = graph.nodes().collect();
    assert_eq!(parts[&GridKey::Node(ids[0])], DVector::from_element(8, 1.0));
    assert_eq!(parts[&GridKey::Node(ids[1])], DVector::from_element(2, 2.0));
    let edge = graph.edges().next().unwrap();
    assert_eq!(parts[&GridKey::Edge(edge)].len(), 0);
    assert_eq!(coupler.merge(&sys.dof_map, &parts).unwrap(), sys.rhs);

    let mut short = parts.clone();
    short.insert(GridKey::Node(ids[1]), DVector::zeros(1));
    assert!(matches!(
        coupler.merge(&sys.dof_map, &short),
        Err(MeshError::VectorLengthMismatch { expected: 2, found: 1, .. })
    ));
    let mut missing = parts;
    missing.remove(&GridKey::Node(ids[0]));
    assert!(matches!(
        coupler.merge(&sys.dof_map, &missing),
        Err(MeshError::DofMapInvariant(_))
    ));
}
