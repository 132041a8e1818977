mod util;

use mesh_bucket::algs::assembly::{AssemblyOptions, Coupler};
use mesh_bucket::mesh_generation::{line_grid, point_grid};
use mesh_bucket::mesh_graph::MeshGraph;
use mesh_bucket::topology::mortar::Interface;
use mesh_bucket::physics::upwind::Upwind;
use mesh_bucket::physics::upwind_coupling::{MORTAR_FLUX, UpwindCoupling};
use util::*;

const TOL: f64 = 1e-12;

#[test]
fn upwind_2d_beta_positive() {
    let mut graph = fractured_4x2();
    let store = upwind_store(&graph, [2.0, 0.0, 0.0], None);
    let coupler = Coupler::new(Upwind, UpwindCoupling);
    let sys = coupler.assemble(&mut graph, &store).unwrap();

    assert_eq!(sys.dof_map.total_len(), 10);
    assert_entries(
        &sys.matrix,
        &[
            (0, 0, 2.0),
            (1, 0, -2.0),
            (1, 1, 2.0),
            (2, 2, 2.0),
            (2, 9, -2.0),
            (3, 2, -2.0),
            (4, 4, 2.0),
            (5, 4, -2.0),
            (5, 5, 2.0),
            (6, 6, 2.0),
            (6, 8, -2.0),
            (7, 6, -2.0),
            (8, 5, -2.0),
            (8, 8, 2.0),
            (9, 1, -2.0),
            (9, 9, 2.0),
        ],
        TOL,
    );
    assert!(sys.rhs.iter().all(|&r| r == 0.0));
}

#[test]
fn upwind_2d_full_beta_bc_dir() {
    let mut graph = fractured_4x2();
    let aperture: &dyn Fn(usize) -> f64 = &|dim: usize| 0.1f64.powi(2 - dim as i32);
    let mut store = upwind_store(&graph, [1.0, 1.0, 0.0], Some(aperture));
    dirichlet_everywhere(&graph, &mut store, 3.0);

    let sys = Coupler::new(Upwind, UpwindCoupling)
        .assemble(&mut graph, &store)
        .unwrap();

    assert_entries(
        &sys.matrix,
        &[
            (0, 0, 2.0),
            (1, 0, -1.0),
            (1, 1, 2.0),
            (2, 2, 2.0),
            (2, 9, -1.0),
            (3, 2, -1.0),
            (3, 3, 2.0),
            (4, 0, -1.0),
            (4, 4, 2.0),
            (5, 1, -1.0),
            (5, 4, -1.0),
            (5, 5, 2.0),
            (6, 2, -1.0),
            (6, 6, 2.0),
            (6, 8, -1.0),
            (7, 3, -1.0),
            (7, 6, -1.0),
            (7, 7, 2.0),
            (8, 5, -1.0),
            (8, 8, 1.1),
            (8, 9, -0.1),
            (9, 1, -1.0),
            (9, 9, 1.1),
        ],
        TOL,
    );
    let rhs_known = [6.0, 3.0, 3.0, 3.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.3];
    for (got, want) in sys.rhs.iter().zip(rhs_known) {
        assert!((got - want).abs() <= TOL, "rhs {got} != {want}");
    }
}

#[test]
fn zero_mortar_flux_adds_no_coupling() {
    let mut graph = fractured_4x2();
    let mut store = upwind_store(&graph, [2.0, 0.0, 0.0], None);
    let edge = graph.edges().next().unwrap();
    store.set_edge_property(edge, MORTAR_FLUX, vec![0.0; 4]);

    let sys = Coupler::new(Upwind, UpwindCoupling)
        .assemble(&mut graph, &store)
        .unwrap();
    let m = dense(&sys.matrix);
    for i in 0..8 {
        for j in 8..10 {
            assert_eq!(m[i][j], 0.0);
            assert_eq!(m[j][i], 0.0);
        }
    }
    // only the node pass touches the diagonal of the cells next to the fracture
    assert_eq!(m[1][1], 0.0);
    assert_eq!(m[5][5], 0.0);
}

#[test]
fn reassembly_is_bit_identical() {
    let mut graph = fractured_4x2();
    let store = upwind_store(&graph, [1.0, 1.0, 0.0], None);
    let coupler = Coupler::new(Upwind, UpwindCoupling);
    let first = coupler.assemble(&mut graph, &store).unwrap();
    let second = coupler.assemble(&mut graph, &store).unwrap();
    assert_eq!(first, second);

    let parallel = Coupler::with_options(
        Upwind,
        UpwindCoupling,
        AssemblyOptions {
            parallel_discretize: true,
            ..AssemblyOptions::default()
        },
    );
    assert_eq!(parallel.assemble(&mut graph, &store).unwrap(), first);
}

#[test]
fn mortar_flux_follows_parent_orientation() {
    let graph = fractured_4x2();
    let store = upwind_store(&graph, [2.0, 0.0, 0.0], None);
    let edge = graph.edges().next().unwrap();
    // mortar cells: (top, face 7), (bottom, face 2), (top, face 23), (bottom, face 22)
    assert_eq!(
        store.get_edge_property(edge, MORTAR_FLUX).unwrap(),
        &vec![2.0, 2.0, -2.0, -2.0]
    );
}

#[test]
fn point_at_a_line_end_couples_to_one_cell() {
    let line = line_grid(&[[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]).unwrap();
    let point = point_grid([2.0, 0.0, 0.0]).unwrap();
    let interface = Interface::from_face_cells(&line, &point, &[(0, 2)]).unwrap();
    let mut graph = MeshGraph::new();
    let l = graph.add_node(line).unwrap();
    let p = graph.add_node(point).unwrap();
    let edge = graph.add_edge(l, p, interface).unwrap();
    graph.assign_node_ordering();
    graph.compute_geometry().unwrap();

    let mut store = upwind_store(&graph, [1.0, 0.0, 0.0], None);
    let coupler = Coupler::new(Upwind, UpwindCoupling);
    store.set_edge_property(edge, MORTAR_FLUX, vec![1.0]);
    let coupled = dense(&coupler.assemble(&mut graph, &store).unwrap().matrix);
    store.set_edge_property(edge, MORTAR_FLUX, vec![0.0]);
    let uncoupled = dense(&coupler.assemble(&mut graph, &store).unwrap().matrix);

    // dofs: line cells 0..2, then the point
    let mut expected = vec![vec![0.0; 3]; 3];
    expected[1][1] = 1.0;
    expected[2][1] = -1.0;
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(coupled[i][j] - uncoupled[i][j], expected[i][j], "entry ({i}, {j})");
        }
    }
}
