use mesh_bucket::DebugInvariants;
use mesh_bucket::mesh_error::MeshError;
use mesh_bucket::mesh_generation::{cart_grid_2d, line_grid, point_grid};
use mesh_bucket::mesh_graph::MeshGraph;
use mesh_bucket::topology::labels::FRACTURE;
use mesh_bucket::topology::mesh::Mesh;
use mesh_bucket::topology::mortar::Interface;

/// 2x1 square cells, the boundary line x = 0 and the point at its foot.
fn square_line_point() -> (Mesh, Mesh, Mesh) {
    let square = cart_grid_2d([2, 1], [2.0, 1.0]).unwrap();
    let line = line_grid(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
    let point = point_grid([0.0, 0.0, 0.0]).unwrap();
    (square, line, point)
}

fn square_line(square: &Mesh, line: &Mesh) -> Interface {
    // x-face 0 joins vertices 0 and 3
    Interface::from_face_cells(square, line, &[(0, 0)]).unwrap()
}

fn line_point(line: &Mesh, point: &Mesh) -> Interface {
    Interface::from_face_cells(line, point, &[(0, 0)]).unwrap()
}

#[test]
fn node_ordering_is_by_descending_dimension_then_insertion() {
    let (square, line, point) = square_line_point();
    let line2 = line_grid(&[[0.0, 0.5, 0.0], [1.0, 0.5, 0.0]]).unwrap();
    let mut g = MeshGraph::new();
    let p = g.add_node(point).unwrap();
    let l = g.add_node(line).unwrap();
    let s = g.add_node(square).unwrap();
    let l2 = g.add_node(line2).unwrap();

    assert!(!g.is_ordered());
    let order = g.assign_node_ordering().to_vec();
    assert_eq!(order, vec![s, l, l2, p]);
    assert_eq!(g.assign_node_ordering().to_vec(), order);
    assert_eq!(g.nodes().collect::<Vec<_>>(), order);
    assert_eq!(g.node_number(p).unwrap(), 3);
    assert_eq!(g.meshes_of_dimension(1), vec![l, l2]);
    assert_eq!((g.dim_max(), g.dim_min()), (Some(2), Some(0)));
    assert_eq!(
        g.size_by_dimension().into_iter().collect::<Vec<_>>(),
        vec![(0, 1), (1, 2), (2, 1)]
    );
}

#[test]
fn nodes_cannot_be_added_after_freezing() {
    let (square, line, _) = square_line_point();
    let mut g = MeshGraph::new();
    g.add_node(square).unwrap();
    g.assign_node_ordering();
    let id = line.id();
    assert_eq!(g.add_node(line), Err(MeshError::AlreadyOrdered(id)));
}

#[test]
fn duplicate_nodes_are_rejected() {
    let (square, _, _) = square_line_point();
    let copy = square.clone();
    let mut g = MeshGraph::new();
    let s = g.add_node(square).unwrap();
    assert_eq!(g.add_node(copy), Err(MeshError::DuplicateNode(s)));
}

#[test]
fn edges_connect_adjacent_dimensions_only() {
    let (square, line, point) = square_line_point();
    let sl = square_line(&square, &line);
    let lp = line_point(&line, &point);
    let sp = Interface::from_face_cells(&line, &point, &[(0, 0)]).unwrap();

    let mut g = MeshGraph::new();
    let s = g.add_node(square).unwrap();
    let l = g.add_node(line).unwrap();
    let p = g.add_node(point).unwrap();

    assert_eq!(g.add_edge(s, s, sl.clone()), Err(MeshError::SelfLoop(s)));
    assert!(matches!(
        g.add_edge(s, p, sp),
        Err(MeshError::DimensionMismatch {
            parent_dim: 2,
            child_dim: 0,
            ..
        })
    ));
    // wrong direction: the child is passed as parent
    assert!(matches!(
        g.add_edge(l, s, sl.clone()),
        Err(MeshError::DimensionMismatch { .. })
    ));

    let e = g.add_edge(s, l, sl.clone()).unwrap();
    assert_eq!(
        g.add_edge(s, l, sl),
        Err(MeshError::DuplicateEdge {
            parent: s,
            child: l
        })
    );
    assert_eq!(g.sorted_nodes_of_edge(e).unwrap(), (s, l));
    assert_eq!(g.edge_between(s, l), Some(e));
    assert_eq!(g.edge_between(l, s), None);
    g.add_edge(l, p, lp).unwrap();
    assert_eq!(g.num_edges(), 2);
    g.validate_invariants().unwrap();
}

#[test]
fn unknown_nodes_are_reported() {
    let (square, line, _) = square_line_point();
    let sl = square_line(&square, &line);
    let missing = line.id();
    let mut g = MeshGraph::new();
    let s = g.add_node(square).unwrap();
    assert_eq!(g.add_edge(s, missing, sl), Err(MeshError::UnknownNode(missing)));
    assert!(matches!(g.mesh(missing), Err(MeshError::UnknownNode(_))));
}

#[test]
fn interface_must_fit_its_endpoints() {
    let (square, line, _) = square_line_point();
    let other_square = cart_grid_2d([3, 1], [3.0, 1.0]).unwrap();
    // built against a square with more faces
    let bad = Interface::from_face_cells(&other_square, &line, &[(0, 0)]).unwrap();
    let mut g = MeshGraph::new();
    let s = g.add_node(square).unwrap();
    let l = g.add_node(line).unwrap();
    assert!(matches!(
        g.add_edge(s, l, bad),
        Err(MeshError::InterfaceShapeMismatch(_))
    ));
}

#[test]
fn interface_on_an_unsplit_interior_face_is_rejected() {
    let square = cart_grid_2d([2, 1], [2.0, 1.0]).unwrap();
    let line = line_grid(&[[1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]).unwrap();
    // x-face 1 sits between cells 0 and 1
    assert_eq!(square.cells_of_face(1).count(), 2);
    assert!(matches!(
        Interface::from_face_cells(&square, &line, &[(0, 1)]),
        Err(MeshError::InterfaceShapeMismatch(_))
    ));
}

#[test]
fn face_labels_can_be_edited_through_the_graph() {
    let (square, line, _) = square_line_point();
    let missing = line.id();
    let mut g = MeshGraph::new();
    let s = g.add_node(square).unwrap();
    g.face_labels_mut(s).unwrap().set_label(0, FRACTURE, 1);
    assert_eq!(g.mesh(s).unwrap().face_labels().stratum_points(FRACTURE, 1), vec![0]);
    assert_eq!(g.mesh(s).unwrap().dim(), 2);
    assert!(matches!(
        g.face_labels_mut(missing),
        Err(MeshError::UnknownNode(_))
    ));
    g.assign_node_ordering();
    g.validate_invariants().unwrap();
}

#[test]
fn edges_follow_node_order() {
    let (square, line, point) = square_line_point();
    let sl = square_line(&square, &line);
    let lp = line_point(&line, &point);
    let mut g = MeshGraph::new();
    let p = g.add_node(point).unwrap();
    let l = g.add_node(line).unwrap();
    let s = g.add_node(square).unwrap();
    let e_lp = g.add_edge(l, p, lp).unwrap();
    let e_sl = g.add_edge(s, l, sl).unwrap();

    g.assign_node_ordering();
    assert_eq!(g.edges().collect::<Vec<_>>(), vec![e_sl, e_lp]);
    assert_eq!(g.edges_of_node(l).unwrap(), vec![e_sl, e_lp]);
    assert_eq!(g.edges_of_node(s).unwrap(), vec![e_sl]);
}

#[test]
fn geometry_reaches_every_mesh_and_mortar() {
    let (square, line, point) = square_line_point();
    let sl = square_line(&square, &line);
    let lp = line_point(&line, &point);
    let mut g = MeshGraph::new();
    let s = g.add_node(square).unwrap();
    let l = g.add_node(line).unwrap();
    let p = g.add_node(point).unwrap();
    let e = g.add_edge(s, l, sl).unwrap();
    g.add_edge(l, p, lp).unwrap();

    g.compute_geometry().unwrap();
    g.compute_geometry().unwrap();
    for id in [s, l, p] {
        assert!(g.mesh(id).unwrap().has_geometry());
    }
    let volumes = g.interface(e).unwrap().mortar().cell_volumes().unwrap();
    assert_eq!(volumes, vec![1.0]);
}
