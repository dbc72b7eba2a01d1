// End-to-end tests for graph construction and editing.
//
// Builds graphs from small corridor maps (navmeshes laid end to end along
// +X, touching at Exit-flagged quads) and checks the structural properties
// every built graph must have: dead ends, edge/navmesh consistency,
// determinism, and stable naming. Also loads a map from JSON the way the
// `mcg` binary does.

use glam::Vec3;
use mcg_nav::maintenance::{normalize_names, recompute_all_edge_costs, validate_graph};
use mcg_nav::test_meshes;
use mcg_nav::types::NavmeshId;
use mcg_nav::{Graph, NavGraphConfig, NavmeshRegistry, build_graph, find_best_cost};

/// `n0000 - n0001 - n0002` in a line. Each outer navmesh touches only the
/// middle one.
fn line_of_three() -> NavmeshRegistry {
    NavmeshRegistry::new(vec![
        test_meshes::corridor("n0000", Vec3::ZERO, 2, false, true).unwrap(),
        test_meshes::corridor("n0001", Vec3::new(2.0, 0.0, 0.0), 4, true, true).unwrap(),
        test_meshes::corridor("n0002", Vec3::new(6.0, 0.0, 0.0), 2, true, false).unwrap(),
    ])
}

/// A hub `n0010` with a spoke at each end. The far spoke `n0012` leads on
/// to `n0013`.
fn hub_and_spokes() -> NavmeshRegistry {
    NavmeshRegistry::new(vec![
        test_meshes::corridor("n0011", Vec3::new(-2.0, 0.0, 0.0), 2, false, true).unwrap(),
        test_meshes::corridor("n0010", Vec3::ZERO, 6, true, true).unwrap(),
        test_meshes::corridor("n0012", Vec3::new(6.0, 0.0, 0.0), 4, true, true).unwrap(),
        test_meshes::corridor("n0013", Vec3::new(10.0, 0.0, 0.0), 2, true, false).unwrap(),
    ])
}

/// Every edge's navmesh is on both endpoints, with triangles there.
fn assert_edges_consistent(graph: &Graph) {
    for edge in &graph.edges {
        let navmesh = edge.navmesh.expect("built edges always have a navmesh");
        for end in [edge.node_a, edge.node_b] {
            let node = graph.node(end).unwrap();
            let tris = node
                .triangles_for(navmesh)
                .unwrap_or_else(|| panic!("{} is missing {navmesh}", node.name));
            assert!(!tris.is_empty(), "{} has no triangles on {navmesh}", node.name);
        }
    }
}

/// A navmesh touched by exactly one node is that node's dead end, and no
/// edge runs through it.
fn assert_dead_ends(graph: &Graph, registry: &NavmeshRegistry) {
    for (id, navmesh) in registry.iter() {
        let nodes = graph.nodes_referencing(id);
        if nodes.len() == 1 {
            let node = graph.node(nodes[0]).unwrap();
            assert_eq!(node.dead_end_navmesh, Some(id), "{}", navmesh.name);
            assert!(graph.edges_on(id).is_empty(), "{}", navmesh.name);
        }
    }
}

#[test]
fn line_of_three_end_to_end() {
    let registry = line_of_three();
    let config = NavGraphConfig::default();
    let graph = build_graph(&registry, &config).unwrap();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.edges_on(NavmeshId(0)).is_empty());
    assert!(graph.edges_on(NavmeshId(2)).is_empty());

    let edge = &graph.edges[0];
    assert_eq!(edge.navmesh, Some(NavmeshId(1)));
    let start = graph.nodes[0].start_triangle(NavmeshId(1)).unwrap();
    let end = graph.nodes[1].start_triangle(NavmeshId(1)).unwrap();
    let expected = find_best_cost(&registry.navmeshes()[1].mesh, start, end, &config).unwrap();
    assert_eq!(edge.cost, expected);

    assert_dead_ends(&graph, &registry);
    assert_edges_consistent(&graph);
    validate_graph(&graph, &registry).unwrap();
}

#[test]
fn hub_graph_properties() {
    let registry = hub_and_spokes();
    let graph = build_graph(&registry, &NavGraphConfig::default()).unwrap();

    // n0011|n0010, n0010|n0012, n0012|n0013.
    assert_eq!(graph.node_count(), 3);
    // One edge on n0010, one on n0012.
    assert_eq!(graph.edge_count(), 2);
    let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Node [0010-0011]", "Node [0010-0012]", "Node [0012-0013]"]
    );
    assert_eq!(graph.nodes[0].navmesh_a, Some(NavmeshId(1)));

    assert_dead_ends(&graph, &registry);
    assert_edges_consistent(&graph);
    validate_graph(&graph, &registry).unwrap();
    assert_eq!(graph.connections(graph.nodes_referencing(NavmeshId(2))[0]).len(), 2);
}

#[test]
fn builds_are_deterministic() {
    for registry in [line_of_three(), hub_and_spokes()] {
        let first = build_graph(&registry, &NavGraphConfig::default()).unwrap();
        let second = build_graph(&registry, &NavGraphConfig::default()).unwrap();
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(a.navmesh_a_triangles, b.navmesh_a_triangles);
            assert_eq!(a.navmesh_b_triangles, b.navmesh_b_triangles);
        }
        for (a, b) in first.edges.iter().zip(&second.edges) {
            assert_eq!((a.node_a, a.node_b, a.navmesh), (b.node_a, b.node_b, b.navmesh));
        }
    }
}

#[test]
fn renaming_twice_is_stable() {
    let registry = hub_and_spokes();
    let mut graph = build_graph(&registry, &NavGraphConfig::default()).unwrap();
    let built = graph.clone();

    normalize_names(&mut graph, &registry).unwrap();
    let once = graph.clone();
    normalize_names(&mut graph, &registry).unwrap();
    assert_eq!(graph, once);
    // The builder already produces normalized names.
    assert_eq!(graph, built);
}

#[test]
fn recomputed_costs_match_built_costs() {
    let registry = hub_and_spokes();
    let config = NavGraphConfig::default();
    let mut graph = build_graph(&registry, &config).unwrap();
    let costs = recompute_all_edge_costs(&mut graph, &registry, &config).unwrap();
    for (edge, cost) in graph.edges.iter().zip(costs) {
        assert_eq!(edge.cost, cost);
        assert_eq!(edge.proposed_cost, Some(cost));
    }
}

#[test]
fn map_loads_from_json() {
    // Two unit quads per navmesh; n0001 sits between the others. Flag 32 is
    // Exit.
    let json = r#"[
        {
            "name": "n0000B0",
            "vertices": [[0,0,0],[0,0,1],[1,0,0],[1,0,1]],
            "faces": [[0,2,1],[2,3,1]],
            "flags": [32, 32]
        },
        {
            "name": "n0001B0",
            "world_offset": [1, 0, 0],
            "vertices": [[0,0,0],[0,0,1],[1,0,0],[1,0,1],[2,0,0],[2,0,1],[3,0,0],[3,0,1]],
            "faces": [[0,2,1],[2,3,1],[2,4,3],[4,5,3],[4,6,5],[6,7,5]],
            "flags": [32, 32, 0, 0, 32, 32]
        },
        {
            "name": "n0002B0",
            "world_offset": [4, 0, 0],
            "vertices": [[0,0,0],[0,0,1],[1,0,0],[1,0,1]],
            "faces": [[0,2,1],[2,3,1]],
            "flags": [32, 32]
        }
    ]"#;
    let registry = NavmeshRegistry::from_json_str(json).unwrap();
    let graph = build_graph(&registry, &NavGraphConfig::default()).unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edges[0].name, "Edge [0001] (0)");
    assert_eq!(graph.nodes[0].navmesh_b_triangles, vec![0, 1]);
    assert_eq!(graph.nodes[1].navmesh_a_triangles, vec![4, 5]);
    validate_graph(&graph, &registry).unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let restored: Graph = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, graph);
}
