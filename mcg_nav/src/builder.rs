// Auto-MCG: builds a navigation graph from the exit clusters of a map's
// navmeshes.
//
// Build steps:
// 1. Every navmesh name must start with a model ID (`n` + 4 digits); the
//    first one that doesn't fails the build.
// 2. Exit clusters are found per navmesh (on the rayon pool when
//    `NavGraphConfig::parallel` is set; results stay in navmesh order).
// 3. For every pair of navmeshes `i < j` and every pair of their clusters,
//    the clusters touch if some triangle pair has at least two matching
//    world-space corners (a shared edge). Each touching cluster pair becomes
//    one node. The navmesh with the lower model ID is put on side A; equal
//    model IDs keep input order. Iterating `i < j` visits each cluster pair
//    exactly once, so no junction is created twice.
// 4. Nodes on the same model pair get ` (0)`, ` (1)`, ... suffixes; the first
//    node is renamed when its first sibling appears.
// 5. Per navmesh, in map order: a navmesh with exactly one node makes that
//    node its dead end (a node can be a dead end only once). A navmesh with
//    two or more nodes gets an edge for every pair, costed with
//    `find_best_cost` between the nodes' start triangles on that navmesh.
//    A 0.0 cost (no path either way) is replaced by
//    `NavGraphConfig::no_path_fallback_cost`.
//
// Any error aborts the whole build and no graph is returned.
//
// See also: `clusters.rs`, `pathfinding.rs`, `graph.rs`.

use crate::clusters::{ExitCluster, find_exit_clusters};
use crate::config::NavGraphConfig;
use crate::error::{NavGraphError, Result};
use crate::graph::{Edge, Graph, Node, edge_base_name, indexed_name, node_base_name};
use crate::navmesh::{ModelId, NavmeshRegistry};
use crate::pathfinding::find_best_cost;
use crate::types::{NavmeshId, NodeId, TriIndex};
use glam::Vec3;
use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// One side of a junction: a navmesh and one of its clusters.
#[derive(Clone, Copy, Debug)]
struct ClusterRef {
    navmesh: NavmeshId,
    #[allow(dead_code)]
    cluster: usize,
}

/// An edge waiting to be costed.
struct PendingEdge {
    name: String,
    navmesh: NavmeshId,
    node_a: NodeId,
    node_b: NodeId,
    start: TriIndex,
    end: TriIndex,
}

/// Build the navigation graph for a map's ordered navmesh list.
pub fn build_graph(registry: &NavmeshRegistry, config: &NavGraphConfig) -> Result<Graph> {
    let models: Vec<ModelId> = registry
        .navmeshes()
        .iter()
        .map(|navmesh| navmesh.model_id())
        .collect::<Result<_>>()?;

    let clusters: Vec<Vec<ExitCluster>> = if config.parallel {
        registry
            .navmeshes()
            .par_iter()
            .map(find_exit_clusters)
            .collect()
    } else {
        registry.navmeshes().iter().map(find_exit_clusters).collect()
    };
    debug!(
        "found {} exit clusters across {} navmeshes",
        clusters.iter().map(Vec::len).sum::<usize>(),
        registry.len()
    );

    let mut graph = Graph::new();
    create_nodes(&mut graph, &models, &clusters, config);

    let pending = assign_dead_ends_and_plan_edges(&mut graph, registry, &models)?;
    let costs: Vec<f32> = if config.parallel {
        pending
            .par_iter()
            .map(|edge| edge_cost(registry, edge, config))
            .collect::<Result<_>>()?
    } else {
        pending
            .iter()
            .map(|edge| edge_cost(registry, edge, config))
            .collect::<Result<_>>()?
    };

    for (edge, cost) in pending.into_iter().zip(costs) {
        graph.add_edge(Edge {
            name: edge.name,
            node_a: edge.node_a,
            node_b: edge.node_b,
            navmesh: Some(edge.navmesh),
            cost,
            proposed_cost: None,
        });
    }

    info!(
        "built navigation graph: {} nodes, {} edges from {} navmeshes",
        graph.node_count(),
        graph.edge_count(),
        registry.len()
    );
    Ok(graph)
}

fn create_nodes(
    graph: &mut Graph,
    models: &[ModelId],
    clusters: &[Vec<ExitCluster>],
    config: &NavGraphConfig,
) {
    let match_distance_sq = config.vertex_match_distance_sq();
    let mut siblings: FxHashMap<(ModelId, ModelId), Vec<NodeId>> = FxHashMap::default();

    for (i, clusters_i) in clusters.iter().enumerate() {
        for (j, clusters_j) in clusters.iter().enumerate().skip(i + 1) {
            for (ci, cluster_i) in clusters_i.iter().enumerate() {
                for (cj, cluster_j) in clusters_j.iter().enumerate() {
                    if !cluster_i.shares_edge_with(cluster_j, match_distance_sq) {
                        continue;
                    }

                    let here = ClusterRef {
                        navmesh: NavmeshId(i as u32),
                        cluster: ci,
                    };
                    let there = ClusterRef {
                        navmesh: NavmeshId(j as u32),
                        cluster: cj,
                    };
                    let (a, cluster_a, b, cluster_b) = if models[j] < models[i] {
                        (there, cluster_j, here, cluster_i)
                    } else {
                        (here, cluster_i, there, cluster_j)
                    };
                    let pair = (models[a.navmesh.index()], models[b.navmesh.index()]);

                    let base = node_base_name(pair.0, pair.1);
                    let group = siblings.entry(pair).or_default();
                    let name = match group.len() {
                        0 => base.clone(),
                        1 => {
                            let first = group[0];
                            graph.nodes[first.index()].name = indexed_name(&base, 0);
                            indexed_name(&base, 1)
                        }
                        k => indexed_name(&base, k),
                    };

                    let node = Node::new(
                        name,
                        junction_position(cluster_a, cluster_b),
                        a.navmesh,
                        cluster_a.triangle_indices(),
                        b.navmesh,
                        cluster_b.triangle_indices(),
                    );
                    debug!(
                        "node '{}': {} triangles on A, {} on B",
                        node.name,
                        node.navmesh_a_triangles.len(),
                        node.navmesh_b_triangles.len()
                    );
                    group.push(graph.add_node(node));
                }
            }
        }
    }
}

/// Mean of every triangle corner in both clusters.
fn junction_position(a: &ExitCluster, b: &ExitCluster) -> Vec3 {
    let (sum, count) = a
        .world_vertices()
        .chain(b.world_vertices())
        .fold((Vec3::ZERO, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        Vec3::ZERO
    } else {
        sum / count as f32
    }
}

fn assign_dead_ends_and_plan_edges(
    graph: &mut Graph,
    registry: &NavmeshRegistry,
    models: &[ModelId],
) -> Result<Vec<PendingEdge>> {
    let mut pending = Vec::new();

    for (navmesh_id, navmesh) in registry.iter() {
        let referencing = graph.nodes_referencing(navmesh_id);
        match referencing.as_slice() {
            [] => debug!("navmesh '{}' has no nodes", navmesh.name),
            &[only] => {
                let node = graph.node_mut(only)?;
                if let Some(previous) = node.dead_end_navmesh {
                    return Err(NavGraphError::DeadEndConflict {
                        node: node.name.clone(),
                        first: registry.display_name(previous),
                        second: navmesh.name.clone(),
                    });
                }
                node.dead_end_navmesh = Some(navmesh_id);
                debug!("navmesh '{}' is a dead end of '{}'", navmesh.name, node.name);
            }
            nodes => {
                let base = edge_base_name(models[navmesh_id.index()]);
                let mut index = 0;
                for (x, &node_a) in nodes.iter().enumerate() {
                    for &node_b in &nodes[x + 1..] {
                        let start = start_triangle(graph, registry, node_a, navmesh_id)?;
                        let end = start_triangle(graph, registry, node_b, navmesh_id)?;
                        if start == end {
                            return Err(NavGraphError::DuplicateStartTriangle {
                                node_a: graph.node(node_a)?.name.clone(),
                                node_b: graph.node(node_b)?.name.clone(),
                                navmesh: navmesh.name.clone(),
                                triangle: start,
                            });
                        }
                        pending.push(PendingEdge {
                            name: indexed_name(&base, index),
                            navmesh: navmesh_id,
                            node_a,
                            node_b,
                            start,
                            end,
                        });
                        index += 1;
                    }
                }
            }
        }
    }

    Ok(pending)
}

fn start_triangle(
    graph: &Graph,
    registry: &NavmeshRegistry,
    node: NodeId,
    navmesh: NavmeshId,
) -> Result<TriIndex> {
    let node = graph.node(node)?;
    node.start_triangle(navmesh)
        .ok_or_else(|| NavGraphError::NodeHasNoTriangles {
            node: node.name.clone(),
            navmesh: registry.display_name(navmesh),
        })
}

fn edge_cost(registry: &NavmeshRegistry, edge: &PendingEdge, config: &NavGraphConfig) -> Result<f32> {
    let navmesh = registry.get(edge.navmesh)?;
    let cost = find_best_cost(&navmesh.mesh, edge.start, edge.end, config)?;
    if cost == 0.0 {
        warn!(
            "edge '{}': no path between triangles {} and {} on '{}'; using fallback cost {}",
            edge.name, edge.start, edge.end, navmesh.name, config.no_path_fallback_cost
        );
        return Ok(config.no_path_fallback_cost);
    }
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh;
    use crate::navmesh::Navmesh;
    use crate::test_meshes;
    use crate::types::TriangleFlags;

    fn chain_of_three() -> NavmeshRegistry {
        NavmeshRegistry::new(vec![
            test_meshes::corridor("n0000", Vec3::ZERO, 2, false, true).unwrap(),
            test_meshes::corridor("n0001", Vec3::new(2.0, 0.0, 0.0), 3, true, true).unwrap(),
            test_meshes::corridor("n0002", Vec3::new(5.0, 0.0, 0.0), 2, true, false).unwrap(),
        ])
    }

    /// Two exit quads on either side of a gap: at x in [-1, 0] and [3, 4].
    fn split_pads(name: &str) -> Navmesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for x0 in [-1.0f32, 3.0] {
            let base = vertices.len() as u32;
            vertices.extend([
                Vec3::new(x0, 0.0, 0.0),
                Vec3::new(x0, 0.0, 1.0),
                Vec3::new(x0 + 1.0, 0.0, 0.0),
                Vec3::new(x0 + 1.0, 0.0, 1.0),
            ]);
            faces.push([base, base + 2, base + 1]);
            faces.push([base + 2, base + 3, base + 1]);
        }
        let flags = vec![TriangleFlags::EXIT; faces.len()];
        let mesh = TriMesh::new(vertices, faces, Some(flags), None).unwrap();
        Navmesh::new(name, Vec3::ZERO, mesh)
    }

    #[test]
    fn chain_builds_two_dead_ends_and_one_edge() {
        let registry = chain_of_three();
        let config = NavGraphConfig::default();
        let graph = build_graph(&registry, &config).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let first = &graph.nodes[0];
        assert_eq!(first.name, "Node [0000-0001]");
        assert_eq!(first.navmesh_a, Some(NavmeshId(0)));
        assert_eq!(first.navmesh_a_triangles, vec![2, 3]);
        assert_eq!(first.navmesh_b, Some(NavmeshId(1)));
        assert_eq!(first.navmesh_b_triangles, vec![0, 1]);
        assert_eq!(first.dead_end_navmesh, Some(NavmeshId(0)));
        assert!(first.position.distance(Vec3::new(2.0, 0.0, 0.5)) < 1e-5);

        let second = &graph.nodes[1];
        assert_eq!(second.name, "Node [0001-0002]");
        assert_eq!(second.dead_end_navmesh, Some(NavmeshId(2)));

        let edge = &graph.edges[0];
        assert_eq!(edge.name, "Edge [0001] (0)");
        assert_eq!(edge.navmesh, Some(NavmeshId(1)));
        assert_eq!((edge.node_a, edge.node_b), (NodeId(0), NodeId(1)));
        let expected = find_best_cost(&registry.navmeshes()[1].mesh, 0, 4, &config).unwrap();
        assert_eq!(edge.cost, expected);
        assert!(edge.cost > 0.0);
    }

    #[test]
    fn lower_model_id_goes_on_side_a() {
        let registry = NavmeshRegistry::new(vec![
            test_meshes::corridor("n0005", Vec3::ZERO, 1, false, true).unwrap(),
            test_meshes::corridor("n0002", Vec3::new(1.0, 0.0, 0.0), 3, true, true).unwrap(),
            test_meshes::corridor("n0009", Vec3::new(4.0, 0.0, 0.0), 1, true, false).unwrap(),
        ]);
        let graph = build_graph(&registry, &NavGraphConfig::default()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.nodes[0].name, "Node [0002-0005]");
        assert_eq!(graph.nodes[0].navmesh_a, Some(NavmeshId(1)));
        assert_eq!(graph.nodes[0].navmesh_b, Some(NavmeshId(0)));
        assert_eq!(graph.nodes[1].name, "Node [0002-0009]");
        assert_eq!(graph.nodes[1].navmesh_a, Some(NavmeshId(1)));
        assert_eq!(graph.edges[0].name, "Edge [0002] (0)");
    }

    #[test]
    fn sibling_nodes_get_suffixes_and_unreachable_edges_fall_back() {
        let registry = NavmeshRegistry::new(vec![
            test_meshes::corridor("n0000", Vec3::ZERO, 3, true, true).unwrap(),
            split_pads("n0001"),
        ]);
        let config = NavGraphConfig::default();
        let graph = build_graph(&registry, &config).unwrap();

        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Node [0000-0001] (0)", "Node [0000-0001] (1)"]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges[0].name, "Edge [0000] (0)");
        assert_eq!(graph.edges[1].name, "Edge [0001] (0)");
        // The two pads of n0001 are not connected.
        assert_eq!(graph.edges[1].cost, config.no_path_fallback_cost);
        assert!(graph.edges[0].cost < config.no_path_fallback_cost);
        assert!(graph.nodes.iter().all(|n| n.dead_end_navmesh.is_none()));
    }

    /// Three separate exit quads at x in [0, 1], [3, 4], [6, 7], spanning
    /// z in [z0, z0 + 1].
    fn pad_row(name: &str, z0: f32) -> Navmesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for x0 in [0.0f32, 3.0, 6.0] {
            let base = vertices.len() as u32;
            vertices.extend([
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0, 0.0, z0 + 1.0),
                Vec3::new(x0 + 1.0, 0.0, z0),
                Vec3::new(x0 + 1.0, 0.0, z0 + 1.0),
            ]);
            faces.push([base, base + 2, base + 1]);
            faces.push([base + 2, base + 3, base + 1]);
        }
        let flags = vec![TriangleFlags::EXIT; faces.len()];
        let mesh = TriMesh::new(vertices, faces, Some(flags), None).unwrap();
        Navmesh::new(name, Vec3::ZERO, mesh)
    }

    #[test]
    fn third_sibling_continues_the_suffixes() {
        // Each pad of n0000 touches only the pad of n0001 directly above it.
        let registry = NavmeshRegistry::new(vec![pad_row("n0000", 0.0), pad_row("n0001", 1.0)]);
        let config = NavGraphConfig::default();
        let graph = build_graph(&registry, &config).unwrap();

        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Node [0000-0001] (0)",
                "Node [0000-0001] (1)",
                "Node [0000-0001] (2)"
            ]
        );
        for (k, node) in graph.nodes.iter().enumerate() {
            let tris = vec![2 * k as TriIndex, 2 * k as TriIndex + 1];
            assert_eq!(node.navmesh_a_triangles, tris);
            assert_eq!(node.navmesh_b_triangles, tris);
        }
        // Every pair of nodes on each navmesh, none of them reachable.
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.edges_on(NavmeshId(0)).len(), 3);
        assert_eq!(graph.edges[2].name, "Edge [0000] (2)");
        assert!(graph.edges.iter().all(|e| e.cost == config.no_path_fallback_cost));
    }

    #[test]
    fn two_navmeshes_make_a_double_dead_end() {
        let registry = NavmeshRegistry::new(vec![
            test_meshes::corridor("n0000", Vec3::ZERO, 1, false, true).unwrap(),
            test_meshes::corridor("n0001", Vec3::new(1.0, 0.0, 0.0), 1, true, false).unwrap(),
        ]);
        let err = build_graph(&registry, &NavGraphConfig::default()).unwrap_err();
        match err {
            NavGraphError::DeadEndConflict { node, first, second } => {
                assert_eq!(node, "Node [0000-0001]");
                assert_eq!(first, "n0000");
                assert_eq!(second, "n0001");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overlapping_clusters_are_a_duplicate_start() {
        let registry = NavmeshRegistry::new(vec![
            test_meshes::corridor("n0000", Vec3::new(-1.0, 0.0, 0.0), 1, false, true).unwrap(),
            test_meshes::corridor("n0001", Vec3::ZERO, 1, true, false).unwrap(),
            test_meshes::corridor("n0002", Vec3::new(-1.0, 0.0, 0.0), 1, false, true).unwrap(),
        ]);
        let err = build_graph(&registry, &NavGraphConfig::default()).unwrap_err();
        assert!(matches!(err, NavGraphError::DuplicateStartTriangle { .. }), "{err}");
    }

    #[test]
    fn bad_navmesh_name_fails_the_build() {
        let registry = NavmeshRegistry::new(vec![
            test_meshes::corridor("n0000", Vec3::ZERO, 1, false, true).unwrap(),
            test_meshes::corridor("m0001", Vec3::new(1.0, 0.0, 0.0), 1, true, false).unwrap(),
        ]);
        let err = build_graph(&registry, &NavGraphConfig::default()).unwrap_err();
        match err {
            NavGraphError::InvalidNavmeshName { name } => assert_eq!(name, "m0001"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn navmesh_without_flags_contributes_nothing() {
        let plain = test_meshes::strip(4, &[]).unwrap();
        let bare = TriMesh::new(plain.vertices().to_vec(), plain.faces().to_vec(), None, None).unwrap();
        let mut navmeshes = chain_of_three().navmeshes().to_vec();
        navmeshes.push(Navmesh::new("n0003", Vec3::new(7.0, 0.0, 0.0), bare));
        let graph = build_graph(&NavmeshRegistry::new(navmeshes), &NavGraphConfig::default()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn empty_registry_builds_empty_graph() {
        let graph = build_graph(&NavmeshRegistry::default(), &NavGraphConfig::default()).unwrap();
        assert_eq!(graph, Graph::new());
    }

    #[test]
    fn parallel_and_sequential_builds_agree() {
        let registry = chain_of_three();
        let parallel = build_graph(&registry, &NavGraphConfig::default()).unwrap();
        let sequential = build_graph(
            &registry,
            &NavGraphConfig {
                parallel: false,
                ..NavGraphConfig::default()
            },
        )
        .unwrap();
        assert_eq!(parallel, sequential);
    }
}
