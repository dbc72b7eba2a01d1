// Incremental graph editing: the operations an editor runs on a graph after
// it was built or loaded.
//
// Each entry point validates its inputs and fails with a specific error
// rather than doing nothing. Batch operations (`recompute_all_edge_costs`,
// `normalize_names`) stop at the first error and keep whatever they already
// changed; they are not transactional.
//
// Removing a node or edge shifts every later id in its `Vec` down by one.
// Ids held by the caller past the removed position are stale afterwards.
//
// Edge costs are never replaced behind the caller's back:
// `recompute_edge_cost` only fills `Edge::proposed_cost`, and
// `apply_proposed_cost` commits it.

use crate::config::NavGraphConfig;
use crate::error::{NavGraphError, Result};
use crate::graph::{
    Edge, Graph, Node, edge_base_name, indexed_name, node_base_name, normalize_triangles,
};
use crate::navmesh::{ModelId, NavmeshRegistry};
use crate::pathfinding::find_best_cost;
use crate::types::{EdgeId, NavmeshId, NodeId, TriIndex};
use log::{debug, info};
use rustc_hash::FxHashMap;

/// Connect the two selected nodes through `navmesh`.
///
/// The selection must hold exactly two different nodes that aren't already
/// connected (in either direction). Both must have triangles on `navmesh`,
/// and it must not be a dead end of either. The new edge costs `edge_initial_cost_factor` times the distance between the
/// nodes and is named after the navmesh's model ID.
pub fn create_edge(
    graph: &mut Graph,
    registry: &NavmeshRegistry,
    selected_nodes: &[NodeId],
    navmesh: Option<NavmeshId>,
    config: &NavGraphConfig,
) -> Result<EdgeId> {
    let &[node_a, node_b] = selected_nodes else {
        return Err(NavGraphError::SelectionCardinality {
            expected: 2,
            actual: selected_nodes.len(),
        });
    };
    let navmesh = navmesh.ok_or(NavGraphError::MissingNavmesh)?;
    let nav = registry.get(navmesh)?;
    let model = nav.model_id()?;

    let a = graph.node(node_a)?;
    let b = graph.node(node_b)?;
    if node_a == node_b {
        return Err(NavGraphError::SelfEdge {
            node: a.name.clone(),
        });
    }
    if let Some(existing) = graph.edge_between(node_a, node_b) {
        return Err(NavGraphError::AlreadyConnected {
            node_a: a.name.clone(),
            node_b: b.name.clone(),
            edge: graph.edge(existing)?.name.clone(),
        });
    }
    let name = indexed_name(&edge_base_name(model), graph.edges_on(navmesh).len());
    for (id, node) in [(node_a, a), (node_b, b)] {
        endpoint_start(graph, id, navmesh, &nav.name)?;
        if node.dead_end_navmesh == Some(navmesh) {
            return Err(NavGraphError::EdgeOnDeadEnd {
                edge: name,
                node: node.name.clone(),
                navmesh: nav.name.clone(),
            });
        }
    }

    let cost = config.edge_initial_cost_factor * a.position.distance(b.position);
    let edge = Edge {
        name,
        node_a,
        node_b,
        navmesh: Some(navmesh),
        cost,
        proposed_cost: None,
    };
    debug!("created edge '{}' between '{}' and '{}'", edge.name, a.name, b.name);
    Ok(graph.add_edge(edge))
}

/// Remove an edge. Later edge ids shift down by one.
pub fn remove_edge(graph: &mut Graph, edge: EdgeId) -> Result<Edge> {
    graph.edge(edge)?;
    Ok(graph.edges.remove(edge.index()))
}

/// Remove a node and every edge touching it. Later node and edge ids shift
/// down to fill the gaps.
pub fn remove_node(graph: &mut Graph, node: NodeId) -> Result<Node> {
    graph.node(node)?;
    graph.edges.retain(|edge| !edge.touches(node));
    for edge in &mut graph.edges {
        for end in [&mut edge.node_a, &mut edge.node_b] {
            if end.0 > node.0 {
                end.0 -= 1;
            }
        }
    }
    Ok(graph.nodes.remove(node.index()))
}

/// Drop one triangle from a node's list for `navmesh`. Returns whether it
/// was there. May leave the node without triangles; `validate_graph`
/// reports that.
pub fn remove_node_triangle(
    graph: &mut Graph,
    node: NodeId,
    navmesh: NavmeshId,
    triangle: TriIndex,
) -> Result<bool> {
    let node = graph.node_mut(node)?;
    let name = node.name.clone();
    let tris = node
        .triangles_for_mut(navmesh)
        .ok_or_else(|| NavGraphError::NavmeshNotOnNode {
            node: name,
            navmesh: navmesh.to_string(),
        })?;
    // Loaded graphs may carry unsorted lists.
    match tris.iter().position(|&t| t == triangle) {
        Some(pos) => {
            tris.remove(pos);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Recompute an edge's cost with `find_best_cost` between its nodes' start
/// triangles, and store it as the edge's proposed cost. The live cost is
/// left alone. The stored value is the raw result, so `0.0` means no path.
pub fn recompute_edge_cost(
    graph: &mut Graph,
    registry: &NavmeshRegistry,
    edge: EdgeId,
    config: &NavGraphConfig,
) -> Result<f32> {
    let e = graph.edge(edge)?;
    let navmesh = e.navmesh.ok_or_else(|| NavGraphError::EdgeWithoutNavmesh {
        edge: e.name.clone(),
    })?;
    let nav = registry.get(navmesh)?;
    let start = endpoint_start(graph, e.node_a, navmesh, &nav.name)?;
    let end = endpoint_start(graph, e.node_b, navmesh, &nav.name)?;

    let cost = find_best_cost(&nav.mesh, start, end, config)?;
    let e = graph.edge_mut(edge)?;
    debug!("edge '{}': cost {} -> proposed {}", e.name, e.cost, cost);
    e.proposed_cost = Some(cost);
    Ok(cost)
}

/// `recompute_edge_cost` for every edge, in edge order.
pub fn recompute_all_edge_costs(
    graph: &mut Graph,
    registry: &NavmeshRegistry,
    config: &NavGraphConfig,
) -> Result<Vec<f32>> {
    let costs = (0..graph.edge_count() as u32)
        .map(|i| recompute_edge_cost(graph, registry, EdgeId(i), config))
        .collect::<Result<Vec<_>>>()?;
    info!("recomputed costs for {} edges", costs.len());
    Ok(costs)
}

/// Make an edge's proposed cost its live cost. Returns `false` if there was
/// nothing to apply.
pub fn apply_proposed_cost(graph: &mut Graph, edge: EdgeId) -> Result<bool> {
    let edge = graph.edge_mut(edge)?;
    match edge.proposed_cost.take() {
        Some(cost) => {
            edge.cost = cost;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Re-derive every node and edge name from navmesh model IDs.
///
/// Nodes are named `Node [AAAA-BBBB]`, with an occurrence suffix only when
/// several nodes share the same model pair. Edges are always named
/// `Edge [MMMM] (k)`. Running this twice gives the same names.
pub fn normalize_names(graph: &mut Graph, registry: &NavmeshRegistry) -> Result<()> {
    let keys = graph
        .nodes
        .iter()
        .map(|node| node.model_key(registry))
        .collect::<Result<Vec<_>>>()?;
    let mut totals: FxHashMap<(ModelId, ModelId), usize> = FxHashMap::default();
    for key in &keys {
        *totals.entry(*key).or_default() += 1;
    }
    let mut seen: FxHashMap<(ModelId, ModelId), usize> = FxHashMap::default();
    for (node, key) in graph.nodes.iter_mut().zip(keys) {
        let base = node_base_name(key.0, key.1);
        let index = seen.entry(key).or_default();
        node.name = if totals[&key] > 1 {
            indexed_name(&base, *index)
        } else {
            base
        };
        *index += 1;
    }

    let mut seen: FxHashMap<ModelId, usize> = FxHashMap::default();
    for edge in &mut graph.edges {
        let navmesh = edge.navmesh.ok_or_else(|| NavGraphError::EdgeWithoutNavmesh {
            edge: edge.name.clone(),
        })?;
        let model = registry.get(navmesh)?.model_id()?;
        let index = seen.entry(model).or_default();
        edge.name = indexed_name(&edge_base_name(model), *index);
        *index += 1;
    }
    Ok(())
}

/// Replace a node's triangle list for `navmesh` with the selected triangles.
pub fn set_node_triangles_from_selection(
    graph: &mut Graph,
    registry: &NavmeshRegistry,
    node: NodeId,
    navmesh: NavmeshId,
    selected: &[TriIndex],
) -> Result<()> {
    let nav = registry.get(navmesh)?;
    for &tri in selected {
        nav.mesh.check_triangle(tri)?;
    }
    let node = graph.node_mut(node)?;
    let name = node.name.clone();
    let tris = node
        .triangles_for_mut(navmesh)
        .ok_or_else(|| NavGraphError::NavmeshNotOnNode {
            node: name,
            navmesh: nav.name.clone(),
        })?;
    tris.clear();
    tris.extend_from_slice(selected);
    normalize_triangles(tris);
    Ok(())
}

/// Check the structural rules every graph must follow. Reports the first
/// violation found:
/// - every node has triangles on at least one side and only references
///   known navmeshes;
/// - a node's dead-end navmesh is one of its own navmeshes;
/// - every edge joins two different existing nodes through a navmesh both
///   of them reference with a non-empty triangle list;
/// - no edge runs through a navmesh that is a dead end of either endpoint.
pub fn validate_graph(graph: &Graph, registry: &NavmeshRegistry) -> Result<()> {
    for node in &graph.nodes {
        if node.has_no_triangles() {
            return Err(NavGraphError::EmptyNode {
                node: node.name.clone(),
            });
        }
        for navmesh in node.navmeshes() {
            registry.get(navmesh)?;
        }
        if let Some(dead_end) = node.dead_end_navmesh {
            if !node.references(dead_end) {
                return Err(NavGraphError::NavmeshNotOnNode {
                    node: node.name.clone(),
                    navmesh: registry.display_name(dead_end),
                });
            }
        }
    }

    for edge in &graph.edges {
        let navmesh = edge.navmesh.ok_or_else(|| NavGraphError::EdgeWithoutNavmesh {
            edge: edge.name.clone(),
        })?;
        let nav_name = &registry.get(navmesh)?.name;
        if edge.node_a == edge.node_b {
            return Err(NavGraphError::SelfEdge {
                node: graph.node(edge.node_a)?.name.clone(),
            });
        }
        for end in [edge.node_a, edge.node_b] {
            let node = graph.node(end)?;
            endpoint_start(graph, end, navmesh, nav_name)?;
            if node.dead_end_navmesh == Some(navmesh) {
                return Err(NavGraphError::EdgeOnDeadEnd {
                    edge: edge.name.clone(),
                    node: node.name.clone(),
                    navmesh: nav_name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// A node's start triangle on `navmesh`, with the error for each way that
/// can be missing.
fn endpoint_start(
    graph: &Graph,
    node: NodeId,
    navmesh: NavmeshId,
    navmesh_name: &str,
) -> Result<TriIndex> {
    let node = graph.node(node)?;
    let tris = node
        .triangles_for(navmesh)
        .ok_or_else(|| NavGraphError::NavmeshNotOnNode {
            node: node.name.clone(),
            navmesh: navmesh_name.to_string(),
        })?;
    tris.iter()
        .copied()
        .min()
        .ok_or_else(|| NavGraphError::NodeHasNoTriangles {
            node: node.name.clone(),
            navmesh: navmesh_name.to_string(),
        })
}
