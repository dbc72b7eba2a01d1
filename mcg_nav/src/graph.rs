// MCG navigation graph: junction nodes between navmeshes, and edges across
// one navmesh between two of its nodes.
//
// `Graph` is an arena: it owns `Vec<Node>` and `Vec<Edge>`, and everything
// refers to nodes, edges, and navmeshes by index (`NodeId`, `EdgeId`,
// `NavmeshId`). Navmeshes themselves live in the caller's `NavmeshRegistry`.
//
// `Node::new` and the editing operations keep triangle lists sorted with no
// duplicates. Lists loaded from JSON are taken as they come, so lookups
// never rely on order: the start triangle is the minimum entry.
//
// Names are derived from navmesh model IDs:
// - node: `Node [AAAA-BBBB]`, lower model ID first, plus ` (k)` when more
//   than one node joins the same pair of models;
// - edge: `Edge [MMMM] (k)`, where `k` counts edges on model `MMMM`.
//
// See also: `builder.rs` (creates graphs), `maintenance.rs` (edits them and
// re-derives names).

use crate::error::{NavGraphError, Result};
use crate::navmesh::{ModelId, NavmeshRegistry};
use crate::types::{EdgeId, NavmeshId, NodeId, TriIndex};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A junction between two navmeshes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub position: Vec3,
    pub navmesh_a: Option<NavmeshId>,
    pub navmesh_a_triangles: Vec<TriIndex>,
    pub navmesh_b: Option<NavmeshId>,
    pub navmesh_b_triangles: Vec<TriIndex>,
    /// Set when this is the only node touching that navmesh.
    pub dead_end_navmesh: Option<NavmeshId>,
    /// Opaque value carried through for the binary format.
    pub unknown_offset: i32,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        position: Vec3,
        navmesh_a: NavmeshId,
        navmesh_a_triangles: Vec<TriIndex>,
        navmesh_b: NavmeshId,
        navmesh_b_triangles: Vec<TriIndex>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            navmesh_a: Some(navmesh_a),
            navmesh_a_triangles: sorted_unique(navmesh_a_triangles),
            navmesh_b: Some(navmesh_b),
            navmesh_b_triangles: sorted_unique(navmesh_b_triangles),
            dead_end_navmesh: None,
            unknown_offset: 0,
        }
    }

    /// The navmeshes this node references, A first.
    pub fn navmeshes(&self) -> impl Iterator<Item = NavmeshId> {
        self.navmesh_a.into_iter().chain(self.navmesh_b)
    }

    pub fn references(&self, navmesh: NavmeshId) -> bool {
        self.navmesh_a == Some(navmesh) || self.navmesh_b == Some(navmesh)
    }

    /// Triangles on `navmesh`, or `None` if the node doesn't reference it.
    /// If both slots name the same navmesh, the A side is returned.
    pub fn triangles_for(&self, navmesh: NavmeshId) -> Option<&[TriIndex]> {
        if self.navmesh_a == Some(navmesh) {
            Some(&self.navmesh_a_triangles)
        } else if self.navmesh_b == Some(navmesh) {
            Some(&self.navmesh_b_triangles)
        } else {
            None
        }
    }

    pub fn triangles_for_mut(&mut self, navmesh: NavmeshId) -> Option<&mut Vec<TriIndex>> {
        if self.navmesh_a == Some(navmesh) {
            Some(&mut self.navmesh_a_triangles)
        } else if self.navmesh_b == Some(navmesh) {
            Some(&mut self.navmesh_b_triangles)
        } else {
            None
        }
    }

    /// Lowest triangle index on `navmesh`; the node's start triangle there.
    pub fn start_triangle(&self, navmesh: NavmeshId) -> Option<TriIndex> {
        self.triangles_for(navmesh)
            .and_then(|tris| tris.iter().copied().min())
    }

    /// True if both triangle lists are empty (an invalid node).
    pub fn has_no_triangles(&self) -> bool {
        self.navmesh_a_triangles.is_empty() && self.navmesh_b_triangles.is_empty()
    }

    /// The `(lower, higher)` model IDs of the two referenced navmeshes.
    pub fn model_key(&self, registry: &NavmeshRegistry) -> Result<(ModelId, ModelId)> {
        let (Some(a), Some(b)) = (self.navmesh_a, self.navmesh_b) else {
            return Err(NavGraphError::NodeMissingNavmesh {
                node: self.name.clone(),
            });
        };
        let a = registry.get(a)?.model_id()?;
        let b = registry.get(b)?.model_id()?;
        Ok((a.min(b), a.max(b)))
    }
}

/// A traversable connection between two nodes across one navmesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub name: String,
    pub node_a: NodeId,
    pub node_b: NodeId,
    /// `None` only for edges loaded with an unresolved navmesh reference.
    pub navmesh: Option<NavmeshId>,
    pub cost: f32,
    /// Result of the last cost recomputation, awaiting an explicit commit.
    #[serde(default)]
    pub proposed_cost: Option<f32>,
}

impl Edge {
    /// True if this edge joins `a` and `b`, in either order.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.node_a == a && self.node_b == b) || (self.node_a == b && self.node_b == a)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.node_a == node || self.node_b == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.node_a == node {
            Some(self.node_b)
        } else if self.node_b == node {
            Some(self.node_a)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Opaque header values carried through for the binary format.
    #[serde(default)]
    pub unknowns: [i32; 3],
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(edge);
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(NavGraphError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(NavGraphError::UnknownNode(id))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges
            .get(id.index())
            .ok_or(NavGraphError::UnknownEdge(id))
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        self.edges
            .get_mut(id.index())
            .ok_or(NavGraphError::UnknownEdge(id))
    }

    /// Nodes referencing `navmesh` on either side, in node order.
    pub fn nodes_referencing(&self, navmesh: NavmeshId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.references(navmesh))
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Edges running through `navmesh`, in edge order.
    pub fn edges_on(&self, navmesh: NavmeshId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.navmesh == Some(navmesh))
            .map(|(i, _)| EdgeId(i as u32))
            .collect()
    }

    /// The first edge joining `a` and `b` in either direction.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.edges
            .iter()
            .position(|edge| edge.connects(a, b))
            .map(|i| EdgeId(i as u32))
    }

    /// `(neighbor, edge)` for every edge touching `node`, in edge order. This
    /// is the per-node connection table of the binary format.
    pub fn connections(&self, node: NodeId) -> Vec<(NodeId, EdgeId)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, edge)| edge.other(node).map(|n| (n, EdgeId(i as u32))))
            .collect()
    }
}

pub fn node_base_name(a: ModelId, b: ModelId) -> String {
    format!("Node [{a}-{b}]")
}

pub fn edge_base_name(model: ModelId) -> String {
    format!("Edge [{model}]")
}

pub fn indexed_name(base: &str, index: usize) -> String {
    format!("{base} ({index})")
}

fn sorted_unique(mut tris: Vec<TriIndex>) -> Vec<TriIndex> {
    normalize_triangles(&mut tris);
    tris
}

/// Sorts and dedups a triangle list in place.
pub(crate) fn normalize_triangles(tris: &mut Vec<TriIndex>) {
    tris.sort_unstable();
    tris.dedup();
}
