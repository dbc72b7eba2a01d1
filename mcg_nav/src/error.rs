// Error type for graph construction, pathfinding, and graph editing.
//
// Every fallible operation in the crate returns `Result<T>` with a
// `NavGraphError`. Messages name the offending navmesh / node / edge so a
// caller can surface them directly. The builder treats any error as fatal for
// the whole build; maintenance operations abort the current batch only.

use crate::types::{EdgeId, NavmeshId, NodeId, TriIndex};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NavGraphError>;

#[derive(Error, Debug)]
pub enum NavGraphError {
    #[error("navmesh name '{name}' does not start with a model ID like 'n0123'")]
    InvalidNavmeshName { name: String },

    #[error("no navmesh with index {0}")]
    UnknownNavmesh(NavmeshId),

    #[error("no navmesh named '{0}'")]
    UnknownNavmeshName(String),

    #[error("no node with index {0}")]
    UnknownNode(NodeId),

    #[error("no edge with index {0}")]
    UnknownEdge(EdgeId),

    #[error("triangle {triangle} is out of range for a mesh with {count} triangles")]
    TriangleOutOfRange { triangle: TriIndex, count: usize },

    #[error("mesh is invalid: {0}")]
    InvalidMesh(String),

    #[error("node '{node}' has no triangles on either navmesh")]
    EmptyNode { node: String },

    #[error(
        "node '{node}' is the only node on both '{first}' and '{second}' and cannot be a dead end twice"
    )]
    DeadEndConflict {
        node: String,
        first: String,
        second: String,
    },

    #[error("node '{node}' does not reference two navmeshes")]
    NodeMissingNavmesh { node: String },

    #[error("node '{node}' references no triangles on navmesh '{navmesh}'")]
    NodeHasNoTriangles { node: String, navmesh: String },

    #[error(
        "nodes '{node_a}' and '{node_b}' both start at triangle {triangle} of navmesh '{navmesh}' (duplicate node for the same cluster)"
    )]
    DuplicateStartTriangle {
        node_a: String,
        node_b: String,
        navmesh: String,
        triangle: TriIndex,
    },

    #[error("exactly {expected} nodes must be selected, got {actual}")]
    SelectionCardinality { expected: usize, actual: usize },

    #[error("an edge needs a navmesh, but none was given")]
    MissingNavmesh,

    #[error("nodes '{node_a}' and '{node_b}' are already connected by edge '{edge}'")]
    AlreadyConnected {
        node_a: String,
        node_b: String,
        edge: String,
    },

    #[error("cannot connect node '{node}' to itself")]
    SelfEdge { node: String },

    #[error("navmesh '{navmesh}' is not one of the navmeshes of node '{node}'")]
    NavmeshNotOnNode { node: String, navmesh: String },

    #[error("edge '{edge}' runs through navmesh '{navmesh}', which is a dead end of node '{node}'")]
    EdgeOnDeadEnd {
        edge: String,
        node: String,
        navmesh: String,
    },

    #[error("edge '{edge}' has no navmesh")]
    EdgeWithoutNavmesh { edge: String },

    #[error("failed to read or write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
