// mcg_nav — navigation graph (MCG) construction and navmesh pathfinding.
//
// Builds the cross-navmesh navigation graph of a map from its navmeshes'
// exit-flagged triangles, costs graph edges with flag-aware A* over triangle
// adjacency, and provides the editing operations used on a graph after it is
// built or loaded. Everything works on in-memory data; reading and writing
// the game's binary formats happens elsewhere.
//
// Module overview:
// - `types.rs`:       Arena ids (`NavmeshId`, `NodeId`, `EdgeId`) and `TriangleFlags`.
// - `error.rs`:       `NavGraphError` and the crate `Result` alias.
// - `config.rs`:      `NavGraphConfig` / `CostConfig`, JSON-loadable tunables.
// - `mesh.rs`:        `TriMesh` and the `MeshView` adjacency trait.
// - `navmesh.rs`:     Named navmeshes, model IDs, and the per-map `NavmeshRegistry`.
// - `cost.rs`:        Step cost between adjacent triangles.
// - `pathfinding.rs`: A* with all-passable fallback, and `find_best_cost`.
// - `clusters.rs`:    Connected groups of exit triangles.
// - `graph.rs`:       `Graph`, `Node`, `Edge`, and naming helpers.
// - `builder.rs`:     `build_graph`, the automatic graph builder.
// - `maintenance.rs`: Edge/node editing, cost recomputation, renaming, validation.
// - `test_meshes.rs`: Small hand-built meshes for tests and benchmarks.
//
// The `mcg` binary (`main.rs`) drives these from the command line using a
// JSON navmesh format.

pub mod builder;
pub mod clusters;
pub mod config;
pub mod cost;
pub mod error;
pub mod graph;
pub mod maintenance;
pub mod mesh;
pub mod navmesh;
pub mod pathfinding;
pub mod test_meshes;
pub mod types;

pub use builder::build_graph;
pub use config::{CostConfig, NavGraphConfig};
pub use error::{NavGraphError, Result};
pub use graph::{Edge, Graph, Node};
pub use navmesh::{Navmesh, NavmeshRegistry};
pub use pathfinding::{PathOutcome, find_best_cost, find_path};
