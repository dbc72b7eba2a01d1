// mcg_utils — geometry helpers shared by the MCG navigation graph tools.
//
// Module overview:
// - `weld.rs`: Epsilon vertex welding over a uniform spatial hash. Used to
//              merge coincident navmesh vertices before adjacency is rebuilt,
//              so that triangles touching along a seam become neighbors.
//
// Nothing in here knows about navmeshes, flags, or graphs; it works on plain
// `glam::Vec3` slices and index remaps.

pub mod weld;

pub use weld::{WeldResult, weld_vertices};
