// A* pathfinding over navmesh triangle adjacency.
//
// Implements standard A* search using a `BinaryHeap` (min-heap via reversed
// ordering). Scores and came-from data are stored in `Vec`s indexed by
// triangle for O(1) access. Triangle centroids are computed lazily, at most
// once per triangle per search.
//
// Step costs come from `cost::step_cost` using the centroid distance between
// neighbors. The heuristic is the straight-line centroid distance to the goal,
// which is admissible while both cost multipliers are >= 1. Multipliers below
// 1 make it inadmissible and the returned path may then be suboptimal; that
// is accepted rather than corrected.
//
// `find_path` retries once with all flags passable when the flag-aware search
// finds nothing, and reports whether the retry was needed. `find_best_cost`
// searches both directions on a welded copy of the mesh and picks one cost
// (see its docs for the tie-break). It returns exactly 0.0 when neither
// direction finds a path; callers must replace that with their own fallback.
//
// See also: `mesh.rs` for `MeshView`, `builder.rs` and `maintenance.rs`,
// which cost graph edges with `find_best_cost`.

use crate::config::{CostConfig, NavGraphConfig};
use crate::cost::step_cost;
use crate::error::{NavGraphError, Result};
use crate::mesh::MeshView;
use crate::types::TriIndex;
use glam::Vec3;
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The result of `find_path`.
#[derive(Clone, Debug, PartialEq)]
pub struct PathOutcome {
    /// Triangles from start to end (inclusive), or `None` if unreachable.
    pub path: Option<Vec<TriIndex>>,
    /// Sum of step costs along `path`; `f32::INFINITY` when there is none.
    pub total_cost: f32,
    /// True if the all-passable search was used (requested by the caller or
    /// needed as a fallback), or if no path was found at all.
    pub used_all_passable: bool,
}

impl PathOutcome {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    tri: TriIndex,
    f_score: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score.total_cmp(&other.f_score) == Ordering::Equal && self.tri == other.tri
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f_score is "greatest".
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.tri.cmp(&self.tri))
    }
}

/// Lazily filled centroid table for one search.
struct Centroids<'a, M: MeshView + ?Sized> {
    mesh: &'a M,
    cache: Vec<Option<Vec3>>,
}

impl<'a, M: MeshView + ?Sized> Centroids<'a, M> {
    fn new(mesh: &'a M) -> Self {
        Self {
            mesh,
            cache: vec![None; mesh.triangle_count()],
        }
    }

    fn get(&mut self, tri: TriIndex) -> Vec3 {
        *self.cache[tri as usize].get_or_insert_with(|| self.mesh.centroid_of(tri))
    }
}

/// Find the cheapest triangle path from `start` to `end`.
///
/// With `all_faces_passable == false`, a failed flag-aware search is retried
/// once with every triangle passable. If that also fails the outcome is
/// `(None, INFINITY, true)`.
pub fn find_path<M: MeshView + ?Sized>(
    start: TriIndex,
    end: TriIndex,
    mesh: &M,
    all_faces_passable: bool,
    config: &CostConfig,
) -> Result<PathOutcome> {
    for tri in [start, end] {
        if tri as usize >= mesh.triangle_count() {
            return Err(NavGraphError::TriangleOutOfRange {
                triangle: tri,
                count: mesh.triangle_count(),
            });
        }
    }

    if let Some((path, total_cost)) = astar(mesh, start, end, all_faces_passable, config) {
        return Ok(PathOutcome {
            path: Some(path),
            total_cost,
            used_all_passable: all_faces_passable,
        });
    }

    if !all_faces_passable {
        debug!("no flag-aware path from triangle {start} to {end}; retrying with all faces passable");
        if let Some((path, total_cost)) = astar(mesh, start, end, true, config) {
            return Ok(PathOutcome {
                path: Some(path),
                total_cost,
                used_all_passable: true,
            });
        }
    }

    Ok(PathOutcome {
        path: None,
        total_cost: f32::INFINITY,
        used_all_passable: true,
    })
}

/// Cheapest cost between two triangles, searching both directions on a
/// welded copy of `mesh`.
///
/// If both searches needed the all-passable fallback, or neither did, the
/// smaller cost wins. Otherwise the search that did NOT need the fallback
/// wins even if it is more expensive, since its cost respects the flags.
/// Returns exactly `0.0` when neither direction reaches the other triangle.
pub fn find_best_cost<M: MeshView + ?Sized>(
    mesh: &M,
    start: TriIndex,
    end: TriIndex,
    config: &NavGraphConfig,
) -> Result<f32> {
    let welded = mesh.deduped(config.vertex_merge_distance);
    let forward = find_path(start, end, &welded, false, &config.cost)?;
    let backward = find_path(end, start, &welded, false, &config.cost)?;

    let best = if forward.used_all_passable == backward.used_all_passable {
        forward.total_cost.min(backward.total_cost)
    } else if !forward.used_all_passable {
        forward.total_cost
    } else {
        backward.total_cost
    };

    if best.is_infinite() {
        warn!("no path between triangles {start} and {end} in either direction");
        return Ok(0.0);
    }
    Ok(best)
}

fn astar<M: MeshView + ?Sized>(
    mesh: &M,
    start: TriIndex,
    goal: TriIndex,
    all_flags_passable: bool,
    config: &CostConfig,
) -> Option<(Vec<TriIndex>, f32)> {
    let n = mesh.triangle_count();
    if start == goal {
        return Some((vec![start], 0.0));
    }

    let mut centroids = Centroids::new(mesh);
    let goal_centroid = centroids.get(goal);

    // g_score[tri] = cost of cheapest known path from start to tri.
    let mut g_score = vec![f32::INFINITY; n];
    let mut came_from: Vec<Option<TriIndex>> = vec![None; n];
    let mut closed = vec![false; n];

    g_score[start as usize] = 0.0;

    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        tri: start,
        f_score: centroids.get(start).distance(goal_centroid),
    });

    while let Some(current) = open.pop() {
        let current_tri = current.tri;
        let ci = current_tri as usize;

        if current_tri == goal {
            return Some((reconstruct_path(&came_from, start, goal), g_score[ci]));
        }

        if closed[ci] {
            continue;
        }
        closed[ci] = true;

        let current_g = g_score[ci];
        let current_centroid = centroids.get(current_tri);
        let current_flags = mesh.flags_of(current_tri);

        for &neighbor in mesh.neighbors_of(current_tri) {
            let ni = neighbor as usize;
            if closed[ni] {
                continue;
            }

            let neighbor_centroid = centroids.get(neighbor);
            let step = step_cost(
                current_flags,
                mesh.flags_of(neighbor),
                current_centroid.distance(neighbor_centroid),
                all_flags_passable,
                config,
            );
            let tentative_g = current_g + step;

            if tentative_g < g_score[ni] {
                g_score[ni] = tentative_g;
                came_from[ni] = Some(current_tri);
                open.push(OpenEntry {
                    tri: neighbor,
                    f_score: tentative_g + neighbor_centroid.distance(goal_centroid),
                });
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &[Option<TriIndex>], start: TriIndex, goal: TriIndex) -> Vec<TriIndex> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from[current as usize] {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
