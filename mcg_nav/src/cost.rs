// Step cost between two adjacent navmesh triangles.
//
// The cost of moving from one triangle to a neighbor is the distance between
// their centroids, scaled by the destination triangle's flags:
// - no flags at all: plain distance;
// - `Disable` destination, or `FloorBeneathWall` -> `Wall`: impassable
//   (`f32::INFINITY`), unless all flags are treated as passable;
// - `Obstacle` destination: `obstacle_multiplier * distance`;
// - `Wall` destination: `wall_multiplier * distance`;
// - anything else (e.g. `Exit` only): plain distance.
//
// The multipliers apply in the all-passable fallback mode too; only the
// impassable checks are skipped. Degenerate triangles get no special case.

use crate::config::CostConfig;
use crate::types::TriangleFlags;

pub fn step_cost(
    from: TriangleFlags,
    to: TriangleFlags,
    distance: f32,
    all_flags_passable: bool,
    config: &CostConfig,
) -> f32 {
    if to.is_empty() {
        return distance;
    }

    if !all_flags_passable {
        if to.contains(TriangleFlags::DISABLE) {
            return f32::INFINITY;
        }
        if from.contains(TriangleFlags::FLOOR_BENEATH_WALL) && to.contains(TriangleFlags::WALL) {
            return f32::INFINITY;
        }
    }

    if to.contains(TriangleFlags::OBSTACLE) {
        config.obstacle_multiplier * distance
    } else if to.contains(TriangleFlags::WALL) {
        config.wall_multiplier * distance
    } else {
        distance
    }
}
