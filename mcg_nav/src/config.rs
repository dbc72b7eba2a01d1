// Data-driven configuration for graph construction and pathfinding.
//
// All tunable parameters live in `NavGraphConfig`, which can be loaded from
// JSON (the `mcg` CLI takes `--config <file>`). The library reads every
// epsilon and multiplier from the config passed in by the caller. Missing JSON
// fields fall back to `Default`.
//
// Cost multipliers are grouped in `CostConfig` because they are the only
// values the inner A* loop needs; passing the small struct keeps
// `cost::step_cost` independent of the rest of the config.
//
// See also: `cost.rs` (reads `CostConfig`), `pathfinding.rs` (reads
// `vertex_merge_distance`), `builder.rs` (reads everything else).

use crate::error::{NavGraphError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Multipliers applied to the Euclidean step distance for flagged triangles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Applied when stepping onto a `Wall` triangle.
    pub wall_multiplier: f32,
    /// Applied when stepping onto an `Obstacle` triangle. Checked before
    /// `wall_multiplier` when a triangle has both flags.
    pub obstacle_multiplier: f32,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            wall_multiplier: 1.0,
            obstacle_multiplier: 1.0,
        }
    }
}

/// Top-level configuration. Loaded once, never mutated by the library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavGraphConfig {
    /// Step cost multipliers used by A*.
    pub cost: CostConfig,

    /// Two world-space vertices from different navmeshes are the same point
    /// when their squared distance is below the square of this value. Used to
    /// detect exit clusters that touch across navmeshes.
    pub vertex_match_distance: f32,

    /// Vertices closer than this are welded before edge costs are computed,
    /// so that triangles split along a seam still count as neighbors.
    pub vertex_merge_distance: f32,

    /// Cost given to a builder edge when A* finds no path in either
    /// direction between its two nodes.
    pub no_path_fallback_cost: f32,

    /// Manually created edges start at this multiple of the straight-line
    /// distance between their two nodes.
    pub edge_initial_cost_factor: f32,

    /// Run per-navmesh cluster detection and per-edge costing on the rayon
    /// pool. Output is identical either way.
    pub parallel: bool,
}

impl Default for NavGraphConfig {
    fn default() -> Self {
        Self {
            cost: CostConfig::default(),
            vertex_match_distance: 0.01,
            vertex_merge_distance: 0.01,
            no_path_fallback_cost: 10000.0,
            edge_initial_cost_factor: 2.0,
            parallel: true,
        }
    }
}

impl NavGraphConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| NavGraphError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Squared form of `vertex_match_distance`, as compared against
    /// `Vec3::distance_squared`.
    pub fn vertex_match_distance_sq(&self) -> f32 {
        self.vertex_match_distance * self.vertex_match_distance
    }
}
