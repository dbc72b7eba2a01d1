// Epsilon vertex welding.
//
// `weld_vertices` walks a vertex list in order and merges every vertex that
// lies strictly within `distance` of an already-kept vertex into that kept
// vertex. The first vertex of each merged group survives with its original
// position, so welding never moves geometry. Lookups go through a uniform
// grid keyed by `floor(p / distance)`, checking the 27 surrounding cells.
//
// Merging is not transitive: a vertex is compared against kept vertices
// only, never against other merged vertices. When several kept vertices are
// in range, the one with the lowest output index wins, so the result depends
// only on input order.
//
// A non-positive or non-finite `distance` degrades to exact merging of
// bit-identical positions (with `-0.0` folded into `0.0`).

use glam::Vec3;
use hashbrown::HashMap;

/// Output of [`weld_vertices`].
#[derive(Clone, Debug, PartialEq)]
pub struct WeldResult {
    /// Surviving vertex positions, in first-seen order.
    pub positions: Vec<Vec3>,
    /// For every input vertex, the index of the surviving vertex it maps to.
    pub remap: Vec<u32>,
}

impl WeldResult {
    /// Number of input vertices that were merged into another vertex.
    pub fn merged_count(&self) -> usize {
        self.remap.len() - self.positions.len()
    }
}

type CellKey = (i64, i64, i64);

/// Merge vertices closer than `distance` to an earlier kept vertex.
pub fn weld_vertices(positions: &[Vec3], distance: f32) -> WeldResult {
    if !(distance > 0.0 && distance.is_finite()) {
        return weld_exact(positions);
    }

    let inv_cell = 1.0 / distance;
    let max_sq = distance * distance;
    let mut kept: Vec<Vec3> = Vec::with_capacity(positions.len());
    let mut remap = Vec::with_capacity(positions.len());
    let mut grid: HashMap<CellKey, Vec<u32>> = HashMap::new();

    for &p in positions {
        let cell = cell_of(p, inv_cell);
        let mut found: Option<u32> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    let Some(bucket) = grid.get(&key) else {
                        continue;
                    };
                    for &candidate in bucket {
                        if kept[candidate as usize].distance_squared(p) < max_sq
                            && found.is_none_or(|f| candidate < f)
                        {
                            found = Some(candidate);
                        }
                    }
                }
            }
        }

        let index = match found {
            Some(index) => index,
            None => {
                let index = kept.len() as u32;
                kept.push(p);
                grid.entry(cell).or_default().push(index);
                index
            }
        };
        remap.push(index);
    }

    WeldResult {
        positions: kept,
        remap,
    }
}

fn weld_exact(positions: &[Vec3]) -> WeldResult {
    let mut kept: Vec<Vec3> = Vec::with_capacity(positions.len());
    let mut remap = Vec::with_capacity(positions.len());
    let mut seen: HashMap<[u32; 3], u32> = HashMap::new();

    for &p in positions {
        // Adding +0.0 turns -0.0 into +0.0 so both hash the same.
        let q = p + Vec3::ZERO;
        let key = [q.x.to_bits(), q.y.to_bits(), q.z.to_bits()];
        let index = *seen.entry(key).or_insert_with(|| {
            kept.push(p);
            (kept.len() - 1) as u32
        });
        remap.push(index);
    }

    WeldResult {
        positions: kept,
        remap,
    }
}

fn cell_of(p: Vec3, inv_cell: f32) -> CellKey {
    (
        (p.x * inv_cell).floor() as i64,
        (p.y * inv_cell).floor() as i64,
        (p.z * inv_cell).floor() as i64,
    )
}
