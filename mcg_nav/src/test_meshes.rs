// Small hand-built meshes for tests and benchmarks.
//
// - `strip`: a zig-zag strip of triangles, each adjacent to the previous one.
// - `open_fan`: triangles fanned around a center vertex over a half circle
//   (first and last triangles are not adjacent).
// - `corridor`: a 1-wide strip of unit quads along +X, optionally with
//   Exit-flagged end quads, wrapped as a named `Navmesh`. Corridors laid end
//   to end (offset by their length) share an exit edge in world space.

use crate::error::Result;
use crate::mesh::TriMesh;
use crate::navmesh::Navmesh;
use crate::types::{TriIndex, TriangleFlags};
use glam::Vec3;

/// `count` triangles in a zig-zag strip along +X. Triangle `i` shares an
/// edge with `i - 1` and `i + 1`. `flags` sets individual triangles.
pub fn strip(count: usize, flags: &[(TriIndex, TriangleFlags)]) -> Result<TriMesh> {
    let columns = count / 2 + 2;
    let mut vertices = Vec::with_capacity(columns * 2);
    for x in 0..columns {
        vertices.push(Vec3::new(x as f32, 0.0, 0.0));
        vertices.push(Vec3::new(x as f32, 0.0, 1.0));
    }
    let bottom = |x: usize| (2 * x) as u32;
    let top = |x: usize| (2 * x + 1) as u32;

    let faces: Vec<[u32; 3]> = (0..count)
        .map(|i| {
            let k = i / 2;
            if i % 2 == 0 {
                [bottom(k), bottom(k + 1), top(k)]
            } else {
                [bottom(k + 1), top(k + 1), top(k)]
            }
        })
        .collect();

    TriMesh::new(vertices, faces, Some(flag_layer(count, flags)), None)
}

/// `count` triangles around the origin spanning 180 degrees.
pub fn open_fan(count: usize, flags: &[(TriIndex, TriangleFlags)]) -> Result<TriMesh> {
    let mut vertices = vec![Vec3::ZERO];
    let step = std::f32::consts::PI / count.max(1) as f32;
    for i in 0..=count {
        let angle = step * i as f32;
        vertices.push(Vec3::new(angle.cos(), 0.0, angle.sin()));
    }
    let faces: Vec<[u32; 3]> = (0..count)
        .map(|i| [0, (i + 1) as u32, (i + 2) as u32])
        .collect();
    TriMesh::new(vertices, faces, Some(flag_layer(count, flags)), None)
}

/// A `length`-quad corridor along +X at `world_offset`. The two triangles of
/// the first quad are Exit-flagged if `exit_start`, the last quad's if
/// `exit_end`. Triangle `0` touches the start edge (x = 0) and triangle
/// `2 * length - 1` touches the end edge (x = length).
pub fn corridor(
    name: &str,
    world_offset: Vec3,
    length: usize,
    exit_start: bool,
    exit_end: bool,
) -> Result<Navmesh> {
    let count = length * 2;
    let mut flags = Vec::new();
    if exit_start && count > 0 {
        flags.push((0, TriangleFlags::EXIT));
        flags.push((1, TriangleFlags::EXIT));
    }
    if exit_end && count > 0 {
        flags.push(((count - 2) as TriIndex, TriangleFlags::EXIT));
        flags.push(((count - 1) as TriIndex, TriangleFlags::EXIT));
    }

    let mut vertices = Vec::with_capacity((length + 1) * 2);
    for x in 0..=length {
        vertices.push(Vec3::new(x as f32, 0.0, 0.0));
        vertices.push(Vec3::new(x as f32, 0.0, 1.0));
    }
    let bottom = |x: usize| (2 * x) as u32;
    let top = |x: usize| (2 * x + 1) as u32;
    let faces: Vec<[u32; 3]> = (0..length)
        .flat_map(|k| {
            [
                [bottom(k), bottom(k + 1), top(k)],
                [bottom(k + 1), top(k + 1), top(k)],
            ]
        })
        .collect();

    let mesh = TriMesh::new(vertices, faces, Some(flag_layer(count, &flags)), None)?;
    Ok(Navmesh::new(name, world_offset, mesh))
}

fn flag_layer(count: usize, flags: &[(TriIndex, TriangleFlags)]) -> Vec<TriangleFlags> {
    let mut layer = vec![TriangleFlags::NONE; count];
    for &(tri, flag) in flags {
        if let Some(slot) = layer.get_mut(tri as usize) {
            slot.insert(flag);
        }
    }
    layer
}
