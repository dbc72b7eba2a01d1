// Triangle mesh and the read-only adjacency view used by pathfinding.
//
// `TriMesh` is an indexed triangle mesh (shared vertex positions + faces)
// with an optional per-triangle flag layer and per-triangle obstacle counts.
// Adjacency is computed once at construction: two triangles are neighbors iff
// they share an undirected edge, i.e. two vertex *indices*. Coincident but
// unshared vertices do not connect triangles; call `deduped()` first when the
// source geometry has split seams (see `pathfinding::find_best_cost`).
//
// Non-manifold edges are supported: every other triangle on any of a
// triangle's three edges is a neighbor, so a triangle may have more than
// three. Degenerate faces (repeated vertex index) keep their triangle index
// and only link through their non-degenerate edges.
//
// `MeshView` is the seam to host applications: anything that can answer
// vertex/flag/neighbor queries by triangle index can be searched by A*.
//
// Triangle indices never change after construction; every other structure in
// the crate stores them as plain `TriIndex` values.

use crate::error::{NavGraphError, Result};
use crate::types::{TriIndex, TriangleFlags};
use glam::Vec3;
use mcg_utils::weld_vertices;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Read-only triangle adjacency queries.
pub trait MeshView {
    fn triangle_count(&self) -> usize;

    /// The three corner positions of a triangle, in mesh-local space.
    fn vertices_of(&self, tri: TriIndex) -> [Vec3; 3];

    /// Flag bits of a triangle. Meshes without a flag layer report no flags.
    fn flags_of(&self, tri: TriIndex) -> TriangleFlags;

    /// All triangles sharing at least one edge with `tri`, without repeats.
    fn neighbors_of(&self, tri: TriIndex) -> &[TriIndex];

    /// Copy of this mesh with vertices closer than `merge_distance` welded
    /// and adjacency rebuilt. Triangle indices are preserved.
    fn deduped(&self, merge_distance: f32) -> TriMesh;

    fn centroid_of(&self, tri: TriIndex) -> Vec3 {
        let [a, b, c] = self.vertices_of(tri);
        (a + b + c) / 3.0
    }
}

/// A snapshot of one triangle's data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub index: TriIndex,
    pub vertices: [Vec3; 3],
    pub flags: TriangleFlags,
    pub obstacle_count: u16,
}

/// Indexed triangle mesh with cached edge adjacency.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "TriMeshData", into = "TriMeshData")]
pub struct TriMesh {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    flags: Option<Vec<TriangleFlags>>,
    obstacle_counts: Vec<u16>,
    adjacency: Vec<SmallVec<[TriIndex; 3]>>,
}

/// Serialized form of `TriMesh` (adjacency is rebuilt on load).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TriMeshData {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    #[serde(default)]
    pub flags: Option<Vec<TriangleFlags>>,
    #[serde(default)]
    pub obstacle_counts: Option<Vec<u16>>,
}

impl TryFrom<TriMeshData> for TriMesh {
    type Error = NavGraphError;

    fn try_from(data: TriMeshData) -> Result<Self> {
        TriMesh::new(data.vertices, data.faces, data.flags, data.obstacle_counts)
    }
}

impl From<TriMesh> for TriMeshData {
    fn from(mesh: TriMesh) -> Self {
        Self {
            vertices: mesh.vertices,
            faces: mesh.faces,
            flags: mesh.flags,
            obstacle_counts: Some(mesh.obstacle_counts),
        }
    }
}

impl TriMesh {
    /// Build a mesh and its adjacency.
    ///
    /// `flags: None` means the mesh has no flag layer at all (not the same as
    /// every triangle having no flags: exit-cluster detection skips such
    /// meshes with a warning). `obstacle_counts: None` means all zero.
    pub fn new(
        vertices: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        flags: Option<Vec<TriangleFlags>>,
        obstacle_counts: Option<Vec<u16>>,
    ) -> Result<Self> {
        let vertex_count = vertices.len();
        for (i, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(NavGraphError::InvalidMesh(format!(
                    "face {i} references vertex {bad}, but the mesh has {vertex_count} vertices"
                )));
            }
        }
        if let Some(flags) = &flags {
            if flags.len() != faces.len() {
                return Err(NavGraphError::InvalidMesh(format!(
                    "flag layer has {} entries for {} faces",
                    flags.len(),
                    faces.len()
                )));
            }
        }
        let obstacle_counts = match obstacle_counts {
            Some(counts) if counts.len() != faces.len() => {
                return Err(NavGraphError::InvalidMesh(format!(
                    "obstacle counts have {} entries for {} faces",
                    counts.len(),
                    faces.len()
                )));
            }
            Some(counts) => counts,
            None => vec![0; faces.len()],
        };

        let adjacency = build_adjacency(&faces);
        Ok(Self {
            vertices,
            faces,
            flags,
            obstacle_counts,
            adjacency,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn has_flag_layer(&self) -> bool {
        self.flags.is_some()
    }

    pub fn obstacle_count(&self, tri: TriIndex) -> u16 {
        self.obstacle_counts[tri as usize]
    }

    pub fn triangle(&self, tri: TriIndex) -> Triangle {
        Triangle {
            index: tri,
            vertices: self.vertices_of(tri),
            flags: self.flags_of(tri),
            obstacle_count: self.obstacle_count(tri),
        }
    }

    /// All triangles in index order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len() as TriIndex).map(|i| self.triangle(i))
    }

    pub fn check_triangle(&self, tri: TriIndex) -> Result<()> {
        if (tri as usize) < self.faces.len() {
            Ok(())
        } else {
            Err(NavGraphError::TriangleOutOfRange {
                triangle: tri,
                count: self.faces.len(),
            })
        }
    }
}

impl MeshView for TriMesh {
    fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    fn vertices_of(&self, tri: TriIndex) -> [Vec3; 3] {
        let [a, b, c] = self.faces[tri as usize];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    fn flags_of(&self, tri: TriIndex) -> TriangleFlags {
        self.flags
            .as_ref()
            .map_or(TriangleFlags::NONE, |flags| flags[tri as usize])
    }

    fn neighbors_of(&self, tri: TriIndex) -> &[TriIndex] {
        &self.adjacency[tri as usize]
    }

    fn deduped(&self, merge_distance: f32) -> TriMesh {
        let weld = weld_vertices(&self.vertices, merge_distance);
        let faces: Vec<[u32; 3]> = self
            .faces
            .iter()
            .map(|face| face.map(|v| weld.remap[v as usize]))
            .collect();
        let adjacency = build_adjacency(&faces);
        TriMesh {
            vertices: weld.positions,
            faces,
            flags: self.flags.clone(),
            obstacle_counts: self.obstacle_counts.clone(),
            adjacency,
        }
    }
}

/// Edge → faces map, then per-face neighbor lists in edge order.
fn build_adjacency(faces: &[[u32; 3]]) -> Vec<SmallVec<[TriIndex; 3]>> {
    let mut edge_faces: FxHashMap<(u32, u32), SmallVec<[TriIndex; 2]>> = FxHashMap::default();
    for (i, face) in faces.iter().enumerate() {
        for key in face_edges(face) {
            edge_faces.entry(key).or_default().push(i as TriIndex);
        }
    }

    faces
        .iter()
        .enumerate()
        .map(|(i, face)| {
            let me = i as TriIndex;
            let mut neighbors: SmallVec<[TriIndex; 3]> = SmallVec::new();
            for key in face_edges(face) {
                for &other in &edge_faces[&key] {
                    if other != me && !neighbors.contains(&other) {
                        neighbors.push(other);
                    }
                }
            }
            neighbors
        })
        .collect()
}

/// The non-degenerate undirected edges of a face, as `(min, max)` pairs.
fn face_edges(face: &[u32; 3]) -> impl Iterator<Item = (u32, u32)> {
    let [a, b, c] = *face;
    let mut edges: SmallVec<[(u32, u32); 3]> = SmallVec::new();
    for (p, q) in [(a, b), (b, c), (c, a)] {
        if p == q {
            continue;
        }
        let key = (p.min(q), p.max(q));
        if !edges.contains(&key) {
            edges.push(key);
        }
    }
    edges.into_iter()
}
