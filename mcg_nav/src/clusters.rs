// Exit-cluster detection.
//
// An exit cluster is a maximal edge-connected group of `Exit`-flagged
// triangles within one navmesh. Clusters are found by BFS from each
// not-yet-checked exit triangle in index order, only stepping onto other exit
// triangles. The `checked` set is shared across the whole scan, so every
// triangle is visited at most once.
//
// Each clustered triangle carries its corner positions in world space, kept
// as a set (exactly equal corners collapse). The graph builder compares these
// positions across navmeshes to find clusters that touch along an edge.
//
// A navmesh without a flag layer has no exit triangles; that is logged and
// yields no clusters.

use crate::mesh::MeshView;
use crate::navmesh::Navmesh;
use crate::types::{TriIndex, TriangleFlags};
use glam::Vec3;
use log::warn;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// An exit triangle and its distinct world-space corner positions.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterTriangle {
    pub index: TriIndex,
    pub world_vertices: SmallVec<[Vec3; 3]>,
}

/// A connected group of exit triangles, in BFS discovery order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExitCluster {
    pub triangles: Vec<ClusterTriangle>,
}

impl ExitCluster {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangle indices, sorted ascending.
    pub fn triangle_indices(&self) -> Vec<TriIndex> {
        let mut indices: Vec<TriIndex> = self.triangles.iter().map(|t| t.index).collect();
        indices.sort_unstable();
        indices
    }

    /// Every corner of every triangle (shared corners repeat).
    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.triangles
            .iter()
            .flat_map(|t| t.world_vertices.iter().copied())
    }

    /// True if some triangle of `self` and some triangle of `other` have at
    /// least two corners in common, i.e. share an edge. Corners match when
    /// their squared distance is below `match_distance_sq`.
    pub fn shares_edge_with(&self, other: &ExitCluster, match_distance_sq: f32) -> bool {
        self.triangles.iter().any(|a| {
            other.triangles.iter().any(|b| {
                let hits = a
                    .world_vertices
                    .iter()
                    .flat_map(|va| b.world_vertices.iter().map(move |vb| va.distance_squared(*vb)))
                    .filter(|&d| d < match_distance_sq)
                    .count();
                hits >= 2
            })
        })
    }
}

/// Find all exit clusters of `navmesh`.
pub fn find_exit_clusters(navmesh: &Navmesh) -> Vec<ExitCluster> {
    let mesh = &navmesh.mesh;
    if !mesh.has_flag_layer() {
        warn!(
            "navmesh '{}' has no triangle flag layer; it contributes no exit clusters",
            navmesh.name
        );
        return Vec::new();
    }

    let is_exit = |tri: TriIndex| mesh.flags_of(tri).contains(TriangleFlags::EXIT);
    let count = mesh.triangle_count();
    let mut checked = vec![false; count];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..count as TriIndex {
        if checked[seed as usize] || !is_exit(seed) {
            continue;
        }
        checked[seed as usize] = true;
        queue.push_back(seed);

        let mut cluster = ExitCluster::default();
        while let Some(tri) = queue.pop_front() {
            cluster.triangles.push(ClusterTriangle {
                index: tri,
                world_vertices: distinct_corners(navmesh.world_vertices_of(tri)),
            });
            for &neighbor in mesh.neighbors_of(tri) {
                if !checked[neighbor as usize] && is_exit(neighbor) {
                    checked[neighbor as usize] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        clusters.push(cluster);
    }

    clusters
}

fn distinct_corners(corners: [Vec3; 3]) -> SmallVec<[Vec3; 3]> {
    let mut out: SmallVec<[Vec3; 3]> = SmallVec::new();
    for corner in corners {
        if !out.contains(&corner) {
            out.push(corner);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh;
    use crate::test_meshes;

    fn fan_navmesh(exits: &[TriIndex]) -> Navmesh {
        let flags: Vec<_> = exits.iter().map(|&t| (t, TriangleFlags::EXIT)).collect();
        Navmesh::new("n0000", Vec3::ZERO, test_meshes::open_fan(6, &flags).unwrap())
    }

    #[test]
    fn fan_splits_into_two_clusters() {
        let navmesh = fan_navmesh(&[0, 1, 2, 4, 5]);
        let clusters = find_exit_clusters(&navmesh);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].triangle_indices(), vec![0, 1, 2]);
        assert_eq!(clusters[1].triangle_indices(), vec![4, 5]);
        assert!(clusters.iter().all(|c| !c.triangle_indices().contains(&3)));
    }

    #[test]
    fn exit_flag_combined_with_others_still_counts() {
        let mesh = test_meshes::strip(
            3,
            &[
                (0, TriangleFlags::EXIT | TriangleFlags::WALL),
                (1, TriangleFlags::EXIT),
            ],
        )
        .unwrap();
        let clusters = find_exit_clusters(&Navmesh::new("n0001", Vec3::ZERO, mesh));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].triangle_indices(), vec![0, 1]);
    }

    #[test]
    fn no_exit_triangles_no_clusters() {
        let navmesh = fan_navmesh(&[]);
        assert!(find_exit_clusters(&navmesh).is_empty());
    }

    #[test]
    fn missing_flag_layer_no_clusters() {
        let fan = test_meshes::open_fan(3, &[]).unwrap();
        let bare = TriMesh::new(fan.vertices().to_vec(), fan.faces().to_vec(), None, None).unwrap();
        let clusters = find_exit_clusters(&Navmesh::new("n0002", Vec3::ZERO, bare));
        assert!(clusters.is_empty());
    }

    #[test]
    fn cluster_vertices_are_in_world_space() {
        let navmesh =
            test_meshes::corridor("n0003", Vec3::new(100.0, 5.0, 0.0), 2, true, false).unwrap();
        let clusters = find_exit_clusters(&navmesh);
        assert_eq!(clusters.len(), 1);
        let first = &clusters[0].triangles[0];
        assert_eq!(first.index, 0);
        assert!(first.world_vertices.contains(&Vec3::new(100.0, 5.0, 0.0)));
        assert_eq!(clusters[0].world_vertices().count(), 6);
    }

    #[test]
    fn touching_corridors_share_an_edge() {
        let config = crate::config::NavGraphConfig::default();
        let left = test_meshes::corridor("n0000", Vec3::ZERO, 2, false, true).unwrap();
        let right = test_meshes::corridor("n0001", Vec3::new(2.0, 0.0, 0.0), 2, true, false).unwrap();
        let a = &find_exit_clusters(&left)[0];
        let b = &find_exit_clusters(&right)[0];
        assert!(a.shares_edge_with(b, config.vertex_match_distance_sq()));
        assert!(b.shares_edge_with(a, config.vertex_match_distance_sq()));
    }

    #[test]
    fn single_shared_corner_is_not_an_edge() {
        let config = crate::config::NavGraphConfig::default();
        let left = test_meshes::corridor("n0000", Vec3::ZERO, 1, false, true).unwrap();
        // Shifted so only the corner (1, 0, 1) of `left` meets (0, 0, 0) of `right`.
        let right = test_meshes::corridor("n0001", Vec3::new(1.0, 0.0, 1.0), 1, true, false).unwrap();
        let a = &find_exit_clusters(&left)[0];
        let b = &find_exit_clusters(&right)[0];
        assert!(!a.shares_edge_with(b, config.vertex_match_distance_sq()));
    }
}
