// Named navmeshes and the per-map navmesh registry.
//
// A `Navmesh` is a `TriMesh` in its own local space plus a world offset and
// the name the map gives it (e.g. `n0012B0A10`). The leading `n` + 4 digits
// is the navmesh's model ID, which the graph builder uses for node naming and
// for ordering the two navmeshes of a node (A has the lower model ID).
//
// `NavmeshRegistry` owns the ordered navmesh list of one map. A `NavmeshId`
// is a position in that list; graphs store only ids, never navmesh data.
//
// See also: `builder.rs` (consumes the registry), `maintenance.rs` (resolves
// ids back to names when renaming).

use crate::error::{NavGraphError, Result};
use crate::mesh::{MeshView, TriMesh};
use crate::types::{NavmeshId, TriIndex};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The numeric model ID at the start of a navmesh name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u16);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Parse the model ID from a navmesh name: `n` followed by four digits.
/// Anything after the digits (block/area suffixes) is ignored.
pub fn parse_model_id(name: &str) -> Result<ModelId> {
    let invalid = || NavGraphError::InvalidNavmeshName {
        name: name.to_string(),
    };
    let digits = name.strip_prefix('n').ok_or_else(invalid)?;
    let digits = digits.get(..4).ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map(ModelId).map_err(|_| invalid())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Navmesh {
    pub name: String,
    /// Translation from mesh-local to world space.
    #[serde(default = "zero_offset")]
    pub world_offset: Vec3,
    #[serde(flatten)]
    pub mesh: TriMesh,
}

fn zero_offset() -> Vec3 {
    Vec3::ZERO
}

impl Navmesh {
    pub fn new(name: impl Into<String>, world_offset: Vec3, mesh: TriMesh) -> Self {
        Self {
            name: name.into(),
            world_offset,
            mesh,
        }
    }

    pub fn model_id(&self) -> Result<ModelId> {
        parse_model_id(&self.name)
    }

    /// Triangle corners in world space.
    pub fn world_vertices_of(&self, tri: TriIndex) -> [Vec3; 3] {
        self.mesh.vertices_of(tri).map(|v| v + self.world_offset)
    }
}

/// The ordered navmesh list of one map.
#[derive(Clone, Debug, Default)]
pub struct NavmeshRegistry {
    navmeshes: Vec<Navmesh>,
}

impl NavmeshRegistry {
    pub fn new(navmeshes: Vec<Navmesh>) -> Self {
        Self { navmeshes }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| NavGraphError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.navmeshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.navmeshes.is_empty()
    }

    pub fn get(&self, id: NavmeshId) -> Result<&Navmesh> {
        self.navmeshes
            .get(id.index())
            .ok_or(NavGraphError::UnknownNavmesh(id))
    }

    pub fn by_name(&self, name: &str) -> Result<(NavmeshId, &Navmesh)> {
        self.iter()
            .find(|(_, navmesh)| navmesh.name == name)
            .ok_or_else(|| NavGraphError::UnknownNavmeshName(name.to_string()))
    }

    /// Navmeshes with their ids, in map order.
    pub fn iter(&self) -> impl Iterator<Item = (NavmeshId, &Navmesh)> {
        self.navmeshes
            .iter()
            .enumerate()
            .map(|(i, navmesh)| (NavmeshId(i as u32), navmesh))
    }

    pub fn navmeshes(&self) -> &[Navmesh] {
        &self.navmeshes
    }

    /// Name for error messages; unknown ids render as their index.
    pub fn display_name(&self, id: NavmeshId) -> String {
        self.navmeshes
            .get(id.index())
            .map_or_else(|| id.to_string(), |navmesh| navmesh.name.clone())
    }
}
