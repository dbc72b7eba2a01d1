// Core types shared across the navigation graph crate.
//
// Defines the compact index newtypes used as arena handles (`NavmeshId`,
// `NodeId`, `EdgeId`), the triangle index alias, and the NVM per-triangle
// flag bitfield (`TriangleFlags`). All types derive `Serialize` and
// `Deserialize` so graphs and navmeshes can be dumped to JSON by the CLI.
//
// Ids are plain positions in the owning `Vec` (the map's navmesh list, or
// `Graph.nodes` / `Graph.edges`). They are only stable until something is
// removed from that `Vec`; see `maintenance.rs` for the re-indexing rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a triangle within one navmesh. Stable for the lifetime of the
/// loaded navmesh.
pub type TriIndex = u32;

// ---------------------------------------------------------------------------
// Arena ids
// ---------------------------------------------------------------------------

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

index_id!(/// Position of a navmesh in the map's ordered navmesh list.
NavmeshId);
index_id!(/// Position of a node in `Graph.nodes`.
NodeId);
index_id!(/// Position of an edge in `Graph.edges`.
EdgeId);

// ---------------------------------------------------------------------------
// Triangle flags
// ---------------------------------------------------------------------------

/// NVM per-triangle flag bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriangleFlags(u16);

impl TriangleFlags {
    pub const NONE: Self = Self(0);
    pub const DISABLE: Self = Self(1 << 0);
    pub const DEGENERATE: Self = Self(1 << 1);
    pub const OBSTACLE: Self = Self(1 << 2);
    pub const DOOR: Self = Self(1 << 3);
    pub const CLOSED_DOOR: Self = Self(1 << 4);
    pub const EXIT: Self = Self(1 << 5);
    pub const HOLE: Self = Self(1 << 6);
    pub const LADDER: Self = Self(1 << 7);
    pub const CLOSED_LADDER: Self = Self(1 << 8);
    pub const EDGE: Self = Self(1 << 9);
    pub const VIEW: Self = Self(1 << 10);
    pub const LANDING_POINT: Self = Self(1 << 11);
    pub const EVENT: Self = Self(1 << 12);
    pub const WALL: Self = Self(1 << 13);
    pub const BLOCK_EXIT: Self = Self(1 << 14);
    pub const FLOOR_BENEATH_WALL: Self = Self(1 << 15);

    const NAMED: [(Self, &'static str); 16] = [
        (Self::DISABLE, "Disable"),
        (Self::DEGENERATE, "Degenerate"),
        (Self::OBSTACLE, "Obstacle"),
        (Self::DOOR, "Door"),
        (Self::CLOSED_DOOR, "ClosedDoor"),
        (Self::EXIT, "Exit"),
        (Self::HOLE, "Hole"),
        (Self::LADDER, "Ladder"),
        (Self::CLOSED_LADDER, "ClosedLadder"),
        (Self::EDGE, "Edge"),
        (Self::VIEW, "View"),
        (Self::LANDING_POINT, "LandingPoint"),
        (Self::EVENT, "Event"),
        (Self::WALL, "Wall"),
        (Self::BLOCK_EXIT, "BlockExit"),
        (Self::FLOOR_BENEATH_WALL, "FloorBeneathWall"),
    ];

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Names of the set flags, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|&(_, name)| name)
            .collect()
    }
}

impl std::ops::BitOr for TriangleFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for TriangleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "TriangleFlags(Default)");
        }
        write!(f, "TriangleFlags({})", self.names().join(" | "))
    }
}
