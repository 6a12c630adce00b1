//! The System entity — a static starmap node.

use serde::{Deserialize, Serialize};

use crate::ids::SystemId;

/// Hex coordinate using axial (q, r) notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Axial-coordinate hex distance.
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q) as i64;
        let dr = (self.r - other.r) as i64;
        let ds = -dq - dr;
        (dq.unsigned_abs().max(dr.unsigned_abs()).max(ds.unsigned_abs())) as u32
    }
}

/// Lane classification governing movement rules (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneClass {
    /// Controlled-major lanes permit two-hop movement when every
    /// intermediate system is owned by the mover.
    Major,
    Minor,
    /// Crippled ships and spacelift ships cannot cross these.
    Restricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetClass {
    Inferno,
    Barren,
    Tundra,
    Ocean,
    Terran,
    GasGiant,
    Asteroid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct System {
    pub id: SystemId,
    pub coord: HexCoord,
    /// Distance from the map center, 0-indexed.
    pub ring_index: u32,
    pub planet_class: PlanetClass,
    /// Base resource rating feeding production formulas (§4.4).
    pub resource_rating: u32,
    pub adjacency: Vec<(SystemId, LaneClass)>,
}

impl System {
    pub fn lane_to(&self, target: SystemId) -> Option<LaneClass> {
        self.adjacency
            .iter()
            .find(|(id, _)| *id == target)
            .map(|(_, class)| *class)
    }

    pub fn neighbors(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.adjacency.iter().map(|(id, _)| *id)
    }
}
