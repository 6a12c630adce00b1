//! The Neoria entity — a per-colony production/repair facility.

use serde::{Deserialize, Serialize};

use crate::ids::{ConstructionProjectId, NeoriaId, RepairProjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeoriaKind {
    Spaceport,
    /// Requires a `Spaceport` at the same colony.
    Shipyard,
    /// Requires a `Spaceport` at the same colony.
    Drydock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neoria {
    pub id: NeoriaId,
    pub kind: NeoriaKind,
    pub commissioned_turn: u32,
    pub base_docks: u32,
    /// Monotonic function of construction-tech level (§3.2 invariant).
    pub effective_docks: u32,
    pub crippled: bool,
    /// Dock-class projects currently occupying a dock at this facility.
    pub active_projects: Vec<ConstructionProjectId>,
    /// Ship repairs hosted at this facility (`Drydock` only, §3.2); these
    /// share the same dock pool as `active_projects` rather than a
    /// separate capacity.
    pub active_repairs: Vec<RepairProjectId>,
}

impl Neoria {
    pub fn new(id: NeoriaId, kind: NeoriaKind, commissioned_turn: u32, base_docks: u32) -> Self {
        Self {
            id,
            kind,
            commissioned_turn,
            base_docks,
            effective_docks: base_docks,
            crippled: false,
            active_projects: Vec::new(),
            active_repairs: Vec::new(),
        }
    }

    pub fn docks_free(&self) -> u32 {
        if self.crippled {
            return 0;
        }
        self.effective_docks
            .saturating_sub((self.active_projects.len() + self.active_repairs.len()) as u32)
    }

    pub fn has_free_dock(&self) -> bool {
        self.docks_free() > 0
    }

    /// Rescales `effective_docks` from `base_docks` by a construction-tech
    /// multiplier (§3.2 invariant: monotonic in tech level). Never drops
    /// capacity below what's already occupied, so a tech regression can't
    /// strand an in-progress project without a dock.
    pub fn recompute_effective_docks(&mut self, multiplier: f64) {
        let scaled = (self.base_docks as f64 * multiplier).round() as u32;
        let occupied = (self.active_projects.len() + self.active_repairs.len()) as u32;
        self.effective_docks = scaled.max(occupied);
    }
}
