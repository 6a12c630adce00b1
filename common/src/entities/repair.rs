//! The RepairProject entity.

use serde::{Deserialize, Serialize};

use crate::ids::{ColonyId, FleetId, KastraId, RepairProjectId, ShipId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairTarget {
    /// Must be hosted on a `Drydock`; does not consume dock capacity for
    /// starbase repairs, but ship repairs do require the drydock slot.
    Ship { fleet: FleetId, ship: ShipId },
    /// Starbase repairs never consume dock capacity (§3.2).
    Starbase { kastra: KastraId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairProject {
    pub id: RepairProjectId,
    pub colony: ColonyId,
    pub target: RepairTarget,
    /// 25% of the target's build cost (§3.2).
    pub cost: i64,
    pub turns_remaining: u32,
    pub priority: u32,
}

impl RepairProject {
    pub fn new(id: RepairProjectId, colony: ColonyId, target: RepairTarget, cost: i64, priority: u32) -> Self {
        Self {
            id,
            colony,
            target,
            cost,
            turns_remaining: 1,
            priority,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.turns_remaining == 0
    }

    pub fn advance_one_turn(&mut self) {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
    }

    pub fn requires_dock(&self) -> bool {
        matches!(self.target, RepairTarget::Ship { .. })
    }
}
