//! The ConstructionProject entity.

use serde::{Deserialize, Serialize};

use crate::entities::ship::ShipClass;
use crate::ids::{ColonyId, ConstructionProjectId, NeoriaId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundUnitKind {
    Marines,
    Army,
    GroundBattery,
    PlanetaryShield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeoriaOrKastraKind {
    Spaceport,
    Shipyard,
    Drydock,
    Starbase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildItem {
    Ship(ShipClass),
    Facility(NeoriaOrKastraKind),
    Ground(GroundUnitKind),
    /// Infrastructure/industrial units (§3.2 Colony fields).
    Industrial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectCategory {
    Ship,
    Facility,
    Ground,
    Industrial,
}

impl BuildItem {
    pub fn category(&self) -> ProjectCategory {
        match self {
            BuildItem::Ship(_) => ProjectCategory::Ship,
            BuildItem::Facility(_) => ProjectCategory::Facility,
            BuildItem::Ground(_) => ProjectCategory::Ground,
            BuildItem::Industrial => ProjectCategory::Industrial,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionProject {
    pub id: ConstructionProjectId,
    pub colony: ColonyId,
    pub item: BuildItem,
    pub quantity: u32,
    pub cost_total: i64,
    pub cost_paid: i64,
    pub turns_remaining: u32,
    /// Dock-class ships occupy a dock at this facility; other builds
    /// occupy a colony queue slot and leave this `None`.
    pub host_neoria: Option<NeoriaId>,
}

impl ConstructionProject {
    pub fn is_complete(&self) -> bool {
        self.turns_remaining == 0 && self.cost_paid >= self.cost_total
    }

    pub fn advance_one_turn(&mut self) {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
    }

    pub fn occupies_dock(&self) -> bool {
        self.host_neoria.is_some()
    }
}
