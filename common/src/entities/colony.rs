//! The Colony entity.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::ids::{ColonyId, ConstructionProjectId, HouseId, KastraId, NeoriaId, RepairProjectId, SystemId};

/// Planetary ground defenses and manpower, distinct from fleet squadrons.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundForces {
    pub marine_divisions: u32,
    pub army_divisions: u32,
    pub ground_batteries: u32,
    /// 0 = no shield.
    pub planetary_shield_level: u32,
}

/// A fighter squadron accumulated planet-side before loading onto a
/// carrier or commissioning as a standalone defense asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetaryFighterSquadron {
    /// Up to 12 ships; a full squadron has exactly 12.
    pub ship_count: u32,
}

impl PlanetaryFighterSquadron {
    pub const FULL_SIZE: u32 = 12;

    pub fn is_full(&self) -> bool {
        self.ship_count >= Self::FULL_SIZE
    }
}

/// A planetary-improvement project, advanced independently of the
/// facility/ship construction queue and the repair queue (§4.1 Maintenance
/// Phase lists "advance terraforming" as its own step, distinct from
/// "advance construction queues" and "advance repair queues").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerraformProject {
    pub turns_remaining: u32,
    /// Infrastructure granted on completion, scaled by the house's
    /// Terraforming tech level at request time (§6.3 tech table
    /// "terraforming").
    pub infrastructure_bonus: u32,
}

impl TerraformProject {
    pub fn advance_one_turn(&mut self) {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
    }

    pub fn is_complete(&self) -> bool {
        self.turns_remaining == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colony {
    pub id: ColonyId,
    pub system: SystemId,
    pub owner: HouseId,
    pub population_souls: u64,
    /// Derived population units used by production formulas.
    pub population_units: u32,
    pub infrastructure: u32,
    pub industrial_units: u32,
    /// Cached gross output from the last Income Phase; recomputed each turn.
    pub production_capacity: i64,
    pub morale: i32,
    /// `None` defers to the house default tax rate.
    pub tax_rate_override: Option<u8>,
    pub neoria: Vec<NeoriaId>,
    pub kastra: Vec<KastraId>,
    pub ground_forces: GroundForces,
    /// Combat/scout squadrons at this colony not yet assigned to a fleet
    /// (§4.5).
    pub unassigned_squadrons: Vec<crate::ids::SquadronId>,
    /// Commissioned spacelift ships (ETAC, troop transport, freighter)
    /// at this colony not yet assigned to a fleet (§4.4, §4.5) - held as
    /// bare ships rather than squadrons, matching `Fleet::spacelift`.
    pub unassigned_spacelift: Vec<crate::entities::ship::Ship>,
    pub fighter_squadrons: Vec<PlanetaryFighterSquadron>,
    /// Consecutive turns this colony's fighter count has exceeded
    /// `config.capacity.fighter_cap` (§4.8 grace period).
    pub fighter_overflow_turns: u32,
    pub construction_queue: VecDeque<ConstructionProjectId>,
    pub active_project: Option<ConstructionProjectId>,
    pub repair_queue: VecDeque<RepairProjectId>,
    /// Accumulated infrastructure damage from bombardment.
    pub damage: u32,
    /// Set by a blockading fleet during the Conflict Phase; halts this
    /// colony's next Income Phase production, then clears (§4.7 Blockade).
    pub blockaded: bool,
    /// At most one in flight per colony (§4.1, §4.4 Maintenance Phase
    /// "advance terraforming").
    pub terraform_project: Option<TerraformProject>,
}

impl Colony {
    pub fn new(id: ColonyId, system: SystemId, owner: HouseId) -> Self {
        Self {
            id,
            system,
            owner,
            population_souls: 0,
            population_units: 0,
            infrastructure: 0,
            industrial_units: 0,
            production_capacity: 0,
            morale: 50,
            tax_rate_override: None,
            neoria: Vec::new(),
            kastra: Vec::new(),
            ground_forces: GroundForces::default(),
            unassigned_squadrons: Vec::new(),
            unassigned_spacelift: Vec::new(),
            fighter_squadrons: Vec::new(),
            fighter_overflow_turns: 0,
            construction_queue: VecDeque::new(),
            active_project: None,
            repair_queue: VecDeque::new(),
            damage: 0,
            blockaded: false,
            terraform_project: None,
        }
    }

    pub fn effective_tax_rate(&self, house_default: u8) -> u8 {
        self.tax_rate_override.unwrap_or(house_default)
    }

    pub fn full_fighter_squadrons(&self) -> u32 {
        self.fighter_squadrons.iter().filter(|sq| sq.is_full()).count() as u32
    }
}
