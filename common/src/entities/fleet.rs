//! The Fleet entity — an operational command unit.

use serde::{Deserialize, Serialize};

use crate::entities::ship::Ship;
use crate::entities::squadron::Squadron;
use crate::ids::{FleetId, HouseId, SystemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetStatus {
    Active,
    Reserve,
    Mothballed,
}

/// Rules-of-engagement scale (0-10) governing standing-order auto-retreat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Roe(pub u8);

impl Roe {
    pub fn clamped(value: u8) -> Self {
        Roe(value.min(10))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    HoldPosition,
    MoveTo(SystemId),
    Patrol(SystemId),
    Blockade(SystemId),
    Bombard(SystemId),
    Invade(SystemId),
    Blitz(SystemId),
    AutoEvade,
    /// Founds a colony at the named system using an ETAC's PTU cargo
    /// (§4.4, glossary "ETAC"). Resolved once the carrying fleet is
    /// stationary at the target system; the ETAC is consumed on success
    /// (§9 Open Questions: one-time consumable model, not a reload cycle).
    Colonize(SystemId),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetOrder {
    pub kind: OrderKind,
    pub roe: Roe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingOrder {
    pub order: FleetOrder,
    pub enabled: bool,
    /// Resets to the configured delay whenever an explicit order is
    /// accepted (§9 Design Notes).
    pub turns_until_activation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    pub owner: HouseId,
    pub location: SystemId,
    pub squadrons: Vec<Squadron>,
    /// Spacelift ships (ETAC, troop transport, freighter) not organized
    /// into combat squadrons.
    pub spacelift: Vec<Ship>,
    pub status: FleetStatus,
    pub auto_balance: bool,
    pub current_order: Option<FleetOrder>,
    pub standing_order: Option<StandingOrder>,
}

impl Fleet {
    pub fn new(id: FleetId, owner: HouseId, location: SystemId) -> Self {
        Self {
            id,
            owner,
            location,
            squadrons: Vec::new(),
            spacelift: Vec::new(),
            status: FleetStatus::Active,
            auto_balance: true,
            current_order: None,
            standing_order: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.squadrons.iter().all(|s| s.is_destroyed()) && self.spacelift.iter().all(|s| !s.is_alive())
    }

    pub fn is_stationary(&self) -> bool {
        self.current_order.is_none()
            && !matches!(self.status, FleetStatus::Reserve | FleetStatus::Mothballed)
    }

    pub fn can_move(&self) -> bool {
        matches!(self.status, FleetStatus::Active)
    }

    pub fn has_crippled_or_spacelift(&self) -> bool {
        !self.spacelift.is_empty()
            || self
                .squadrons
                .iter()
                .any(|sq| sq.ships().any(|s| s.is_crippled()))
    }

    pub fn all_ships(&self) -> impl Iterator<Item = &Ship> {
        self.squadrons
            .iter()
            .flat_map(|sq| sq.ships())
            .chain(self.spacelift.iter())
    }

    pub fn accept_order(&mut self, order: FleetOrder) {
        self.current_order = Some(order);
        if let Some(standing) = &mut self.standing_order {
            standing.turns_until_activation = standing.turns_until_activation.max(1);
        }
    }
}
