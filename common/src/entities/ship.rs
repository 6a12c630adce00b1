//! The Ship entity and its class table.

use serde::{Deserialize, Serialize};

use crate::ids::{HouseId, ShipId};

/// Ship class. Stats are looked up from `Config::ships` (§6.3); this enum
/// is the closed tagged variant §9 calls for ("no inheritance").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShipClass {
    Scout,
    Fighter,
    Corvette,
    Frigate,
    Destroyer,
    LightCruiser,
    HeavyCruiser,
    Battlecruiser,
    Battleship,
    Dreadnought,
    PlanetBreaker,
    LightCarrier,
    Carrier,
    CommandCruiser,
    MineLayer,
    Monitor,
    Raider,
    Etac,
    TroopTransport,
    Freighter,
}

impl ShipClass {
    pub const ALL: [ShipClass; 20] = [
        ShipClass::Scout,
        ShipClass::Fighter,
        ShipClass::Corvette,
        ShipClass::Frigate,
        ShipClass::Destroyer,
        ShipClass::LightCruiser,
        ShipClass::HeavyCruiser,
        ShipClass::Battlecruiser,
        ShipClass::Battleship,
        ShipClass::Dreadnought,
        ShipClass::PlanetBreaker,
        ShipClass::LightCarrier,
        ShipClass::Carrier,
        ShipClass::CommandCruiser,
        ShipClass::MineLayer,
        ShipClass::Monitor,
        ShipClass::Raider,
        ShipClass::Etac,
        ShipClass::TroopTransport,
        ShipClass::Freighter,
    ];

    pub fn is_fighter(&self) -> bool {
        matches!(self, ShipClass::Fighter)
    }

    pub fn is_scout(&self) -> bool {
        matches!(self, ShipClass::Scout)
    }

    pub fn is_etac(&self) -> bool {
        matches!(self, ShipClass::Etac)
    }

    pub fn is_troop_transport(&self) -> bool {
        matches!(self, ShipClass::TroopTransport)
    }

    /// Spacelift ships carry cargo and are not dock-class combat hulls;
    /// §4.4's build-validation dock requirement does not apply to them.
    pub fn is_spacelift(&self) -> bool {
        matches!(
            self,
            ShipClass::Etac | ShipClass::TroopTransport | ShipClass::Freighter
        )
    }

    /// Dock-class ships require an available dock slot at build time
    /// (§4.4) — everything except fighters, ETACs, and troop transports.
    pub fn is_dock_class(&self) -> bool {
        !matches!(
            self,
            ShipClass::Fighter | ShipClass::Etac | ShipClass::TroopTransport
        )
    }

    pub fn is_carrier(&self) -> bool {
        matches!(self, ShipClass::LightCarrier | ShipClass::Carrier)
    }

    pub fn is_planet_breaker(&self) -> bool {
        matches!(self, ShipClass::PlanetBreaker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipCombatState {
    Undamaged,
    /// Fighters never occupy this state (§8 Hit application).
    Crippled,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CargoKind {
    /// Population transfer units carried by an ETAC.
    Ptu,
    GroundForces,
    Freight,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CargoHold {
    pub kind: CargoKind,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub class: ShipClass,
    pub tech_level: u32,
    pub state: ShipCombatState,
    /// Only populated for spacelift classes.
    pub cargo: Option<CargoHold>,
    /// Ids of fighter ships embarked in this carrier's hangar. Only
    /// populated for carrier classes.
    pub embarked_fighters: Vec<ShipId>,
    pub owner: HouseId,
}

impl Ship {
    pub fn new(id: ShipId, class: ShipClass, tech_level: u32, owner: HouseId) -> Self {
        Self {
            id,
            class,
            tech_level,
            state: ShipCombatState::Undamaged,
            cargo: None,
            embarked_fighters: Vec::new(),
            owner,
        }
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.state, ShipCombatState::Destroyed)
    }

    pub fn is_crippled(&self) -> bool {
        matches!(self.state, ShipCombatState::Crippled)
    }

    pub fn hangar_free(&self, capacity: u32) -> u32 {
        capacity.saturating_sub(self.embarked_fighters.len() as u32)
    }
}
