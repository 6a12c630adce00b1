//! Error taxonomy (§7.1 expansion).
//!
//! Three distinct shapes, not one `enum EngineError` for everything:
//! - [`ConfigError`] (in `config.rs`) is fatal and only ever surfaces from
//!   `Config::validate` at game-construction time.
//! - [`OrderRejectReason`] is a data payload carried on an `OrderRejected`
//!   event, never thrown - a malformed or illegal order does not abort
//!   turn resolution, it is simply refused for that one house.
//! - [`EngineError`] aggregates the above plus setup failures and is the
//!   `Err` type of `new_game` only; `resolve_turn` is infallible once a
//!   game exists (§7 "never panics, never partially applies a turn").

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::ids::{ColonyId, FleetId, HouseId, KastraId, NeoriaId, ShipId, SystemId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRejectReason {
    UnknownFleet(FleetId),
    UnknownColony(ColonyId),
    UnknownShip(ShipId),
    UnknownStarbase(KastraId),
    FleetNotOwnedByHouse { fleet: FleetId, house: HouseId },
    ColonyNotOwnedByHouse { colony: ColonyId, house: HouseId },
    DestinationNotAdjacent { from: SystemId, to: SystemId },
    DestinationUnreachable { from: SystemId, to: SystemId },
    InsufficientTreasury { required: i64, available: i64 },
    NoDockAvailable { neoria: NeoriaId },
    MissingTechPrerequisite { field: String, required_level: u32, actual_level: u32 },
    /// A `Shipyard`/`Drydock` was ordered at a colony with no `Spaceport`
    /// yet (§3.2 Neoria invariant: "`Shipyard` and `Drydock` require
    /// `Spaceport` at same colony").
    MissingFacilityPrerequisite { colony: ColonyId, required: String },
    InvalidTaxRate(u8),
    HouseEliminated(HouseId),
    HouseInDefensiveCollapse(HouseId),
    FleetCannotMoveWhileCrippled(FleetId),
    RestrictedLaneDenied { from: SystemId, to: SystemId },
    CapacityExceeded { requested: u32, available: u32 },
    ProjectNotFound,
    OrderConflictsWithStandingOrder,
    MalformedPacket(String),
    /// A repair was requested for a ship that is not `Crippled` (§3.2
    /// RepairProject only makes sense against damaged hulls).
    ShipNotCrippled(ShipId),
    /// A repair was requested for a starbase that is not crippled.
    StarbaseNotCrippled(KastraId),
    /// Ship repairs must be hosted on a `Drydock` with a free dock (§3.2).
    NoDrydockAvailable { colony: ColonyId },
}

impl std::fmt::Display for OrderRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("new game requested with {houses} houses but the starmap only seeds {systems} systems")]
    InsufficientStarmap { houses: usize, systems: usize },

    #[error("duplicate house id {0} in new-game request")]
    DuplicateHouse(HouseId),

    #[error("game already concluded at turn {0}, cannot resolve another turn")]
    GameAlreadyConcluded(u32),
}
