//! Command packet format (§6.2): one per house per turn, validated item by
//! item so a single malformed entry never aborts the rest of the packet.

use serde::{Deserialize, Serialize};

use ec4x_common::entities::construction::BuildItem;
use ec4x_common::entities::diplomacy::DiplomaticState;
use ec4x_common::entities::fleet::{FleetOrder, FleetStatus};
use ec4x_common::entities::house::TechField;
use ec4x_common::espionage_kinds::EspionageAction;
use ec4x_common::ids::{ColonyId, FleetId, HouseId, KastraId, ShipId, SquadronId};

/// Zero-turn administrative commands (§4 Command Phase step (c), §9
/// "zero-turn admin vs operational orders"): applied before any build or
/// movement logic, and each item is rejected independently on failure
/// rather than failing the whole packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdminCommand {
    /// Moves a colony's unassigned squadron into an existing fleet.
    AssignSquadron { squadron: SquadronId, fleet: FleetId },
    /// Folds `from` into `into`; both must share owner and location.
    MergeFleets { from: FleetId, into: FleetId },
    SetFleetStatus { fleet: FleetId, status: FleetStatus },
    /// `None` reverts the colony to the house's default tax rate.
    SetColonyTaxOverride { colony: ColonyId, rate: Option<u8> },
    /// Queues repair of a crippled ship at a colony-hosted `Drydock`
    /// (§3.2 RepairProject).
    RequestShipRepair { fleet: FleetId, ship: ShipId },
    /// Queues repair of a crippled starbase; never consumes a dock slot.
    RequestStarbaseRepair { kastra: KastraId },
    /// Queues a terraforming project at a colony (§4.1 Maintenance Phase
    /// "advance terraforming"); paid up front like a build order.
    RequestTerraform { colony: ColonyId },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuildCommand {
    pub colony: ColonyId,
    pub item: BuildItem,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetCommand {
    pub fleet: FleetId,
    pub order: FleetOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingOrderUpdate {
    pub fleet: FleetId,
    /// `None` clears the standing order entirely.
    pub order: Option<FleetOrder>,
    pub enabled: bool,
}

/// Treasury committed toward advancing one tech field by one level this
/// turn (§4.1 Income Phase "process research spending against tech tree").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResearchAllocation {
    pub field: TechField,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EspionageOrder {
    pub target_house: HouseId,
    pub action: EspionageAction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiplomaticOrder {
    pub other_house: HouseId,
    pub to: DiplomaticState,
}

/// A per-house per-turn bundle (§6.2). `turn` must equal the engine's next
/// turn and `house` must match the submitting house or the whole packet is
/// rejected as out-of-turn before any item inside it is examined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandPacket {
    pub turn: u32,
    pub house: HouseId,
    pub admin_commands: Vec<AdminCommand>,
    pub build_commands: Vec<BuildCommand>,
    pub fleet_commands: Vec<FleetCommand>,
    pub standing_order_updates: Vec<StandingOrderUpdate>,
    pub tax_rate: Option<u8>,
    pub research_allocations: Vec<ResearchAllocation>,
    pub espionage_orders: Vec<EspionageOrder>,
    pub diplomatic_orders: Vec<DiplomaticOrder>,
}

impl CommandPacket {
    /// An otherwise-empty packet binding a house to a turn — the shape
    /// used by scenarios that submit no orders (§8 scenario 1).
    pub fn empty(turn: u32, house: HouseId) -> Self {
        Self {
            turn,
            house,
            admin_commands: Vec::new(),
            build_commands: Vec::new(),
            fleet_commands: Vec::new(),
            standing_order_updates: Vec::new(),
            tax_rate: None,
            research_allocations: Vec::new(),
            espionage_orders: Vec::new(),
            diplomatic_orders: Vec::new(),
        }
    }
}
