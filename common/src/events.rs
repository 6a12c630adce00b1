//! The structured event log (§4.12). Every phase appends events here
//! instead of mutating output directly; the orchestrator returns the
//! accumulated log alongside the new state.

use serde::{Deserialize, Serialize};

use crate::entities::construction::BuildItem;
use crate::entities::diplomacy::DiplomaticState;
use crate::entities::house::TechField;
use crate::entities::prestige::PrestigeSource;
use crate::errors::OrderRejectReason;
use crate::espionage_kinds::EspionageAction;
use crate::ids::{
    ColonyId, ConstructionProjectId, FleetId, HouseId, KastraId, NeoriaId, RepairProjectId, ShipId,
    SquadronId, SystemId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Maintenance,
    Income,
    Command,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub turn: u32,
    pub phase: Phase,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    OrderAccepted {
        house: HouseId,
    },
    OrderRejected {
        house: HouseId,
        reason: OrderRejectReason,
    },
    ConstructionStarted {
        colony: ColonyId,
        project: ConstructionProjectId,
        item: BuildItem,
    },
    ConstructionCompleted {
        colony: ColonyId,
        project: ConstructionProjectId,
        item: BuildItem,
    },
    ShipCommissioned {
        colony: ColonyId,
        ship: ShipId,
    },
    BuildingCompleted {
        colony: ColonyId,
        neoria: NeoriaId,
    },
    UnitRecruited {
        colony: ColonyId,
    },
    RepairStarted {
        colony: ColonyId,
        project: RepairProjectId,
    },
    RepairCompleted {
        colony: ColonyId,
        project: RepairProjectId,
    },
    TerraformStarted {
        colony: ColonyId,
    },
    TerraformCompleted {
        colony: ColonyId,
        infrastructure_gained: u32,
    },
    FleetMoved {
        fleet: FleetId,
        from: SystemId,
        to: SystemId,
    },
    FleetMoveDenied {
        fleet: FleetId,
        from: SystemId,
        to: SystemId,
        reason: OrderRejectReason,
    },
    /// Same-owner fleets that arrived at a shared destination this turn
    /// merged into the lowest-id fleet (§4.6 rendezvous rule).
    FleetsMerged {
        surviving: FleetId,
        absorbed: Vec<FleetId>,
    },
    CombatResolved {
        system: SystemId,
        rounds: u32,
        attackers: HouseId,
        defenders: Vec<HouseId>,
        attacker_ships_lost: u32,
        defender_ships_lost: u32,
    },
    SquadronScrapped {
        squadron: SquadronId,
        owner: HouseId,
    },
    StarbaseBuilt {
        colony: ColonyId,
        kastra: KastraId,
    },
    ColonyEstablished {
        colony: ColonyId,
        system: SystemId,
        owner: HouseId,
    },
    ColonyConquered {
        colony: ColonyId,
        from: HouseId,
        to: HouseId,
    },
    EspionageExecuted {
        acting_house: HouseId,
        target_house: HouseId,
        action: EspionageAction,
        success: bool,
        detected: bool,
    },
    DiplomaticStateChanged {
        a: HouseId,
        b: HouseId,
        from: DiplomaticState,
        to: DiplomaticState,
    },
    PrestigeAwarded {
        house: HouseId,
        source: PrestigeSource,
        amount: i64,
    },
    PrestigePenalized {
        house: HouseId,
        source: PrestigeSource,
        amount: i64,
    },
    CapacityEnforced {
        colony: ColonyId,
        excess: u32,
        salvaged: u32,
    },
    /// A capacity enforcer (§4.8) found a violation that should have been
    /// impossible given load/build-time checks, or another bookkeeping
    /// invariant was found broken (§7 "invariant violation"). Diagnostic
    /// only — the engine keeps running but the caller should treat the
    /// resulting state as `Suspect`.
    InvariantViolation {
        description: String,
    },
    TechAdvanced {
        house: HouseId,
        field: TechField,
        level: u32,
    },
    HouseEliminated {
        house: HouseId,
        turn: u32,
    },
    VictoryAchieved {
        house: HouseId,
        turn: u32,
        prestige_total: i64,
    },
}

/// Append-only accumulator passed by `&mut` through each phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<EventEnvelope>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, turn: u32, phase: Phase, kind: EventKind) {
        self.events.push(EventEnvelope { turn, phase, kind });
    }

    pub fn into_events(self) -> Vec<EventEnvelope> {
        self.events
    }

    pub fn as_slice(&self) -> &[EventEnvelope] {
        &self.events
    }
}
