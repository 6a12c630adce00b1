//! `GameState` — the authoritative entity store (§4.2).
//!
//! Every read returns an owned snapshot or an immutable reference; every
//! write goes through a checked mutator that keeps secondary indices in
//! sync. Nothing outside this module reaches into an entity table
//! directly, which is what makes the get-modify-write discipline
//! enforceable instead of just documented.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{Colony, DiplomaticRelation, Fleet, House, IntelligenceReport, Kastra, Neoria, Squadron};
use crate::entities::construction::ConstructionProject;
use crate::entities::diplomacy::HousePair;
use crate::entities::repair::RepairProject;
use crate::entities::system::System;
use crate::errors::OrderRejectReason;
use crate::ids::{
    ColonyId, ConstructionProjectId, FleetId, HouseId, IdAllocator, KastraId, NeoriaId,
    RepairProjectId, SquadronId, SystemId,
};
use crate::rng::RngService;

/// Monotonic allocators, one per id kind, kept together so `GameState`
/// doesn't need ten separate fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allocators {
    pub colony: IdAllocator,
    pub fleet: IdAllocator,
    pub squadron: IdAllocator,
    pub ship: IdAllocator,
    pub neoria: IdAllocator,
    pub kastra: IdAllocator,
    pub construction_project: IdAllocator,
    pub repair_project: IdAllocator,
}

/// Secondary indices over the primary entity tables. Rebuilt wholesale on
/// load rather than persisted, since they are a pure function of the
/// primary tables - see `GameState::rebuild_indices`.
#[derive(Debug, Clone, Default)]
pub struct Indices {
    pub fleets_by_owner: BTreeMap<HouseId, Vec<FleetId>>,
    pub fleets_by_location: BTreeMap<SystemId, Vec<FleetId>>,
    pub colonies_by_owner: BTreeMap<HouseId, Vec<ColonyId>>,
    pub colonies_by_system: BTreeMap<SystemId, ColonyId>,
    pub projects_by_colony: BTreeMap<ColonyId, Vec<ConstructionProjectId>>,
    pub squadron_owner: BTreeMap<SquadronId, FleetId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub seed: u64,
    pub rng: RngService,
    pub allocators: Allocators,

    pub houses: BTreeMap<HouseId, House>,
    pub systems: BTreeMap<SystemId, System>,
    pub colonies: BTreeMap<ColonyId, Colony>,
    pub fleets: BTreeMap<FleetId, Fleet>,
    pub neoria: BTreeMap<NeoriaId, Neoria>,
    pub kastra: BTreeMap<KastraId, Kastra>,
    pub construction_projects: BTreeMap<ConstructionProjectId, ConstructionProject>,
    pub repair_projects: BTreeMap<RepairProjectId, RepairProject>,
    pub diplomacy: BTreeMap<HousePair, DiplomaticRelation>,
    /// Squadrons commissioned at a colony but not yet assigned into a
    /// fleet (§3.2); `Colony::unassigned_squadrons` lists the ids held
    /// here. Assignment moves a squadron out of this table and into a
    /// `Fleet` via [`GameState::assign_squadron_to_fleet`].
    pub unassigned_squadrons: BTreeMap<SquadronId, Squadron>,
    /// Per-house intelligence databases (§3.2, §4.9). Only the owning
    /// house's entry is ever handed to `intel::fow::derive_filtered_view`.
    pub intelligence: BTreeMap<HouseId, Vec<IntelligenceReport>>,
    /// Ship-class construction projects that finished their dock time in
    /// this turn's Maintenance Phase but have not yet been turned into
    /// squadrons. Per §4.1, ships "survive conflict" before commissioning,
    /// so they sit here until the Command Phase of the *next* turn
    /// (`economy::commission_ships`) rather than appearing immediately.
    pub pending_ship_commissions: Vec<(ColonyId, ConstructionProject)>,
    /// Events broadcast to every house regardless of fog-of-war (§4.10
    /// public diplomatic actions, eliminations, victory) - a subset of
    /// each turn's `EventLog`, kept so `filteredView` can expose "public
    /// turn events" (§4.11) as a pure function of `state` alone, per the
    /// `filteredView(state, house)` signature (§6.1) that takes no
    /// separate event-log argument.
    pub public_events: Vec<crate::events::EventEnvelope>,
    /// Set by a capacity enforcer or other invariant check that found a
    /// violation which should have been impossible (§7). Sticky for the
    /// rest of the game once set; external reporting layers decide what
    /// to do with a `Suspect` state.
    pub suspect: bool,
    /// Set once a `VictoryAchieved` event has been emitted, so the
    /// Conflict Phase's victory check (§4.1, §4.12) fires exactly once
    /// rather than re-announcing the same winner every subsequent turn.
    pub victory_declared: bool,

    #[serde(skip)]
    indices: Indices,
}

impl GameState {
    pub fn new(seed: u64, systems: BTreeMap<SystemId, System>) -> Self {
        let mut state = Self {
            turn: 0,
            seed,
            rng: RngService::new(seed),
            allocators: Allocators::default(),
            houses: BTreeMap::new(),
            systems,
            colonies: BTreeMap::new(),
            fleets: BTreeMap::new(),
            neoria: BTreeMap::new(),
            kastra: BTreeMap::new(),
            construction_projects: BTreeMap::new(),
            repair_projects: BTreeMap::new(),
            diplomacy: BTreeMap::new(),
            unassigned_squadrons: BTreeMap::new(),
            intelligence: BTreeMap::new(),
            pending_ship_commissions: Vec::new(),
            public_events: Vec::new(),
            suspect: false,
            victory_declared: false,
            indices: Indices::default(),
        };
        state.rebuild_indices();
        state
    }

    /// Recompute every secondary index from the primary tables. Called
    /// after deserialization and after any batch mutation that touched
    /// indexed fields directly (bulk load, save/restore).
    pub fn rebuild_indices(&mut self) {
        let mut indices = Indices::default();
        for (id, fleet) in &self.fleets {
            indices.fleets_by_owner.entry(fleet.owner).or_default().push(*id);
            indices.fleets_by_location.entry(fleet.location).or_default().push(*id);
            for squadron in &fleet.squadrons {
                indices.squadron_owner.insert(squadron.id, *id);
            }
        }
        for (id, colony) in &self.colonies {
            indices.colonies_by_owner.entry(colony.owner).or_default().push(*id);
            indices.colonies_by_system.insert(colony.system, *id);
        }
        for (id, project) in &self.construction_projects {
            indices.projects_by_colony.entry(project.colony).or_default().push(*id);
        }
        self.indices = indices;
    }

    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    // ---- reads -------------------------------------------------------

    pub fn house(&self, id: HouseId) -> Option<&House> {
        self.houses.get(&id)
    }

    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.get(&id)
    }

    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.get(&id)
    }

    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.systems.get(&id)
    }

    pub fn fleets_owned_by(&self, house: HouseId) -> impl Iterator<Item = &Fleet> {
        self.indices
            .fleets_by_owner
            .get(&house)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.fleets.get(id))
    }

    pub fn fleets_at(&self, system: SystemId) -> impl Iterator<Item = &Fleet> {
        self.indices
            .fleets_by_location
            .get(&system)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.fleets.get(id))
    }

    pub fn colonies_owned_by(&self, house: HouseId) -> impl Iterator<Item = &Colony> {
        self.indices
            .colonies_by_owner
            .get(&house)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.colonies.get(id))
    }

    pub fn colony_at(&self, system: SystemId) -> Option<&Colony> {
        self.indices
            .colonies_by_system
            .get(&system)
            .and_then(|id| self.colonies.get(id))
    }

    // ---- checked mutators ---------------------------------------------

    pub fn insert_house(&mut self, house: House) {
        self.houses.insert(house.id, house);
    }

    pub fn insert_system(&mut self, system: System) {
        self.systems.insert(system.id, system);
    }

    pub fn insert_colony(&mut self, colony: Colony) {
        self.indices
            .colonies_by_owner
            .entry(colony.owner)
            .or_default()
            .push(colony.id);
        self.indices.colonies_by_system.insert(colony.system, colony.id);
        self.colonies.insert(colony.id, colony);
    }

    /// Transfers a colony to a new owner (e.g. on invasion) and updates
    /// the owner index. Does not validate the transfer itself - callers
    /// (e.g. `ec4x_combat::resolve_invasion`) are responsible for deciding
    /// when a conquest occurred.
    pub fn transfer_colony_owner(&mut self, id: ColonyId, new_owner: HouseId) -> Result<(), OrderRejectReason> {
        let colony = self.colonies.get_mut(&id).ok_or(OrderRejectReason::UnknownColony(id))?;
        let old_owner = colony.owner;
        colony.owner = new_owner;
        if let Some(list) = self.indices.colonies_by_owner.get_mut(&old_owner) {
            list.retain(|c| *c != id);
        }
        self.indices.colonies_by_owner.entry(new_owner).or_default().push(id);
        Ok(())
    }

    pub fn insert_fleet(&mut self, fleet: Fleet) {
        self.indices.fleets_by_owner.entry(fleet.owner).or_default().push(fleet.id);
        self.indices.fleets_by_location.entry(fleet.location).or_default().push(fleet.id);
        for squadron in &fleet.squadrons {
            self.indices.squadron_owner.insert(squadron.id, fleet.id);
        }
        self.fleets.insert(fleet.id, fleet);
    }

    /// Relocate a fleet and update the location index. Does not validate
    /// adjacency - the `movement` crate is responsible for that before
    /// calling this.
    pub fn relocate_fleet(&mut self, id: FleetId, to: SystemId) -> Result<(), OrderRejectReason> {
        let fleet = self.fleets.get_mut(&id).ok_or(OrderRejectReason::UnknownFleet(id))?;
        let from = fleet.location;
        fleet.location = to;
        if let Some(list) = self.indices.fleets_by_location.get_mut(&from) {
            list.retain(|f| *f != id);
        }
        self.indices.fleets_by_location.entry(to).or_default().push(id);
        Ok(())
    }

    pub fn remove_fleet(&mut self, id: FleetId) -> Option<Fleet> {
        let fleet = self.fleets.remove(&id)?;
        if let Some(list) = self.indices.fleets_by_owner.get_mut(&fleet.owner) {
            list.retain(|f| *f != id);
        }
        if let Some(list) = self.indices.fleets_by_location.get_mut(&fleet.location) {
            list.retain(|f| *f != id);
        }
        for squadron in &fleet.squadrons {
            self.indices.squadron_owner.remove(&squadron.id);
        }
        Some(fleet)
    }

    pub fn insert_construction_project(&mut self, project: ConstructionProject) {
        self.indices
            .projects_by_colony
            .entry(project.colony)
            .or_default()
            .push(project.id);
        self.construction_projects.insert(project.id, project);
    }

    pub fn remove_construction_project(&mut self, id: ConstructionProjectId) -> Option<ConstructionProject> {
        let project = self.construction_projects.remove(&id)?;
        if let Some(list) = self.indices.projects_by_colony.get_mut(&project.colony) {
            list.retain(|p| *p != id);
        }
        Some(project)
    }

    /// Moves a standalone squadron (held at a colony, not yet in a fleet)
    /// into an existing fleet, updating the squadron-owner index.
    pub fn assign_squadron_to_fleet(&mut self, squadron_id: SquadronId, fleet_id: FleetId) -> bool {
        let Some(squadron) = self.unassigned_squadrons.remove(&squadron_id) else {
            return false;
        };
        let Some(fleet) = self.fleets.get_mut(&fleet_id) else {
            self.unassigned_squadrons.insert(squadron_id, squadron);
            return false;
        };
        fleet.squadrons.push(squadron);
        self.indices.squadron_owner.insert(squadron_id, fleet_id);
        true
    }

    /// Replaces any existing report on the same subject for the viewing
    /// house with a fresher one, rather than letting the database grow
    /// unboundedly with every scouting pass (§4.9).
    pub fn record_intel_report(&mut self, report: IntelligenceReport) {
        let reports = self.intelligence.entry(report.viewing_house).or_default();
        reports.retain(|r| r.subject != report.subject);
        reports.push(report);
    }

    pub fn diplomacy_between(&self, a: HouseId, b: HouseId) -> Option<&DiplomaticRelation> {
        self.diplomacy.get(&HousePair::new(a, b))
    }

    pub fn diplomacy_between_mut(&mut self, a: HouseId, b: HouseId) -> &mut DiplomaticRelation {
        self.diplomacy
            .entry(HousePair::new(a, b))
            .or_insert_with(|| DiplomaticRelation::new(HousePair::new(a, b)))
    }
}
