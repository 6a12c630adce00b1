//! Build-order validation and construction-queue advancement (§4.4).
//!
//! Dock-class ships and facilities occupy a `Neoria` dock slot; ground
//! units and industrial units occupy only a colony queue slot. A
//! spaceport-only colony (no shipyard) may still build non-fighter ships,
//! at the penalized cost from `config.economy.spaceport_non_fighter_cost_penalty_pct`.

use ec4x_common::config::Config;
use ec4x_common::entities::construction::{BuildItem, ConstructionProject};
use ec4x_common::entities::neoria::NeoriaKind;
use ec4x_common::entities::ship::ShipClass;
use ec4x_common::errors::OrderRejectReason;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{ColonyId, ConstructionProjectId, HouseId, NeoriaId};
use ec4x_common::store::GameState;

/// Population transfer units carried by a single ETAC (glossary: "one
/// ETAC carries three PTU and founds one colony").
pub const PTU_PER_ETAC: u32 = 3;

#[derive(Debug, Clone)]
pub struct BuildOrder {
    pub colony: ColonyId,
    pub item: BuildItem,
    pub quantity: u32,
}

fn has_shipyard(state: &GameState, colony_id: ColonyId) -> bool {
    state
        .colony(colony_id)
        .map(|c| {
            c.neoria
                .iter()
                .filter_map(|id| state.neoria.get(id))
                .any(|n| matches!(n.kind, NeoriaKind::Shipyard))
        })
        .unwrap_or(false)
}

fn has_spaceport(state: &GameState, colony_id: ColonyId) -> bool {
    state
        .colony(colony_id)
        .map(|c| {
            c.neoria
                .iter()
                .filter_map(|id| state.neoria.get(id))
                .any(|n| matches!(n.kind, NeoriaKind::Spaceport))
        })
        .unwrap_or(false)
}

fn find_dock(state: &GameState, colony_id: ColonyId, class: ShipClass) -> Option<NeoriaId> {
    let colony = state.colony(colony_id)?;
    let want_shipyard = !class.is_fighter();
    colony
        .neoria
        .iter()
        .filter_map(|id| state.neoria.get(id).map(|n| (*id, n)))
        .filter(|(_, n)| n.has_free_dock())
        .find(|(_, n)| {
            if want_shipyard {
                matches!(n.kind, NeoriaKind::Shipyard | NeoriaKind::Spaceport)
            } else {
                true
            }
        })
        .map(|(id, _)| id)
}

fn unit_cost(config: &Config, state: &GameState, colony_id: ColonyId, item: BuildItem) -> Result<i64, OrderRejectReason> {
    match item {
        BuildItem::Ship(class) => {
            let spec = config
                .ships
                .spec(class)
                .ok_or(OrderRejectReason::MalformedPacket("unknown ship class".into()))?;
            let mut cost = spec.construction_cost;
            if !class.is_fighter() && !has_shipyard(state, colony_id) {
                cost += cost * config.economy.spaceport_non_fighter_cost_penalty_pct as i64 / 100;
            }
            Ok(cost)
        }
        BuildItem::Facility(kind) => {
            use ec4x_common::entities::construction::NeoriaOrKastraKind as K;
            Ok(match kind {
                K::Spaceport => config.facilities.spaceport.cost,
                K::Shipyard => config.facilities.shipyard.cost,
                K::Drydock => config.facilities.drydock.cost,
                K::Starbase => config.facilities.starbase.cost,
            })
        }
        BuildItem::Ground(kind) => {
            use ec4x_common::entities::construction::GroundUnitKind as G;
            Ok(match kind {
                G::Marines => config.ground_units.marines.cost,
                G::Army => config.ground_units.army.cost,
                G::GroundBattery => config.ground_units.ground_battery.cost,
                G::PlanetaryShield => config.ground_units.planetary_shield.cost,
            })
        }
        BuildItem::Industrial => Ok(200),
    }
}

/// Ships occupy a dock for exactly one Maintenance Phase pass (§8 scenario
/// 2: `ConstructionStarted` at turn N, `ShipCommissioned` at turn N+1,
/// a one-turn gap). Larger ships do not take proportionally longer to
/// build in this model - only their dock-class and cost scale with size.
fn build_time(config: &Config, item: BuildItem) -> u32 {
    match item {
        BuildItem::Ship(_) => 1,
        BuildItem::Facility(kind) => {
            use ec4x_common::entities::construction::NeoriaOrKastraKind as K;
            match kind {
                K::Spaceport => config.facilities.spaceport.build_time_turns,
                K::Shipyard => config.facilities.shipyard.build_time_turns,
                K::Drydock => config.facilities.drydock.build_time_turns,
                K::Starbase => config.facilities.starbase.build_time_turns,
            }
        }
        BuildItem::Ground(_) => 1,
        BuildItem::Industrial => 1,
    }
}

/// Validates an order against treasury, dock availability, and tech
/// prerequisites, but never mutates state - the caller commits via
/// [`GameState::insert_construction_project`] only after this returns `Ok`.
pub fn validate_build_order(
    state: &GameState,
    config: &Config,
    house: HouseId,
    order: &BuildOrder,
) -> Result<i64, OrderRejectReason> {
    let colony = state
        .colony(order.colony)
        .ok_or(OrderRejectReason::UnknownColony(order.colony))?;
    if colony.owner != house {
        return Err(OrderRejectReason::ColonyNotOwnedByHouse { colony: order.colony, house });
    }

    if let BuildItem::Ship(class) = order.item {
        if let Some(spec) = config.ships.spec(class) {
            for (field, level) in &spec.tech_prereqs {
                let actual = state.house(house).map(|h| h.tech.level(*field)).unwrap_or(0);
                if actual < *level {
                    return Err(OrderRejectReason::MissingTechPrerequisite {
                        field: format!("{field:?}"),
                        required_level: *level,
                        actual_level: actual,
                    });
                }
            }
        }
        if class.is_dock_class() && find_dock(state, order.colony, class).is_none() {
            return Err(OrderRejectReason::NoDockAvailable {
                neoria: NeoriaId::from_raw(0),
            });
        }
    }

    if let BuildItem::Facility(kind) = order.item {
        use ec4x_common::entities::construction::NeoriaOrKastraKind as K;
        let requires_spaceport = match kind {
            K::Spaceport => config.facilities.spaceport.requires_spaceport,
            K::Shipyard => config.facilities.shipyard.requires_spaceport,
            K::Drydock => config.facilities.drydock.requires_spaceport,
            K::Starbase => config.facilities.starbase.requires_spaceport,
        };
        if requires_spaceport && !has_spaceport(state, order.colony) {
            return Err(OrderRejectReason::MissingFacilityPrerequisite {
                colony: order.colony,
                required: "Spaceport".into(),
            });
        }
    }

    let per_unit = unit_cost(config, state, order.colony, order.item)?;
    let total = per_unit * order.quantity.max(1) as i64;
    let treasury = state.house(house).map(|h| h.treasury).unwrap_or(0);
    if treasury < total {
        return Err(OrderRejectReason::InsufficientTreasury { required: total, available: treasury });
    }
    Ok(total)
}

/// Commits a validated order: debits the treasury, allocates a project,
/// and occupies a dock for dock-class builds.
pub fn commit_build_order(
    state: &mut GameState,
    config: &Config,
    house: HouseId,
    order: BuildOrder,
    log: &mut EventLog,
) -> Result<ConstructionProjectId, OrderRejectReason> {
    let total_cost = validate_build_order(state, config, house, &order)?;
    let host_neoria = match order.item {
        BuildItem::Ship(class) if class.is_dock_class() => find_dock(state, order.colony, class),
        _ => None,
    };

    let raw_id = state.allocators.construction_project.alloc();
    let project_id = ConstructionProjectId::from_raw(raw_id);
    let project = ConstructionProject {
        id: project_id,
        colony: order.colony,
        item: order.item,
        quantity: order.quantity.max(1),
        cost_total: total_cost,
        cost_paid: total_cost,
        turns_remaining: build_time(config, order.item),
        host_neoria,
    };

    if let Some(dock) = host_neoria {
        if let Some(neoria) = state.neoria.get_mut(&dock) {
            neoria.active_projects.push(project_id);
        }
    }

    if let Some(h) = state.houses.get_mut(&house) {
        h.treasury -= total_cost;
    }
    if let Some(colony) = state.colonies.get_mut(&order.colony) {
        colony.construction_queue.push_back(project_id);
    }
    log.push(
        state.turn,
        Phase::Command,
        EventKind::ConstructionStarted { colony: order.colony, project: project_id, item: order.item },
    );
    state.insert_construction_project(project);
    Ok(project_id)
}

/// Rescales every commissioned `Neoria`'s `effective_docks` from the
/// owning house's current construction-tech level (§3.2 invariant). Runs
/// once per turn in the Maintenance Phase, before the queue advances, so
/// a tech breakthrough frees up the dock it grants in the same turn.
pub fn recompute_dock_capacity(state: &mut GameState, config: &Config) {
    use ec4x_common::entities::house::TechField;

    let colony_ids: Vec<ColonyId> = state.colonies.keys().copied().collect();
    for colony_id in colony_ids {
        let Some(colony) = state.colony(colony_id) else { continue };
        let owner = colony.owner;
        let neoria_ids = colony.neoria.clone();
        let level = state.house(owner).map(|h| h.tech.level(TechField::Construction)).unwrap_or(0);
        let multiplier = config.tech.entry(TechField::Construction, level).map(|entry| entry.multiplier).unwrap_or(1.0);
        for neoria_id in neoria_ids {
            if let Some(neoria) = state.neoria.get_mut(&neoria_id) {
                neoria.recompute_effective_docks(multiplier);
            }
        }
    }
}

/// Advances every active project by one turn and commissions those that
/// complete. Runs once, in canonical colony-id order, during the Command
/// Phase after all orders for the turn have been accepted.
///
/// A colony's dock-hosted projects (one `Neoria` occupant per dock) all
/// advance in parallel up to `effective_docks`; its non-dock queue (ground
/// units, industrial units, and the facility construction itself) shares
/// one colony-wide slot, matching `commit_build_order`'s single
/// `construction_queue` ordering for those items.
pub fn advance_construction_queue(state: &mut GameState, config: &Config, log: &mut EventLog) {
    let colony_ids: Vec<_> = state.colonies.keys().copied().collect();
    let turn = state.turn;

    for colony_id in colony_ids {
        let neoria_ids: Vec<_> = state.colonies.get(&colony_id).map(|c| c.neoria.clone()).unwrap_or_default();
        let mut dock_projects: Vec<ConstructionProjectId> = Vec::new();
        for neoria_id in &neoria_ids {
            if let Some(neoria) = state.neoria.get(neoria_id) {
                dock_projects.extend(neoria.active_projects.iter().copied());
            }
        }
        for project_id in dock_projects {
            advance_one_project(state, config, colony_id, project_id, turn, log);
        }

        let active = state.colonies.get(&colony_id).and_then(|c| c.active_project).or_else(|| {
            state.colonies.get(&colony_id).and_then(|c| {
                c.construction_queue
                    .iter()
                    .find(|id| state.construction_projects.get(id).map(|p| p.host_neoria.is_none()).unwrap_or(false))
                    .copied()
            })
        });
        if let Some(project_id) = active {
            advance_one_project(state, config, colony_id, project_id, turn, log);
        }
    }
}

fn advance_one_project(
    state: &mut GameState,
    config: &Config,
    colony_id: ColonyId,
    project_id: ConstructionProjectId,
    turn: u32,
    log: &mut EventLog,
) {
    let complete = {
        let Some(project) = state.construction_projects.get_mut(&project_id) else { return };
        project.advance_one_turn();
        project.is_complete()
    };
    if !complete {
        return;
    }

    let Some(project) = state.remove_construction_project(project_id) else { return };
    if let Some(dock) = project.host_neoria {
        if let Some(neoria) = state.neoria.get_mut(&dock) {
            neoria.active_projects.retain(|p| *p != project_id);
        }
    }
    log.push(
        turn,
        Phase::Maintenance,
        EventKind::ConstructionCompleted { colony: colony_id, project: project_id, item: project.item },
    );
    if matches!(project.item, BuildItem::Ship(class) if !class.is_fighter()) {
        // §4.1: non-fighter ships commission only once they have
        // "survived conflict" in the Command Phase of the *next*
        // turn, not here. Fighters are a planetary asset (§4.1
        // Maintenance step 1's explicit list) and commission
        // immediately like every other planetary build below.
        state.pending_ship_commissions.push((colony_id, project.clone()));
    } else {
        commission(state, config, colony_id, &project, log);
    }
    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.construction_queue.retain(|p| *p != project_id);
        if colony.active_project == Some(project_id) {
            colony.active_project = None;
        }
    }
}

/// Commissions ships whose dock construction finished last Maintenance
/// Phase. Runs at the start of the Command Phase, after the turn counter
/// has advanced, so `ShipCommissioned` events carry the new turn number
/// (§4.1 step 3a, §8 scenario 2).
pub fn commission_ships(state: &mut GameState, config: &Config, log: &mut EventLog) {
    let pending = std::mem::take(&mut state.pending_ship_commissions);
    for (colony_id, project) in pending {
        commission(state, config, colony_id, &project, log);
    }
}

/// Accumulates `count` completed Fighter-class hulls into a colony's
/// planetary fighter-squadron pool, one ship per build, filling the most
/// recent partial squadron before starting a new one (§4.4: "1 ship per
/// Fighter build, 12 ships per full fighter squadron").
fn commission_fighters(colony: &mut ec4x_common::entities::Colony, count: u32) {
    use ec4x_common::entities::colony::PlanetaryFighterSquadron;

    for _ in 0..count {
        match colony.fighter_squadrons.last_mut() {
            Some(sq) if !sq.is_full() => sq.ship_count += 1,
            _ => colony.fighter_squadrons.push(PlanetaryFighterSquadron { ship_count: 1 }),
        }
    }
}

/// Turns a completed project into the entity it paid for: a fighter
/// hull folded into the colony's fighter pool, a dock-class ship left
/// unassigned at the colony (wrapped in a fresh single-ship squadron,
/// or as a bare ship for spacelift classes), a facility, a ground-force
/// increment, or an industrial-unit increment.
fn commission(
    state: &mut GameState,
    _config: &Config,
    colony_id: ColonyId,
    project: &ConstructionProject,
    log: &mut EventLog,
) {
    use ec4x_common::entities::construction::{GroundUnitKind, NeoriaOrKastraKind};
    use ec4x_common::entities::neoria::{Neoria, NeoriaKind};
    use ec4x_common::entities::kastra::Kastra;
    use ec4x_common::entities::ship::Ship;
    use ec4x_common::entities::squadron::{Squadron, SquadronType};

    let turn = state.turn;
    let owner = state.colony(colony_id).map(|c| c.owner);
    let Some(owner) = owner else { return };

    match project.item {
        BuildItem::Ship(class) if class.is_fighter() => {
            // Planetary asset (§4.1 Maintenance step 1): fighters
            // accumulate directly into the colony's fighter-squadron pool,
            // one ship per completed build, rather than waiting for
            // Command-phase ship commissioning like dock-class hulls.
            if let Some(colony) = state.colonies.get_mut(&colony_id) {
                commission_fighters(colony, project.quantity);
            }
            log.push(turn, Phase::Maintenance, EventKind::UnitRecruited { colony: colony_id });
        }
        BuildItem::Ship(class) => {
            for _ in 0..project.quantity {
                let ship_id = ec4x_common::ids::ShipId::from_raw(state.allocators.ship.alloc());
                let mut ship = Ship::new(ship_id, class, 0, owner);
                let system = state.colony(colony_id).map(|c| c.system).unwrap_or(ec4x_common::ids::SystemId::from_raw(0));

                if class.is_spacelift() {
                    // ETAC/troop transport/freighter commission as bare
                    // ships (matching `Fleet::spacelift`, not squadrons) -
                    // an ETAC commissions with a full PTU cargo ready to
                    // found a colony (glossary: three PTU per ETAC); troop
                    // transports and freighters commission empty (§4.4).
                    if class.is_etac() {
                        ship.cargo = Some(ec4x_common::entities::ship::CargoHold {
                            kind: ec4x_common::entities::ship::CargoKind::Ptu,
                            quantity: PTU_PER_ETAC,
                        });
                    }
                    if let Some(colony) = state.colonies.get_mut(&colony_id) {
                        colony.unassigned_spacelift.push(ship);
                    }
                } else {
                    let squadron_type = if class.is_scout() {
                        SquadronType::Intel
                    } else {
                        SquadronType::Combat
                    };
                    let squadron_id = ec4x_common::ids::SquadronId::from_raw(state.allocators.squadron.alloc());
                    let squadron = Squadron::new(squadron_id, ship, owner, system, squadron_type);
                    state.unassigned_squadrons.insert(squadron_id, squadron);
                    if let Some(colony) = state.colonies.get_mut(&colony_id) {
                        colony.unassigned_squadrons.push(squadron_id);
                    }
                }
                log.push(turn, Phase::Command, EventKind::ShipCommissioned { colony: colony_id, ship: ship_id });
            }
        }
        BuildItem::Facility(NeoriaOrKastraKind::Starbase) => {
            let kastra_id = ec4x_common::ids::KastraId::from_raw(state.allocators.kastra.alloc());
            state.kastra.insert(kastra_id, Kastra::new(kastra_id, turn));
            if let Some(colony) = state.colonies.get_mut(&colony_id) {
                colony.kastra.push(kastra_id);
            }
            log.push(turn, Phase::Maintenance, EventKind::StarbaseBuilt { colony: colony_id, kastra: kastra_id });
        }
        BuildItem::Facility(kind) => {
            let neoria_kind = match kind {
                NeoriaOrKastraKind::Spaceport => NeoriaKind::Spaceport,
                NeoriaOrKastraKind::Shipyard => NeoriaKind::Shipyard,
                NeoriaOrKastraKind::Drydock => NeoriaKind::Drydock,
                NeoriaOrKastraKind::Starbase => unreachable!("handled above"),
            };
            let docks = match neoria_kind {
                NeoriaKind::Spaceport => 2,
                NeoriaKind::Shipyard => 4,
                NeoriaKind::Drydock => 2,
            };
            let neoria_id = ec4x_common::ids::NeoriaId::from_raw(state.allocators.neoria.alloc());
            state.neoria.insert(neoria_id, Neoria::new(neoria_id, neoria_kind, turn, docks));
            if let Some(colony) = state.colonies.get_mut(&colony_id) {
                colony.neoria.push(neoria_id);
            }
            log.push(turn, Phase::Maintenance, EventKind::BuildingCompleted { colony: colony_id, neoria: neoria_id });
        }
        BuildItem::Ground(kind) => {
            if let Some(colony) = state.colonies.get_mut(&colony_id) {
                match kind {
                    GroundUnitKind::Marines => colony.ground_forces.marine_divisions += project.quantity,
                    GroundUnitKind::Army => colony.ground_forces.army_divisions += project.quantity,
                    GroundUnitKind::GroundBattery => colony.ground_forces.ground_batteries += project.quantity,
                    GroundUnitKind::PlanetaryShield => {
                        colony.ground_forces.planetary_shield_level =
                            colony.ground_forces.planetary_shield_level.saturating_add(1)
                    }
                }
            }
            log.push(turn, Phase::Maintenance, EventKind::UnitRecruited { colony: colony_id });
        }
        BuildItem::Industrial => {
            if let Some(colony) = state.colonies.get_mut(&colony_id) {
                colony.industrial_units += project.quantity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::Colony;
    use ec4x_common::entities::house::House;
    use ec4x_common::ids::{HouseId, SystemId};
    use std::collections::BTreeMap;

    #[test]
    fn industrial_build_order_is_committed_and_commissions_without_a_dock() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let owner = HouseId::from_raw(0);
        let mut house = House::new(owner, 10_000);
        house.treasury = 10_000;
        state.insert_house(house);
        state.insert_colony(Colony::new(ColonyId::from_raw(0), SystemId::from_raw(0), owner));

        let order = BuildOrder { colony: ColonyId::from_raw(0), item: BuildItem::Industrial, quantity: 3 };
        let mut log = EventLog::new();
        let project_id = commit_build_order(&mut state, &config, owner, order, &mut log).unwrap();
        assert!(state.construction_projects.contains_key(&project_id));
        assert!(state.house(owner).unwrap().treasury < 10_000);

        advance_construction_queue(&mut state, &config, &mut log);
        let colony = state.colony(ColonyId::from_raw(0)).unwrap();
        assert_eq!(colony.industrial_units, 3);
        assert!(!state.construction_projects.contains_key(&project_id));
    }

    #[test]
    fn build_order_is_rejected_when_treasury_is_insufficient() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let owner = HouseId::from_raw(0);
        state.insert_house(House::new(owner, 0));
        state.insert_colony(Colony::new(ColonyId::from_raw(0), SystemId::from_raw(0), owner));

        let order = BuildOrder { colony: ColonyId::from_raw(0), item: BuildItem::Industrial, quantity: 1 };
        let result = validate_build_order(&state, &config, owner, &order);
        assert!(matches!(result, Err(OrderRejectReason::InsufficientTreasury { .. })));
    }
}
