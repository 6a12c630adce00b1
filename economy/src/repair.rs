//! Repair-project validation and queue advancement (§3.2 RepairProject,
//! §4.1 Maintenance Phase "advance repair queues").
//!
//! A repair is requested as a zero-turn admin command (§9): the target
//! must already be damaged, and a ship repair must find a free dock at a
//! `Drydock` hosted at the colony where the ship's fleet currently sits.
//! Starbase repairs skip the dock check entirely - they "do not consume
//! dock capacity" (§3.2).

use ec4x_common::config::Config;
use ec4x_common::entities::neoria::NeoriaKind;
use ec4x_common::entities::repair::{RepairProject, RepairTarget};
use ec4x_common::entities::ship::Ship;
use ec4x_common::errors::OrderRejectReason;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{ColonyId, FleetId, HouseId, KastraId, NeoriaId, RepairProjectId, ShipId};
use ec4x_common::store::GameState;

fn find_drydock(state: &GameState, colony_id: ColonyId) -> Option<NeoriaId> {
    let colony = state.colony(colony_id)?;
    colony
        .neoria
        .iter()
        .filter_map(|id| state.neoria.get(id).map(|n| (*id, n)))
        .find(|(_, n)| matches!(n.kind, NeoriaKind::Drydock) && n.has_free_dock())
        .map(|(id, _)| id)
}

fn ship_mut<'a>(state: &'a mut GameState, fleet_id: FleetId, ship_id: ShipId) -> Option<&'a mut Ship> {
    let fleet = state.fleets.get_mut(&fleet_id)?;
    for squadron in &mut fleet.squadrons {
        if squadron.flagship.id == ship_id {
            return Some(&mut squadron.flagship);
        }
        if let Some(ship) = squadron.escorts.iter_mut().find(|s| s.id == ship_id) {
            return Some(ship);
        }
    }
    fleet.spacelift.iter_mut().find(|s| s.id == ship_id)
}

/// Requests repair of a crippled ship. The fleet must be at a colony
/// owned by `house` carrying a `Drydock` with a free dock.
pub fn request_ship_repair(
    state: &mut GameState,
    config: &Config,
    house: HouseId,
    fleet_id: FleetId,
    ship_id: ShipId,
    log: &mut EventLog,
) -> Result<RepairProjectId, OrderRejectReason> {
    let fleet = state.fleet(fleet_id).ok_or(OrderRejectReason::UnknownFleet(fleet_id))?;
    if fleet.owner != house {
        return Err(OrderRejectReason::FleetNotOwnedByHouse { fleet: fleet_id, house });
    }
    let location = fleet.location;
    let ship_class = fleet
        .all_ships()
        .find(|s| s.id == ship_id)
        .ok_or(OrderRejectReason::UnknownShip(ship_id))?;
    if !ship_class.is_crippled() {
        return Err(OrderRejectReason::ShipNotCrippled(ship_id));
    }
    let ship_class = ship_class.class;

    let colony = state
        .colony_at(location)
        .ok_or(OrderRejectReason::ColonyNotOwnedByHouse { colony: ColonyId::from_raw(0), house })?;
    if colony.owner != house {
        return Err(OrderRejectReason::ColonyNotOwnedByHouse { colony: colony.id, house });
    }
    let colony_id = colony.id;

    let dock = find_drydock(state, colony_id).ok_or(OrderRejectReason::NoDrydockAvailable { colony: colony_id })?;

    let build_cost = config.ships.spec(ship_class).map(|s| s.construction_cost).unwrap_or(0);
    let cost = build_cost * config.economy.repair_cost_pct as i64 / 100;

    let treasury = state.houses.get(&house).map(|h| h.treasury).unwrap_or(0);
    if treasury < cost {
        return Err(OrderRejectReason::InsufficientTreasury { required: cost, available: treasury });
    }
    if let Some(h) = state.houses.get_mut(&house) {
        h.treasury -= cost;
    }

    let raw_id = state.allocators.repair_project.alloc();
    let project_id = RepairProjectId::from_raw(raw_id);
    let project = RepairProject::new(
        project_id,
        colony_id,
        RepairTarget::Ship { fleet: fleet_id, ship: ship_id },
        cost,
        0,
    );

    if let Some(neoria) = state.neoria.get_mut(&dock) {
        neoria.active_repairs.push(project_id);
    }
    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.repair_queue.push_back(project_id);
    }
    state.repair_projects.insert(project_id, project);
    log.push(state.turn, Phase::Command, EventKind::RepairStarted { colony: colony_id, project: project_id });
    Ok(project_id)
}

/// Requests repair of a crippled starbase. Never consumes a dock slot
/// (§3.2).
pub fn request_starbase_repair(
    state: &mut GameState,
    config: &Config,
    house: HouseId,
    kastra_id: KastraId,
    log: &mut EventLog,
) -> Result<RepairProjectId, OrderRejectReason> {
    let colony = state
        .colonies
        .values()
        .find(|c| c.kastra.contains(&kastra_id))
        .ok_or(OrderRejectReason::UnknownStarbase(kastra_id))?;
    if colony.owner != house {
        return Err(OrderRejectReason::ColonyNotOwnedByHouse { colony: colony.id, house });
    }
    let colony_id = colony.id;

    let kastra = state.kastra.get(&kastra_id).ok_or(OrderRejectReason::UnknownStarbase(kastra_id))?;
    if !kastra.crippled {
        return Err(OrderRejectReason::StarbaseNotCrippled(kastra_id));
    }

    let cost = config.facilities.starbase.cost * config.economy.repair_cost_pct as i64 / 100;
    let treasury = state.houses.get(&house).map(|h| h.treasury).unwrap_or(0);
    if treasury < cost {
        return Err(OrderRejectReason::InsufficientTreasury { required: cost, available: treasury });
    }
    if let Some(h) = state.houses.get_mut(&house) {
        h.treasury -= cost;
    }

    let raw_id = state.allocators.repair_project.alloc();
    let project_id = RepairProjectId::from_raw(raw_id);
    let project = RepairProject::new(project_id, colony_id, RepairTarget::Starbase { kastra: kastra_id }, cost, 0);

    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.repair_queue.push_back(project_id);
    }
    state.repair_projects.insert(project_id, project);
    log.push(state.turn, Phase::Command, EventKind::RepairStarted { colony: colony_id, project: project_id });
    Ok(project_id)
}

/// Advances every queued repair project by one turn (§4.1 Maintenance
/// Phase). Ship repairs occupy a `Drydock` slot for the one turn they
/// take; starbase repairs never do, so every starbase repair advances in
/// parallel with no capacity limit.
pub fn advance_repair_queues(state: &mut GameState, _config: &Config, log: &mut EventLog) {
    let turn = state.turn;
    let colony_ids: Vec<ColonyId> = state.colonies.keys().copied().collect();

    for colony_id in colony_ids {
        let queued: Vec<RepairProjectId> = state
            .colonies
            .get(&colony_id)
            .map(|c| c.repair_queue.iter().copied().collect())
            .unwrap_or_default();

        for project_id in queued {
            let complete = {
                let Some(project) = state.repair_projects.get_mut(&project_id) else { continue };
                project.advance_one_turn();
                project.is_complete()
            };
            if !complete {
                continue;
            }
            let Some(project) = state.repair_projects.remove(&project_id) else { continue };

            match project.target {
                RepairTarget::Ship { fleet, ship } => {
                    if let Some(s) = ship_mut(state, fleet, ship) {
                        s.state = ec4x_common::entities::ship::ShipCombatState::Undamaged;
                    }
                    for neoria in state.neoria.values_mut() {
                        neoria.active_repairs.retain(|p| *p != project_id);
                    }
                }
                RepairTarget::Starbase { kastra } => {
                    if let Some(k) = state.kastra.get_mut(&kastra) {
                        k.crippled = false;
                        k.damage = 0;
                    }
                }
            }

            if let Some(colony) = state.colonies.get_mut(&colony_id) {
                colony.repair_queue.retain(|p| *p != project_id);
            }
            log.push(turn, Phase::Maintenance, EventKind::RepairCompleted { colony: colony_id, project: project_id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::Colony;
    use ec4x_common::entities::fleet::Fleet;
    use ec4x_common::entities::house::House;
    use ec4x_common::entities::neoria::Neoria;
    use ec4x_common::entities::ship::{Ship, ShipClass, ShipCombatState};
    use ec4x_common::entities::squadron::{Squadron, SquadronType};
    use ec4x_common::ids::{FleetId, HouseId, NeoriaId, ShipId, SquadronId, SystemId};
    use std::collections::BTreeMap;

    fn setup_crippled_destroyer() -> (GameState, HouseId, FleetId, ShipId) {
        let mut state = GameState::new(1, BTreeMap::new());
        let owner = HouseId::from_raw(0);
        state.insert_house(House::new(owner, 10_000));
        let system = SystemId::from_raw(0);
        let colony_id = ColonyId::from_raw(0);
        let mut colony = Colony::new(colony_id, system, owner);
        let neoria_id = NeoriaId::from_raw(0);
        let neoria = Neoria::new(neoria_id, NeoriaKind::Drydock, 0, 2);
        colony.neoria.push(neoria_id);
        state.insert_colony(colony);
        state.neoria.insert(neoria_id, neoria);

        let ship_id = ShipId::from_raw(0);
        let mut ship = Ship::new(ship_id, ShipClass::Destroyer, 0, owner);
        ship.state = ShipCombatState::Crippled;
        let squadron = Squadron::new(SquadronId::from_raw(0), ship, owner, system, SquadronType::Combat);
        let fleet_id = FleetId::from_raw(0);
        let mut fleet = Fleet::new(fleet_id, owner, system);
        fleet.squadrons.push(squadron);
        state.insert_fleet(fleet);

        (state, owner, fleet_id, ship_id)
    }

    #[test]
    fn crippled_ship_is_repaired_after_one_turn_at_a_drydock() {
        let config = test_config();
        let (mut state, owner, fleet_id, ship_id) = setup_crippled_destroyer();
        let mut log = EventLog::new();

        let project_id = request_ship_repair(&mut state, &config, owner, fleet_id, ship_id, &mut log).unwrap();
        assert!(state.repair_projects.contains_key(&project_id));

        advance_repair_queues(&mut state, &config, &mut log);

        assert!(!state.repair_projects.contains_key(&project_id));
        let fleet = state.fleet(fleet_id).unwrap();
        let ship = fleet.squadrons[0].flagship.clone();
        assert!(matches!(ship.state, ShipCombatState::Undamaged));
    }

    #[test]
    fn repair_is_rejected_for_an_undamaged_ship() {
        let config = test_config();
        let (mut state, owner, fleet_id, ship_id) = setup_crippled_destroyer();
        state.fleets.get_mut(&fleet_id).unwrap().squadrons[0].flagship.state = ShipCombatState::Undamaged;
        let mut log = EventLog::new();

        let result = request_ship_repair(&mut state, &config, owner, fleet_id, ship_id, &mut log);
        assert!(matches!(result, Err(OrderRejectReason::ShipNotCrippled(_))));
    }

    #[test]
    fn repair_is_rejected_without_a_drydock() {
        let config = test_config();
        let (mut state, owner, fleet_id, ship_id) = setup_crippled_destroyer();
        state.neoria.clear();
        state.colonies.get_mut(&ColonyId::from_raw(0)).unwrap().neoria.clear();
        let mut log = EventLog::new();

        let result = request_ship_repair(&mut state, &config, owner, fleet_id, ship_id, &mut log);
        assert!(matches!(result, Err(OrderRejectReason::NoDrydockAvailable { .. })));
    }
}
