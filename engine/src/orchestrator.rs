//! The four-phase turn orchestrator (§4.1): Maintenance and Income run
//! against the turn being closed out; the turn counter then advances, and
//! Command and Conflict run against the new turn.

use log::{debug, info};

use ec4x_common::config::Config;
use ec4x_common::entities::fleet::{FleetOrder, FleetStatus, OrderKind, StandingOrder};
use ec4x_common::entities::prestige::PrestigeSource;
use ec4x_common::entities::ship::CargoKind;
use ec4x_common::errors::OrderRejectReason;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{FleetId, HouseId, SystemId};
use ec4x_common::store::GameState;

use ec4x_combat::bombardment::bombard_colony;
use ec4x_combat::{resolve_invasion, resolve_system_combat};
use ec4x_economy::{
    advance_construction_queue, advance_repair_queues, advance_terraforming, auto_assign_squadrons,
    auto_load_fighter_squadrons, commission_ships, commit_build_order, enforce_capacities, recompute_dock_capacity,
    request_ship_repair, request_starbase_repair, request_terraform, run_income_phase, run_maintenance_phase, BuildOrder,
};
use ec4x_intel::{apply_diplomatic_action, execute_mission};
use ec4x_movement::resolve_movement;

use crate::packets::{AdminCommand, CommandPacket};

/// Runs one full turn. Every phase mutates `state` directly and appends to
/// the returned log; the orchestrator never partially applies a turn and
/// never returns an error — per-order failures surface only as
/// `OrderRejected` events (§7, §4.1 "never aborts a turn").
pub fn resolve_turn(state: &mut GameState, config: &Config, packets: &[CommandPacket]) -> EventLog {
    let mut log = EventLog::new();

    debug!("maintenance phase: turn {}", state.turn);
    recompute_dock_capacity(state, config);
    advance_construction_queue(state, config, &mut log);
    advance_repair_queues(state, config, &mut log);
    advance_terraforming(state, config, &mut log);
    run_maintenance_phase(state, config, &mut log);
    enforce_capacities(state, config, &mut log);

    debug!("income phase: turn {}", state.turn);
    run_income_phase(state, config, &mut log);
    apply_research_allocations(state, config, packets, &mut log);

    state.turn += 1;
    info!("turn advanced to {}", state.turn);

    debug!("command phase: turn {}", state.turn);
    commission_ships(state, config, &mut log);
    auto_assign_squadrons(state);
    auto_load_fighter_squadrons(state, config, &mut log);

    let mut ordered_packets: Vec<&CommandPacket> = packets.iter().collect();
    ordered_packets.sort_by_key(|p| p.house);
    for packet in ordered_packets {
        accept_packet(state, config, packet, &mut log);
    }

    activate_standing_orders(state);

    debug!("conflict phase: turn {}", state.turn);
    resolve_movement(state, &mut log);

    let mut systems: Vec<SystemId> = state.fleets.values().map(|f| f.location).collect();
    systems.sort_by_key(|s| s.raw());
    systems.dedup();
    for system in systems {
        resolve_system_combat(state, config, &state.rng.clone(), system, &mut log);
    }

    resolve_bombardment_and_invasion(state, config, &mut log);
    resolve_colonization(state, config, &mut log);
    resolve_blockades(state, config, &mut log);

    // Espionage resolution must not depend on transport-layer delivery
    // order (§4.3): sort every (attacker, target, action) triple across
    // all packets before executing any of them.
    let mut espionage_actions: Vec<(HouseId, HouseId, ec4x_common::espionage_kinds::EspionageAction)> = packets
        .iter()
        .flat_map(|packet| packet.espionage_orders.iter().map(move |order| (packet.house, order.target_house, order.action)))
        .collect();
    espionage_actions.sort();
    for (house, target_house, action) in espionage_actions {
        execute_mission(state, config, &state.rng.clone(), house, target_house, action, &mut log);
    }

    let mut diplomacy_packets: Vec<&CommandPacket> = packets.iter().collect();
    diplomacy_packets.sort_by_key(|p| p.house);
    for packet in diplomacy_packets {
        for order in &packet.diplomatic_orders {
            if let Err(reason) = apply_diplomatic_action(state, config, packet.house, order.other_house, order.to, &mut log) {
                log.push(state.turn, Phase::Conflict, EventKind::OrderRejected { house: packet.house, reason });
            }
        }
    }

    apply_eliminations(state, &mut log);
    check_victory(state, config, &mut log);
    record_public_events(state, &log);

    log
}

/// Runs once per turn at the end of the Conflict Phase (§4.1 "check
/// victory conditions"). Sticky: once a winner is declared the event
/// fires once and `state.victory_declared` suppresses repeats on later
/// turns, since nothing in `resolve_turn` halts the pipeline itself -
/// external callers still poll `is_game_over` to act on it.
fn check_victory(state: &mut GameState, config: &Config, log: &mut EventLog) {
    if state.victory_declared {
        return;
    }
    let turn = state.turn;
    let Some((house, _kind)) = crate::victory::check_victory(state, config) else { return };
    let prestige_total = state.houses.get(&house).map(|h| h.prestige_total).unwrap_or(0);
    state.victory_declared = true;
    log.push(turn, Phase::Conflict, EventKind::VictoryAchieved { house, turn, prestige_total });
}

/// Replaces `state.public_events` with this turn's broadcast-worthy
/// events (§4.10 "public actions... emit... entries to all houses", §4.11
/// "public turn events"), so `filteredView` can expose them without
/// threading the `EventLog` through its `(state, house)` signature (§6.1).
fn record_public_events(state: &mut GameState, log: &EventLog) {
    state.public_events = log
        .as_slice()
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EventKind::DiplomaticStateChanged { .. }
                    | EventKind::HouseEliminated { .. }
                    | EventKind::VictoryAchieved { .. }
                    | EventKind::ColonyConquered { .. }
            )
        })
        .cloned()
        .collect();
}

/// A packet is rejected in full only for a turn/house binding mismatch
/// (§7 "out-of-turn packet"); every item inside a correctly bound packet
/// is then validated and applied independently.
fn accept_packet(state: &mut GameState, config: &Config, packet: &CommandPacket, log: &mut EventLog) {
    if packet.turn != state.turn {
        log.push(
            state.turn,
            Phase::Command,
            EventKind::OrderRejected { house: packet.house, reason: OrderRejectReason::MalformedPacket("wrong turn".into()) },
        );
        return;
    }
    if state.house(packet.house).is_none() {
        return;
    }

    log.push(state.turn, Phase::Command, EventKind::OrderAccepted { house: packet.house });

    for admin in &packet.admin_commands {
        apply_admin_command(state, config, packet.house, admin, log);
    }

    for build in &packet.build_commands {
        let order = BuildOrder { colony: build.colony, item: build.item, quantity: build.quantity };
        if let Err(reason) = commit_build_order(state, config, packet.house, order, log) {
            log.push(state.turn, Phase::Command, EventKind::OrderRejected { house: packet.house, reason });
        }
    }

    for fleet_cmd in &packet.fleet_commands {
        apply_fleet_command(state, packet.house, fleet_cmd.fleet, fleet_cmd.order, log);
    }

    for update in &packet.standing_order_updates {
        apply_standing_order_update(state, config, packet.house, update, log);
    }

    if let Some(rate) = packet.tax_rate {
        apply_tax_rate(state, packet.house, rate, log);
    }
}

fn apply_admin_command(state: &mut GameState, config: &Config, house: HouseId, command: &AdminCommand, log: &mut EventLog) {
    let turn = state.turn;
    let reject = |log: &mut EventLog, reason: OrderRejectReason| {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason });
    };

    match *command {
        AdminCommand::AssignSquadron { squadron, fleet } => {
            let Some(sq) = state.unassigned_squadrons.get(&squadron) else {
                reject(log, OrderRejectReason::ProjectNotFound);
                return;
            };
            if sq.owner != house {
                reject(log, OrderRejectReason::FleetNotOwnedByHouse { fleet, house });
                return;
            }
            let Some(target) = state.fleets.get(&fleet) else {
                reject(log, OrderRejectReason::UnknownFleet(fleet));
                return;
            };
            if target.owner != house {
                reject(log, OrderRejectReason::FleetNotOwnedByHouse { fleet, house });
                return;
            }
            state.assign_squadron_to_fleet(squadron, fleet);
        }
        AdminCommand::MergeFleets { from, into } => {
            let (Some(from_fleet), Some(into_fleet)) = (state.fleet(from), state.fleet(into)) else {
                reject(log, OrderRejectReason::UnknownFleet(from));
                return;
            };
            if from_fleet.owner != house || into_fleet.owner != house {
                reject(log, OrderRejectReason::FleetNotOwnedByHouse { fleet: from, house });
                return;
            }
            if from_fleet.location != into_fleet.location {
                reject(log, OrderRejectReason::DestinationNotAdjacent { from: from_fleet.location, to: into_fleet.location });
                return;
            }
            if let Some(mut taken) = state.remove_fleet(from) {
                if let Some(target) = state.fleets.get_mut(&into) {
                    target.squadrons.append(&mut taken.squadrons);
                    target.spacelift.append(&mut taken.spacelift);
                }
            }
        }
        AdminCommand::SetFleetStatus { fleet, status } => {
            let Some(f) = state.fleets.get_mut(&fleet) else {
                reject(log, OrderRejectReason::UnknownFleet(fleet));
                return;
            };
            if f.owner != house {
                reject(log, OrderRejectReason::FleetNotOwnedByHouse { fleet, house });
                return;
            }
            f.status = status;
        }
        AdminCommand::SetColonyTaxOverride { colony, rate } => {
            let Some(c) = state.colonies.get_mut(&colony) else {
                reject(log, OrderRejectReason::UnknownColony(colony));
                return;
            };
            if c.owner != house {
                reject(log, OrderRejectReason::ColonyNotOwnedByHouse { colony, house });
                return;
            }
            if let Some(rate) = rate {
                if rate > 100 {
                    reject(log, OrderRejectReason::InvalidTaxRate(rate));
                    return;
                }
            }
            c.tax_rate_override = rate;
        }
        AdminCommand::RequestShipRepair { fleet, ship } => {
            if let Err(reason) = request_ship_repair(state, config, house, fleet, ship, log) {
                reject(log, reason);
            }
        }
        AdminCommand::RequestStarbaseRepair { kastra } => {
            if let Err(reason) = request_starbase_repair(state, config, house, kastra, log) {
                reject(log, reason);
            }
        }
        AdminCommand::RequestTerraform { colony } => {
            if let Err(reason) = request_terraform(state, config, house, colony, log) {
                reject(log, reason);
            }
        }
    }
}

fn apply_fleet_command(state: &mut GameState, house: HouseId, fleet_id: FleetId, order: FleetOrder, log: &mut EventLog) {
    let turn = state.turn;
    let Some(fleet) = state.fleets.get_mut(&fleet_id) else {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason: OrderRejectReason::UnknownFleet(fleet_id) });
        return;
    };
    if fleet.owner != house {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason: OrderRejectReason::FleetNotOwnedByHouse { fleet: fleet_id, house } });
        return;
    }
    if !fleet.can_move() && !matches!(order.kind, OrderKind::HoldPosition) {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason: OrderRejectReason::FleetCannotMoveWhileCrippled(fleet_id) });
        return;
    }
    fleet.accept_order(order);
}

/// Installs, replaces, or clears a fleet's standing order (§9
/// "Standing-order activation delay"). A fresh or replaced order starts
/// with `turns_until_activation` at the configured delay and is gated by
/// both its own `enabled` flag and the global kill-switch; `order: None`
/// clears any standing order the fleet currently carries.
fn apply_standing_order_update(
    state: &mut GameState,
    config: &Config,
    house: HouseId,
    update: &crate::packets::StandingOrderUpdate,
    log: &mut EventLog,
) {
    let turn = state.turn;
    let Some(fleet) = state.fleets.get_mut(&update.fleet) else {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason: OrderRejectReason::UnknownFleet(update.fleet) });
        return;
    };
    if fleet.owner != house {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason: OrderRejectReason::FleetNotOwnedByHouse { fleet: update.fleet, house } });
        return;
    }
    match update.order {
        None => fleet.standing_order = None,
        Some(order) => {
            fleet.standing_order = Some(StandingOrder {
                order,
                enabled: update.enabled && config.economy.standing_orders_enabled,
                turns_until_activation: config.economy.standing_order_activation_delay_turns,
            });
        }
    }
}

/// Command Phase step (e): a fleet with no explicit order this turn falls
/// back to its standing order once the activation delay has counted down,
/// provided both the fleet's own enable flag and the standing order's
/// `enabled` flag (set from the global kill-switch at update time, §9)
/// allow it. Iteration is in ascending fleet-id order so the countdown is
/// deterministic regardless of map iteration.
fn activate_standing_orders(state: &mut GameState) {
    let mut fleet_ids: Vec<FleetId> = state.fleets.keys().copied().collect();
    fleet_ids.sort_by_key(|f| f.raw());
    for fleet_id in fleet_ids {
        let Some(fleet) = state.fleets.get_mut(&fleet_id) else { continue };
        if fleet.current_order.is_some() {
            continue;
        }
        let Some(standing) = &mut fleet.standing_order else { continue };
        if standing.turns_until_activation > 0 {
            standing.turns_until_activation -= 1;
            continue;
        }
        if standing.enabled {
            fleet.current_order = Some(standing.order);
        }
    }
}

fn apply_tax_rate(state: &mut GameState, house: HouseId, rate: u8, log: &mut EventLog) {
    let turn = state.turn;
    if rate > 100 {
        log.push(turn, Phase::Command, EventKind::OrderRejected { house, reason: OrderRejectReason::InvalidTaxRate(rate) });
        return;
    }
    if let Some(h) = state.houses.get_mut(&house) {
        h.tax_rate = rate;
    }
}

fn apply_research_allocations(state: &mut GameState, config: &Config, packets: &[CommandPacket], log: &mut EventLog) {
    let turn = state.turn;
    for packet in packets {
        for alloc in &packet.research_allocations {
            let Some(house) = state.houses.get(&packet.house) else { continue };
            let current = house.tech.level(alloc.field);
            let Some(entry) = config.tech.entry(alloc.field, current + 1) else { continue };
            if alloc.amount < entry.cost || house.treasury < entry.cost {
                continue;
            }
            if let Some(house) = state.houses.get_mut(&packet.house) {
                house.treasury -= entry.cost;
                house.tech.set_level(alloc.field, current + 1);
            }
            log.push(
                turn,
                Phase::Income,
                EventKind::TechAdvanced { house: packet.house, field: alloc.field, level: current + 1 },
            );
        }
    }
}

/// Troop strength landed by a fleet's spacelift cargo, read from the
/// `GroundForces` cargo quantity carried by its troop transports (§3.2
/// cargo model); there is no dedicated "landed troop strength" stat, so
/// each cargo unit contributes the marine combat-strength constant.
fn troop_strength(config: &Config, fleet: &ec4x_common::entities::Fleet) -> u32 {
    fleet
        .spacelift
        .iter()
        .filter_map(|s| s.cargo.as_ref())
        .filter(|c| matches!(c.kind, CargoKind::GroundForces))
        .map(|c| c.quantity * config.ground_units.marines.combat_strength)
        .sum()
}

/// Runs bombardment/invasion for every fleet still carrying a
/// `Bombard`/`Invade`/`Blitz` order against a colony it shares a system
/// with, after space combat for that system has already resolved.
fn resolve_bombardment_and_invasion(state: &mut GameState, config: &Config, log: &mut EventLog) {
    struct Action {
        fleet: FleetId,
        owner: HouseId,
        system: SystemId,
        bombard: bool,
        invade: bool,
    }

    let mut fleet_ids: Vec<FleetId> = state.fleets.keys().copied().collect();
    fleet_ids.sort_by_key(|f| f.raw());

    let actions: Vec<Action> = fleet_ids
        .into_iter()
        .filter_map(|id| {
            let fleet = state.fleet(id)?;
            let order = fleet.current_order?;
            let (bombard, invade) = match order.kind {
                OrderKind::Bombard(_) => (true, false),
                OrderKind::Invade(_) => (false, true),
                OrderKind::Blitz(_) => (true, true),
                _ => return None,
            };
            Some(Action { fleet: id, owner: fleet.owner, system: fleet.location, bombard, invade })
        })
        .collect();

    for action in actions {
        let Some(colony) = state.colony_at(action.system) else { continue };
        if colony.owner == action.owner {
            continue;
        }
        let colony_id = colony.id;

        if action.bombard {
            bombard_colony(state, config, &state.rng.clone(), colony_id, action.invade);
        }
        if action.invade {
            let Some(fleet) = state.fleet(action.fleet) else { continue };
            let strength = troop_strength(config, fleet);
            if strength > 0 {
                resolve_invasion(state, config, &state.rng.clone(), action.owner, colony_id, strength, log);
            }
        }
    }
}

/// An ETAC carrying PTU cargo that reaches its `Colonize` target founds a
/// new colony there and is consumed in the act (§4.4, §9 Open Questions:
/// one-time consumable model, not a reload cycle). A system already
/// colonized by anyone is left alone - colonization never displaces an
/// existing owner, friendly or not.
fn resolve_colonization(state: &mut GameState, config: &Config, log: &mut EventLog) {
    struct Action {
        fleet: FleetId,
        owner: HouseId,
        system: SystemId,
    }

    let mut fleet_ids: Vec<FleetId> = state.fleets.keys().copied().collect();
    fleet_ids.sort_by_key(|f| f.raw());

    let actions: Vec<Action> = fleet_ids
        .into_iter()
        .filter_map(|id| {
            let fleet = state.fleet(id)?;
            let order = fleet.current_order?;
            let OrderKind::Colonize(dest) = order.kind else { return None };
            if fleet.location != dest {
                return None;
            }
            Some(Action { fleet: id, owner: fleet.owner, system: dest })
        })
        .collect();

    for action in actions {
        if state.colony_at(action.system).is_some() {
            continue;
        }
        let Some(fleet) = state.fleets.get_mut(&action.fleet) else { continue };
        let Some(etac_index) = fleet.spacelift.iter().position(|ship| {
            ship.class.is_etac() && matches!(ship.cargo.as_ref().map(|c| c.kind), Some(CargoKind::Ptu))
        }) else {
            continue;
        };
        fleet.spacelift.remove(etac_index);
        fleet.current_order = None;

        let colony_id = ec4x_common::ids::ColonyId::from_raw(state.allocators.colony.alloc());
        let mut colony = ec4x_common::entities::Colony::new(colony_id, action.system, action.owner);
        colony.population_souls = config.economy.starting_population_souls / 10;
        colony.infrastructure = config.economy.starting_infrastructure / 10;
        colony.industrial_units = config.economy.starting_industrial_units / 10;
        state.insert_colony(colony);

        if let Some(house) = state.houses.get_mut(&action.owner) {
            house.prestige_total += config.prestige.amount_for(PrestigeSource::ColonyEstablished);
        }

        log.push(
            state.turn,
            Phase::Conflict,
            EventKind::ColonyEstablished { colony: colony_id, system: action.system, owner: action.owner },
        );
    }
}

/// A fleet holding a `Blockade` order at the system it already occupies
/// halts that colony's next Income Phase output and costs the blockader
/// prestige (§4.7 Blockade). A fleet still en route to its blockade
/// target has not yet had a chance to hold station, so it imposes
/// nothing until it arrives.
fn resolve_blockades(state: &mut GameState, config: &Config, log: &mut EventLog) {
    let turn = state.turn;
    let mut fleet_ids: Vec<FleetId> = state.fleets.keys().copied().collect();
    fleet_ids.sort_by_key(|f| f.raw());

    for fleet_id in fleet_ids {
        let Some(fleet) = state.fleet(fleet_id) else { continue };
        let Some(order) = fleet.current_order else { continue };
        let OrderKind::Blockade(dest) = order.kind else { continue };
        if dest != fleet.location {
            continue;
        }
        let owner = fleet.owner;
        let location = fleet.location;
        let Some(colony) = state.colony_at(location) else { continue };
        if colony.owner == owner {
            continue;
        }
        let colony_id = colony.id;
        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            colony.blockaded = true;
        }
        let penalty = config.diplomacy.blockade_diplomatic_penalty;
        if let Some(house) = state.houses.get_mut(&owner) {
            house.prestige_total += penalty;
        }
        log.push(
            turn,
            Phase::Conflict,
            EventKind::PrestigePenalized { house: owner, source: PrestigeSource::DiplomaticAction, amount: -penalty },
        );
    }
}

/// A house with neither a colony nor a fleet left is eliminated — it keeps
/// its historical record for scoring but stops receiving turns (§3.2 House
/// lifecycle).
fn apply_eliminations(state: &mut GameState, log: &mut EventLog) {
    let turn = state.turn;
    let house_ids: Vec<HouseId> = state.houses.keys().copied().collect();
    for house_id in house_ids {
        let Some(house) = state.houses.get(&house_id) else { continue };
        if !house.is_active() {
            continue;
        }
        let has_colony = state.colonies_owned_by(house_id).next().is_some();
        let has_fleet = state.fleets_owned_by(house_id).next().is_some();
        if !has_colony && !has_fleet {
            if let Some(house) = state.houses.get_mut(&house_id) {
                house.eliminate(turn);
            }
            log.push(turn, Phase::Conflict, EventKind::HouseEliminated { house: house_id, turn });
        }
    }
}
