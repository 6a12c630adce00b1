//! Space combat (§4.7): two-phase hit application (cripple-all-before-destroy),
//! critical hits that bypass that rule, starbase participation, and
//! ROE-driven auto-retreat.
//!
//! Fighters never occupy the `Crippled` state (§3.2 Ship invariant) - a
//! hit against a fighter is always lethal.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use ec4x_common::config::Config;
use ec4x_common::entities::diplomacy::DiplomaticState;
use ec4x_common::entities::fleet::{FleetStatus, OrderKind, Roe};
use ec4x_common::entities::ship::{Ship, ShipCombatState};
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{HouseId, SystemId};
use ec4x_common::rng::RngService;
use ec4x_common::store::GameState;

/// Combat strength contributed by every uncrippled starbase a house holds
/// at `system` (§4.7). A crippled starbase contributes nothing and does
/// not surveil - surveillance is handled by `intel::scouting`, not here.
fn starbase_strength(config: &Config, state: &GameState, system: SystemId, owner: HouseId) -> u32 {
    let Some(colony) = state.colony_at(system) else { return 0 };
    if colony.owner != owner {
        return 0;
    }
    colony
        .kastra
        .iter()
        .filter_map(|id| state.kastra.get(id))
        .filter(|k| k.combat_capable())
        .count() as u32
        * config.combat.starbase_combat_strength
}

struct Combatant<'a> {
    owner: HouseId,
    ships: Vec<&'a mut Ship>,
}

fn total_strength(config: &Config, ships: &[&mut Ship]) -> u32 {
    ships
        .iter()
        .filter(|s| s.is_alive())
        .map(|s| {
            let spec = config.ships.spec(s.class);
            let base = spec.map(|sp| sp.combat_strength).unwrap_or(0);
            if s.is_crippled() { base / 2 } else { base }
        })
        .sum()
}

/// One side's hits this round: roll once per living ship, a hit lands on
/// `roll >= hit_die_sides / 2`, and a roll at or above
/// `config.combat.critical_threshold` is a critical that destroys
/// outright (bypassing the cripple-first rule) rather than crippling.
fn roll_hits(config: &Config, rng: &mut ChaCha8Rng, attacker_strength: u32) -> (u32, u32) {
    let mut hits = 0u32;
    let mut criticals = 0u32;
    let shots = (attacker_strength / 10).max(1);
    for _ in 0..shots {
        let roll = rng.gen_range(1..=config.combat.hit_die_sides);
        if roll >= config.combat.hit_die_sides / 2 {
            hits += 1;
        }
        if roll >= config.combat.critical_threshold {
            criticals += 1;
        }
    }
    (hits, criticals)
}

/// Applies `hits` ordinary hits and `criticals` critical hits to a side's
/// ship list, in ascending `ShipId` order for determinism. Ordinary hits
/// cripple every undamaged ship before any ship is destroyed; fighters
/// skip straight to destroyed since they have no crippled state.
fn apply_hits(ships: &mut [&mut Ship], hits: u32, criticals: u32) -> u32 {
    ships.sort_by_key(|s| s.id.raw());
    let mut destroyed = 0u32;
    let mut remaining_criticals = criticals;

    for ship in ships.iter_mut() {
        if remaining_criticals == 0 {
            break;
        }
        if ship.is_alive() {
            ship.state = ShipCombatState::Destroyed;
            destroyed += 1;
            remaining_criticals -= 1;
        }
    }

    let mut remaining_hits = hits;
    for ship in ships.iter_mut() {
        if remaining_hits == 0 {
            break;
        }
        if !ship.is_alive() || ship.is_crippled() {
            continue;
        }
        if ship.class.is_fighter() {
            ship.state = ShipCombatState::Destroyed;
            destroyed += 1;
        } else {
            ship.state = ShipCombatState::Crippled;
        }
        remaining_hits -= 1;
    }

    for ship in ships.iter_mut() {
        if remaining_hits == 0 {
            break;
        }
        if ship.is_alive() && ship.is_crippled() {
            ship.state = ShipCombatState::Destroyed;
            destroyed += 1;
            remaining_hits -= 1;
        }
    }

    destroyed
}

/// Resolves every system with fleets from more than one house present
/// and at least one pair at `War`/`Hostile` standing. Rounds run until
/// `config.combat.round_cap` or one side has no living ships, whichever
/// comes first; a side whose ROE threshold is exceeded by losses this
/// round auto-retreats rather than fighting the next round.
pub fn resolve_system_combat(
    state: &mut GameState,
    config: &Config,
    rng_service: &RngService,
    system: SystemId,
    log: &mut EventLog,
) {
    let turn = state.turn;
    let fleet_ids: Vec<_> = state.fleets_at(system).map(|f| f.id).collect();
    if fleet_ids.len() < 2 {
        return;
    }

    let mut owners: Vec<HouseId> = fleet_ids
        .iter()
        .filter_map(|id| state.fleet(*id))
        .map(|f| f.owner)
        .collect();
    owners.sort_by_key(|h| h.raw());
    owners.dedup();
    if owners.len() < 2 {
        return;
    }
    let any_hostile_pair = owners.iter().enumerate().any(|(i, a)| {
        owners[i + 1..].iter().any(|b| {
            matches!(
                state.diplomacy_between(*a, *b).map(|r| r.state),
                Some(DiplomaticState::War) | Some(DiplomaticState::Hostile)
            )
        })
    });
    if !any_hostile_pair {
        return;
    }

    let mut round = 0u32;
    loop {
        if round >= config.combat.round_cap {
            break;
        }
        let alive_owners: Vec<HouseId> = owners
            .iter()
            .copied()
            .filter(|owner| {
                fleet_ids
                    .iter()
                    .filter_map(|id| state.fleet(*id))
                    .any(|f| f.owner == *owner && f.all_ships().any(|s| s.is_alive()))
            })
            .collect();
        if alive_owners.len() < 2 {
            break;
        }

        let attacker = alive_owners[0];
        let defenders: Vec<HouseId> = alive_owners[1..].to_vec();
        let mut round_rng = rng_service.combat_round_stream(turn, system, round);

        let attacker_starbase_bonus = starbase_strength(config, state, system, attacker);
        let defender_starbase_bonus: u32 = defenders.iter().map(|d| starbase_strength(config, state, system, *d)).sum();

        let mut attacker_ships: Vec<&mut Ship> = state
            .fleets
            .values_mut()
            .filter(|f| f.owner == attacker && f.location == system && f.status == FleetStatus::Active)
            .flat_map(|f| f.squadrons.iter_mut().flat_map(|sq| sq.ships_mut()))
            .collect();
        let attacker_strength = total_strength(config, &attacker_ships) + attacker_starbase_bonus;
        let attacker_starting = attacker_ships.iter().filter(|s| s.is_alive()).count() as u32;

        let mut defender_ships: Vec<&mut Ship> = state
            .fleets
            .values_mut()
            .filter(|f| defenders.contains(&f.owner) && f.location == system && f.status == FleetStatus::Active)
            .flat_map(|f| f.squadrons.iter_mut().flat_map(|sq| sq.ships_mut()))
            .collect();
        let defender_strength = total_strength(config, &defender_ships) + defender_starbase_bonus;
        let defender_starting = defender_ships.iter().filter(|s| s.is_alive()).count() as u32;

        let (att_hits, att_crits) = roll_hits(config, &mut round_rng, attacker_strength);
        let (def_hits, def_crits) = roll_hits(config, &mut round_rng, defender_strength);

        let defender_losses = apply_hits(&mut defender_ships, att_hits, att_crits);
        let attacker_losses = apply_hits(&mut attacker_ships, def_hits, def_crits);

        log.push(
            turn,
            Phase::Conflict,
            EventKind::CombatResolved {
                system,
                rounds: round + 1,
                attackers: attacker,
                defenders: defenders.clone(),
                attacker_ships_lost: attacker_losses,
                defender_ships_lost: defender_losses,
            },
        );

        round += 1;

        if retreating_owner(state, system, attacker, attacker_losses, attacker_starting)
            .or_else(|| {
                defenders
                    .iter()
                    .find(|d| retreating_owner(state, system, **d, defender_losses, defender_starting).is_some())
                    .copied()
            })
            .is_some()
        {
            break;
        }
    }

    apply_unscreened_spacelift_losses(config, state, system, &owners);
    prune_destroyed_squadrons(state, system);
}

/// §4.7 point 5: spacelift ships and `Mothballed` fleets need a friendly
/// combat squadron with at least one living ship at the same system to be
/// "screened". An owner with no such squadron present loses a share of
/// its unscreened spacelift ships proportional to the enemy strength
/// arrayed against it - the combat-strength points of a single destroyer
/// already overwhelm an unescorted freighter, so the loss fraction
/// saturates quickly rather than scaling linearly to the largest fleets
/// in the game.
fn apply_unscreened_spacelift_losses(config: &Config, state: &mut GameState, system: SystemId, owners: &[HouseId]) {
    for &owner in owners {
        let screened = state
            .fleets_at(system)
            .filter(|f| f.owner == owner && f.status == FleetStatus::Active)
            .any(|f| f.squadrons.iter().any(|sq| sq.ships().any(|s| s.is_alive())));
        if screened {
            continue;
        }

        let enemy_strength: u32 = state
            .fleets_at(system)
            .filter(|f| f.owner != owner)
            .flat_map(|f| f.all_ships())
            .filter_map(|s| {
                if !s.is_alive() {
                    return None;
                }
                let spec = config.ships.spec(s.class)?;
                Some(if s.is_crippled() { spec.combat_strength / 2 } else { spec.combat_strength })
            })
            .sum();
        if enemy_strength == 0 {
            continue;
        }
        let loss_fraction = (enemy_strength as f64 / 100.0).min(1.0);

        let mut fleet_ids: Vec<_> = state.fleets_at(system).filter(|f| f.owner == owner).map(|f| f.id).collect();
        fleet_ids.sort_by_key(|f| f.raw());
        for fleet_id in fleet_ids {
            let Some(fleet) = state.fleets.get_mut(&fleet_id) else { continue };
            let mothballed = fleet.status == FleetStatus::Mothballed;

            let alive_spacelift = fleet.spacelift.iter().filter(|s| s.is_alive()).count();
            let to_destroy = ((alive_spacelift as f64 * loss_fraction).ceil() as usize).min(alive_spacelift);
            let mut destroyed = 0;
            for ship in fleet.spacelift.iter_mut() {
                if destroyed >= to_destroy {
                    break;
                }
                if ship.is_alive() {
                    ship.state = ShipCombatState::Destroyed;
                    destroyed += 1;
                }
            }

            if mothballed {
                let mut ships: Vec<&mut Ship> =
                    fleet.squadrons.iter_mut().flat_map(|sq| sq.ships_mut()).collect();
                ships.sort_by_key(|s| s.id.raw());
                let alive_count = ships.iter().filter(|s| s.is_alive()).count();
                let to_destroy = ((alive_count as f64 * loss_fraction).ceil() as usize).min(alive_count);
                let mut destroyed = 0;
                for ship in ships.iter_mut() {
                    if destroyed >= to_destroy {
                        break;
                    }
                    if ship.is_alive() {
                        ship.state = ShipCombatState::Destroyed;
                        destroyed += 1;
                    }
                }
            }
        }
    }
}

/// Squadrons whose flagship was destroyed are scrapped in full (escorts
/// scatter rather than surviving leaderless, §4.7 design note); fleets
/// left with nothing alive are removed.
fn prune_destroyed_squadrons(state: &mut GameState, system: SystemId) {
    let fleet_ids: Vec<_> = state.fleets_at(system).map(|f| f.id).collect();
    for fleet_id in fleet_ids {
        if let Some(fleet) = state.fleets.get_mut(&fleet_id) {
            fleet.squadrons.retain(|sq| !sq.is_destroyed());
            fleet.spacelift.retain(|s| s.is_alive());
        }
        if state.fleet(fleet_id).map(|f| f.is_empty()).unwrap_or(false) {
            state.remove_fleet(fleet_id);
        }
    }
}

fn retreat_threshold_exceeded(roe: Roe, losses: u32, starting: u32) -> bool {
    if starting == 0 {
        return false;
    }
    let loss_pct = losses * 100 / starting;
    loss_pct > (10 - roe.0 as u32) * 10
}

/// Checks whether `owner`'s standing order at `system` calls for
/// auto-evade (§4.7 Retreat) and whether this round's losses exceeded its
/// ROE threshold; if so, relocates every one of that owner's fleets at
/// `system` to an adjacent system the owner controls (approximating "the
/// last friendly system along its entry path" absent a recorded entry
/// path) and returns the owner so the caller ends the battle.
fn retreating_owner(
    state: &mut GameState,
    system: SystemId,
    owner: HouseId,
    losses: u32,
    starting: u32,
) -> Option<HouseId> {
    let roe = state
        .fleets_at(system)
        .filter(|f| f.owner == owner)
        .find_map(|f| f.standing_order.as_ref())
        .filter(|so| so.enabled && matches!(so.order.kind, OrderKind::AutoEvade))
        .map(|so| so.order.roe)?;

    if !retreat_threshold_exceeded(roe, losses, starting) {
        return None;
    }

    let retreat_to = state.system(system)?.neighbors().find(|candidate| {
        state
            .colony_at(*candidate)
            .map(|c| c.owner == owner)
            .unwrap_or(false)
    })?;

    let fleet_ids: Vec<_> = state.fleets_at(system).filter(|f| f.owner == owner).map(|f| f.id).collect();
    for fleet_id in fleet_ids {
        let _ = state.relocate_fleet(fleet_id, retreat_to);
    }
    Some(owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::fleet::Fleet;
    use ec4x_common::entities::squadron::{Squadron, SquadronType};
    use ec4x_common::ids::{FleetId, ShipId, SquadronId};
    use std::collections::BTreeMap;

    #[test]
    fn two_fleets_of_different_houses_fight_and_produce_events() {
        let config = test_config();
        let mut state = GameState::new(7, BTreeMap::new());
        let system = SystemId::from_raw(0);

        let attacker_ship = Ship::new(ShipId::from_raw(0), ec4x_common::entities::ship::ShipClass::Destroyer, 0, HouseId::from_raw(0));
        let attacker_sq = Squadron::new(SquadronId::from_raw(0), attacker_ship, HouseId::from_raw(0), system, SquadronType::Combat);
        let mut attacker_fleet = Fleet::new(FleetId::from_raw(0), HouseId::from_raw(0), system);
        attacker_fleet.squadrons.push(attacker_sq);
        state.insert_fleet(attacker_fleet);

        let defender_ship = Ship::new(ShipId::from_raw(1), ec4x_common::entities::ship::ShipClass::Destroyer, 0, HouseId::from_raw(1));
        let defender_sq = Squadron::new(SquadronId::from_raw(1), defender_ship, HouseId::from_raw(1), system, SquadronType::Combat);
        let mut defender_fleet = Fleet::new(FleetId::from_raw(1), HouseId::from_raw(1), system);
        defender_fleet.squadrons.push(defender_sq);
        state.insert_fleet(defender_fleet);

        state
            .diplomacy_between_mut(HouseId::from_raw(0), HouseId::from_raw(1))
            .transition(state.turn, DiplomaticState::War);

        let rng_service = RngService::new(state.seed);
        let mut log = EventLog::new();
        resolve_system_combat(&mut state, &config, &rng_service, system, &mut log);

        assert!(log.as_slice().iter().any(|e| matches!(e.kind, EventKind::CombatResolved { .. })));
    }
}
