//! Two-pass movement resolution (§4.6): pass one gathers every fleet's
//! intended next hop without mutating anything; pass two applies all
//! moves simultaneously so no fleet's relocation can influence another
//! fleet's adjacency check this turn. Fleets landing in the same system
//! merge under the rendezvous rule if their owners are not at war.

use std::collections::BTreeMap;

use ec4x_common::entities::fleet::OrderKind;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{FleetId, SystemId};
use ec4x_common::store::GameState;

use crate::pathfind::shortest_path;

struct Intent {
    fleet: FleetId,
    from: SystemId,
    next_hop: SystemId,
    destination: SystemId,
}

/// §4.6: a mover advances one lane per turn, except that when the whole
/// traversal stays on `Major` lanes through systems it already owns, it
/// may cross two. Only the first two edges of `path` are examined - a
/// longer route is still walked one leg per turn beyond that.
fn hops_allowed(state: &GameState, owner: ec4x_common::ids::HouseId, path: &[SystemId]) -> usize {
    if path.len() < 3 {
        return 1;
    }
    let first_leg_major = state
        .system(path[0])
        .and_then(|s| s.lane_to(path[1]))
        .map(|lane| matches!(lane, ec4x_common::entities::system::LaneClass::Major))
        .unwrap_or(false);
    let second_leg_major = state
        .system(path[1])
        .and_then(|s| s.lane_to(path[2]))
        .map(|lane| matches!(lane, ec4x_common::entities::system::LaneClass::Major))
        .unwrap_or(false);
    let intermediate_owned = state.colony_at(path[1]).map(|c| c.owner == owner).unwrap_or(false);
    if first_leg_major && second_leg_major && intermediate_owned {
        2
    } else {
        1
    }
}

fn gather_intents(state: &GameState) -> Vec<Intent> {
    let mut fleet_ids: Vec<_> = state.fleets.keys().copied().collect();
    fleet_ids.sort_by_key(|f| f.raw());

    let mut intents = Vec::new();
    for fleet_id in fleet_ids {
        let Some(fleet) = state.fleet(fleet_id) else { continue };
        if !fleet.can_move() {
            continue;
        }
        let Some(order) = fleet.current_order else { continue };
        let destination = match order.kind {
            OrderKind::MoveTo(dest)
            | OrderKind::Patrol(dest)
            | OrderKind::Blockade(dest)
            | OrderKind::Bombard(dest)
            | OrderKind::Invade(dest)
            | OrderKind::Blitz(dest)
            | OrderKind::Colonize(dest) => dest,
            OrderKind::HoldPosition | OrderKind::AutoEvade => continue,
        };
        if destination == fleet.location {
            continue;
        }

        let can_cross_restricted = !fleet.has_crippled_or_spacelift();
        let Some(path) = shortest_path(state, fleet.location, destination, can_cross_restricted) else {
            continue;
        };
        if path.len() < 2 {
            continue;
        }
        let hops = hops_allowed(state, fleet.owner, &path).min(path.len() - 1);
        intents.push(Intent { fleet: fleet_id, from: fleet.location, next_hop: path[hops], destination });
    }
    intents
}

/// Runs once per turn, before Conflict resolution. Crippled and
/// spacelift-only fleets may only take `Major`/`Minor` lanes; an intent
/// crossing a `Restricted` lane never reaches `gather_intents` because
/// `shortest_path` excludes those edges for such movers, so denial here
/// is logged defensively rather than relied upon.
pub fn resolve_movement(state: &mut GameState, log: &mut EventLog) {
    let turn = state.turn;
    let intents = gather_intents(state);

    let mut arrivals: BTreeMap<SystemId, Vec<FleetId>> = BTreeMap::new();
    for intent in &intents {
        arrivals.entry(intent.next_hop).or_default().push(intent.fleet);
    }

    for intent in intents {
        match state.relocate_fleet(intent.fleet, intent.next_hop) {
            Ok(()) => {
                log.push(
                    turn,
                    Phase::Command,
                    EventKind::FleetMoved { fleet: intent.fleet, from: intent.from, to: intent.next_hop },
                );
                if let Some(fleet) = state.fleets.get_mut(&intent.fleet) {
                    if intent.next_hop != intent.destination {
                        // Still en route; keep the order active for next turn.
                    } else {
                        fleet.current_order = None;
                    }
                }
            }
            Err(reason) => {
                log.push(
                    turn,
                    Phase::Command,
                    EventKind::FleetMoveDenied {
                        fleet: intent.fleet,
                        from: intent.from,
                        to: intent.next_hop,
                        reason,
                    },
                );
            }
        }
    }

    merge_rendezvous(state, log, &arrivals);
}

/// Multiple fleets of the same owner arriving at a shared target system
/// merge into the one with the lowest id (§4.6 "multi-fleet rendezvous").
/// Fleets at `Hostile`/`War` standing with a co-located fleet of another
/// owner never merge - that collocation is left for
/// `ec4x_combat::space::resolve_system_combat` to resolve as combat during
/// the Conflict Phase.
fn merge_rendezvous(state: &mut GameState, log: &mut EventLog, arrivals: &BTreeMap<SystemId, Vec<FleetId>>) {
    let turn = state.turn;
    for fleets in arrivals.values() {
        if fleets.len() < 2 {
            continue;
        }
        let mut by_owner: BTreeMap<ec4x_common::ids::HouseId, Vec<FleetId>> = BTreeMap::new();
        for fleet_id in fleets {
            if let Some(fleet) = state.fleet(*fleet_id) {
                by_owner.entry(fleet.owner).or_default().push(*fleet_id);
            }
        }
        for mut ids in by_owner.into_values() {
            if ids.len() < 2 {
                continue;
            }
            ids.sort_by_key(|id| id.raw());
            let surviving = ids[0];
            for merged_id in &ids[1..] {
                let Some(absorbed) = state.remove_fleet(*merged_id) else { continue };
                if let Some(target) = state.fleets.get_mut(&surviving) {
                    target.squadrons.extend(absorbed.squadrons);
                    target.spacelift.extend(absorbed.spacelift);
                }
            }
            log.push(
                turn,
                Phase::Command,
                EventKind::FleetsMerged { surviving, absorbed: ids[1..].to_vec() },
            );
        }
    }
}
