//! Fleet composition & auto-assignment (§4.5). Newly commissioned combat
//! squadrons, scout squadrons, and spacelift ships sit at their colony
//! unassigned until this pass places them: new squadrons join a
//! stationary friendly fleet of the matching kind already at the
//! colony, or else found a brand-new one, in ascending entity-id order
//! so the result never depends on table iteration order.

use ec4x_common::entities::fleet::{Fleet, FleetStatus};
use ec4x_common::entities::ship::Ship;
use ec4x_common::entities::squadron::SquadronType;
use ec4x_common::ids::{ColonyId, FleetId, SquadronId};
use ec4x_common::store::GameState;

/// A fleet is a candidate merge target only if it is stationary (no
/// current order, not `Reserve`/`Mothballed`) and owned by the
/// commissioning house — matching squadrons never drift into another
/// house's fleet, and a fleet already under orders this turn should not
/// gain new members mid-maneuver.
fn is_stationary_friendly(fleet: &Fleet, owner: ec4x_common::ids::HouseId) -> bool {
    fleet.owner == owner && fleet.is_stationary() && matches!(fleet.status, FleetStatus::Active)
}

/// Runs once per turn, after ship commissioning and before fighter
/// auto-load (which itself expects carriers to already be parked in
/// their fleets).
pub fn auto_assign_squadrons(state: &mut GameState) {
    let mut colony_ids: Vec<ColonyId> = state.colonies.keys().copied().collect();
    colony_ids.sort_by_key(|id| id.raw());

    for colony_id in colony_ids {
        let Some(colony) = state.colonies.get(&colony_id) else { continue };
        let owner = colony.owner;
        let system = colony.system;

        let mut squadron_ids = colony.unassigned_squadrons.clone();
        squadron_ids.sort_by_key(|id| id.raw());
        for squadron_id in squadron_ids {
            assign_squadron(state, colony_id, owner, system, squadron_id);
        }

        let pending_spacelift = state
            .colonies
            .get_mut(&colony_id)
            .map(|c| std::mem::take(&mut c.unassigned_spacelift))
            .unwrap_or_default();
        for ship in pending_spacelift {
            assign_spacelift(state, owner, system, ship);
        }
    }
}

/// Finds the lowest-id stationary friendly fleet at `system` whose
/// existing squadrons are all of `kind` (an empty fleet matches
/// trivially, but nothing here creates those) — combat squadrons merge
/// only with other combat squadrons, scouts only with scouts, matching
/// §4.5's "scout squadrons ... never merge into mixed fleets".
fn find_fleet_of_kind(
    state: &GameState,
    owner: ec4x_common::ids::HouseId,
    system: ec4x_common::ids::SystemId,
    kind: SquadronType,
) -> Option<FleetId> {
    let mut candidates: Vec<&Fleet> = state
        .fleets_at(system)
        .filter(|f| is_stationary_friendly(f, owner))
        .filter(|f| f.spacelift.is_empty())
        .filter(|f| !f.squadrons.is_empty() && f.squadrons.iter().all(|sq| sq.squadron_type == kind))
        .collect();
    candidates.sort_by_key(|f| f.id.raw());
    candidates.first().map(|f| f.id)
}

fn assign_squadron(
    state: &mut GameState,
    colony_id: ColonyId,
    owner: ec4x_common::ids::HouseId,
    system: ec4x_common::ids::SystemId,
    squadron_id: SquadronId,
) {
    let Some(squadron) = state.unassigned_squadrons.get(&squadron_id) else { return };
    let kind = squadron.squadron_type;

    let target_fleet = match kind {
        // Intel (scout) squadrons coalesce into a dedicated scout-only
        // fleet; combat squadrons join any stationary combat fleet at
        // the colony (§4.5).
        SquadronType::Intel | SquadronType::Combat => find_fleet_of_kind(state, owner, system, kind),
        // Fighters never reach this path (commissioned planet-side,
        // §4.1); Expansion/Auxiliary squadrons are not produced by
        // commissioning either (spacelift ships bypass the squadron
        // wrapper entirely, see `assign_spacelift`).
        SquadronType::Fighter | SquadronType::Expansion | SquadronType::Auxiliary => None,
    };

    if let Some(fleet_id) = target_fleet {
        state.assign_squadron_to_fleet(squadron_id, fleet_id);
    } else {
        let Some(squadron) = state.unassigned_squadrons.remove(&squadron_id) else { return };
        let fleet_id = FleetId::from_raw(state.allocators.fleet.alloc());
        let mut fleet = Fleet::new(fleet_id, owner, system);
        fleet.squadrons.push(squadron);
        state.insert_fleet(fleet);
    }

    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.unassigned_squadrons.retain(|id| *id != squadron_id);
    }
}

/// ETACs always found a new dedicated single-ship fleet (§4.4: "ETACs
/// commission into dedicated single-ship fleets"); troop transports and
/// freighters commission empty into a shared auxiliary fleet, merging
/// with an existing stationary friendly spacelift-only fleet at the
/// colony if one is already there.
fn assign_spacelift(state: &mut GameState, owner: ec4x_common::ids::HouseId, system: ec4x_common::ids::SystemId, ship: Ship) {
    if ship.class.is_etac() {
        let fleet_id = FleetId::from_raw(state.allocators.fleet.alloc());
        let mut fleet = Fleet::new(fleet_id, owner, system);
        fleet.spacelift.push(ship);
        state.insert_fleet(fleet);
        return;
    }

    let mut candidates: Vec<FleetId> = state
        .fleets_at(system)
        .filter(|f| is_stationary_friendly(f, owner))
        .filter(|f| f.squadrons.is_empty())
        .filter(|f| f.spacelift.iter().all(|s| !s.class.is_etac()))
        .map(|f| f.id)
        .collect();
    candidates.sort_by_key(|id| id.raw());

    if let Some(fleet_id) = candidates.first().copied() {
        if let Some(fleet) = state.fleets.get_mut(&fleet_id) {
            fleet.spacelift.push(ship);
        }
    } else {
        let fleet_id = FleetId::from_raw(state.allocators.fleet.alloc());
        let mut fleet = Fleet::new(fleet_id, owner, system);
        fleet.spacelift.push(ship);
        state.insert_fleet(fleet);
    }
}
