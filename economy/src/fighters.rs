//! Planet-side fighter auto-load (§4.4): a colony's accumulated fighter
//! squadrons load into carrier hangars of a co-located friendly fleet as
//! soon as docks finish producing them. Full 12-ship squadrons load
//! first; a partial squadron only loads once no full squadron remains
//! and hangar space is still free.

use ec4x_common::config::Config;
use ec4x_common::events::EventLog;
use ec4x_common::store::GameState;

/// Runs once per turn, at the start of the Command Phase, after
/// planetary commissioning has had a chance to add new fighter
/// squadrons to colonies.
pub fn auto_load_fighter_squadrons(state: &mut GameState, config: &Config, _log: &mut EventLog) {
    let colony_ids: Vec<_> = state.colonies.keys().copied().collect();

    for colony_id in colony_ids {
        let Some(colony) = state.colonies.get(&colony_id) else { continue };
        if colony.fighter_squadrons.is_empty() {
            continue;
        }
        let system = colony.system;
        let owner = colony.owner;

        let mut carrier_ids: Vec<_> = state
            .fleets_at(system)
            .filter(|f| f.owner == owner)
            .flat_map(|f| f.squadrons.iter())
            .filter(|sq| sq.flagship.class.is_carrier())
            .map(|sq| sq.flagship.id)
            .collect();
        carrier_ids.sort_by_key(|id| id.raw());
        if carrier_ids.is_empty() {
            continue;
        }

        let Some(colony) = state.colonies.get_mut(&colony_id) else { continue };
        let mut remaining = std::mem::take(&mut colony.fighter_squadrons);
        remaining.sort_by(|a, b| b.is_full().cmp(&a.is_full()));

        for carrier_id in &carrier_ids {
            let Some(fleet) = state
                .fleets
                .values_mut()
                .find(|f| f.owner == owner && f.location == system && f.squadrons.iter().any(|sq| sq.flagship.id == *carrier_id))
            else {
                continue;
            };
            let Some(squadron) = fleet.squadrons.iter_mut().find(|sq| sq.flagship.id == *carrier_id) else { continue };
            let carrier = &mut squadron.flagship;
            let capacity = config.ships.hangar_capacity_for(carrier.class, carrier.tech_level);

            let mut i = 0;
            while i < remaining.len() {
                let free = carrier.hangar_free(capacity);
                if free == 0 {
                    break;
                }
                let squad = &remaining[i];
                if !squad.is_full() && remaining.iter().any(|s| s.is_full()) {
                    i += 1;
                    continue;
                }
                if squad.ship_count > free {
                    i += 1;
                    continue;
                }
                for _ in 0..squad.ship_count {
                    // Disjoint-field borrow: `allocators` is a separate
                    // field from `fleets`, which `fleet`/`carrier` above
                    // still borrow.
                    let fighter_id = ec4x_common::ids::ShipId::from_raw(state.allocators.ship.alloc());
                    carrier.embarked_fighters.push(fighter_id);
                }
                remaining.remove(i);
            }
        }

        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            colony.fighter_squadrons = remaining;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::{Colony, PlanetaryFighterSquadron};
    use ec4x_common::entities::fleet::Fleet;
    use ec4x_common::entities::ship::{Ship, ShipClass};
    use ec4x_common::entities::squadron::{Squadron, SquadronType};
    use ec4x_common::ids::{ColonyId, FleetId, HouseId, ShipId, SquadronId, SystemId};
    use std::collections::BTreeMap;

    #[test]
    fn a_full_fighter_squadron_loads_into_a_co_located_carrier() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let owner = HouseId::from_raw(0);
        let system = SystemId::from_raw(0);

        let mut colony = Colony::new(ColonyId::from_raw(0), system, owner);
        colony.fighter_squadrons.push(PlanetaryFighterSquadron { ship_count: 12 });
        state.insert_colony(colony);

        let carrier = Ship::new(ShipId::from_raw(0), ShipClass::Carrier, 0, owner);
        let squadron = Squadron::new(SquadronId::from_raw(0), carrier, owner, system, SquadronType::Combat);
        let mut fleet = Fleet::new(FleetId::from_raw(0), owner, system);
        fleet.squadrons.push(squadron);
        state.insert_fleet(fleet);

        let mut log = EventLog::new();
        auto_load_fighter_squadrons(&mut state, &config, &mut log);

        let fleet = state.fleet(FleetId::from_raw(0)).unwrap();
        assert_eq!(fleet.squadrons[0].flagship.embarked_fighters.len(), 12);
    }
}
