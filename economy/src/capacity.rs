//! The three capacity enforcers that run in the Maintenance Phase (§4.8):
//! carrier hangar capacity, planet-breaker count, and planetary
//! fighter-squadron capacity. Each has its own grace-period policy before
//! excess assets are dealt with.

use ec4x_common::config::Config;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{ColonyId, SquadronId};
use ec4x_common::store::GameState;

#[derive(Debug, Clone, Default)]
pub struct CapacityReport {
    pub hangar_violations_logged: u32,
    pub fighter_overflow_salvaged: u32,
    pub planet_breakers_scrapped: u32,
}

/// Hangar loading is blocked at the load site (`economy::fighters`), so a
/// carrier found over capacity here indicates a bug elsewhere, not a
/// condition this enforcer corrects. Per §4.8 it only logs and emits a
/// diagnostic event — no mutation, no grace period.
fn enforce_hangar_capacity(state: &mut GameState, config: &Config, log: &mut EventLog, report: &mut CapacityReport) {
    let turn = state.turn;
    let mut violations = Vec::new();
    for fleet in state.fleets.values() {
        for squadron in &fleet.squadrons {
            let flagship = &squadron.flagship;
            if !flagship.class.is_carrier() {
                continue;
            }
            let capacity = config.ships.hangar_capacity_for(flagship.class, flagship.tech_level);
            let embarked = flagship.embarked_fighters.len() as u32;
            if embarked > capacity {
                violations.push(format!(
                    "carrier {:?} (squadron {:?}) holds {} fighters against a capacity of {}",
                    flagship.id, squadron.id, embarked, capacity
                ));
            }
        }
    }
    if !violations.is_empty() {
        report.hangar_violations_logged = violations.len() as u32;
        state.suspect = true;
        for description in violations {
            log.push(turn, Phase::Maintenance, EventKind::InvariantViolation { description });
        }
    }
}

/// A house's planet-breaker cap is its current colony count (§4.8). When
/// colonies are lost the cap can drop below the house's held count; the
/// excess is auto-scrapped immediately, oldest squadron id first, with no
/// salvage (§8 scenario 5).
fn enforce_planet_breaker_cap(state: &mut GameState, log: &mut EventLog, report: &mut CapacityReport) {
    let turn = state.turn;
    let house_ids: Vec<_> = state.houses.keys().copied().collect();

    for house_id in house_ids {
        let colony_count = state.colonies_owned_by(house_id).count() as u32;

        let mut breaker_squadrons: Vec<(SquadronId, ec4x_common::ids::FleetId)> = state
            .fleets_owned_by(house_id)
            .flat_map(|fleet| {
                fleet
                    .squadrons
                    .iter()
                    .filter(|sq| !sq.is_destroyed() && sq.flagship.class.is_planet_breaker())
                    .map(move |sq| (sq.id, fleet.id))
            })
            .collect();
        breaker_squadrons.sort_by_key(|(sq_id, _)| sq_id.raw());

        let count = breaker_squadrons.len() as u32;
        if let Some(house) = state.houses.get_mut(&house_id) {
            house.planet_breaker_count = count;
        }
        if count <= colony_count {
            continue;
        }

        let excess = (count - colony_count) as usize;
        for (squadron_id, fleet_id) in breaker_squadrons.into_iter().take(excess) {
            if let Some(fleet) = state.fleets.get_mut(&fleet_id) {
                fleet.squadrons.retain(|sq| sq.id != squadron_id);
            }
            report.planet_breakers_scrapped += 1;
            log.push(
                turn,
                Phase::Maintenance,
                EventKind::SquadronScrapped { squadron: squadron_id, owner: house_id },
            );
        }
        if let Some(house) = state.houses.get_mut(&house_id) {
            house.planet_breaker_count = colony_count;
        }
        log.push(
            turn,
            Phase::Maintenance,
            EventKind::CapacityEnforced { colony: ColonyId::from_raw(0), excess: excess as u32, salvaged: 0 },
        );
    }
}

/// Fighter squadrons accumulate at a colony until full (§3.2); beyond
/// `config.capacity.fighter_cap`, excess ships get `fighter_grace_period_turns`
/// to be loaded onto a carrier or otherwise resolved before the oldest
/// overflow is auto-disbanded for `fighter_partial_salvage_pct` of build
/// cost (§4.8).
fn enforce_fighter_cap(state: &mut GameState, config: &Config, log: &mut EventLog, report: &mut CapacityReport) {
    let turn = state.turn;
    let colony_ids: Vec<_> = state.colonies.keys().copied().collect();

    for colony_id in colony_ids {
        let Some(colony) = state.colonies.get_mut(&colony_id) else { continue };
        let cap = config.capacity.fighter_cap(colony.infrastructure);
        let total: u32 = colony.fighter_squadrons.iter().map(|sq| sq.ship_count).sum();

        if total <= cap {
            colony.fighter_overflow_turns = 0;
            continue;
        }

        colony.fighter_overflow_turns += 1;
        if colony.fighter_overflow_turns < config.capacity.fighter_grace_period_turns {
            continue;
        }

        let mut excess = total - cap;
        let mut salvaged = 0u32;
        while excess > 0 {
            let Some(last) = colony.fighter_squadrons.last_mut() else { break };
            let reduce = excess.min(last.ship_count);
            last.ship_count -= reduce;
            excess -= reduce;
            salvaged += reduce * config.capacity.fighter_partial_salvage_pct / 100;
            if last.ship_count == 0 {
                colony.fighter_squadrons.pop();
            }
        }
        colony.fighter_overflow_turns = 0;
        report.fighter_overflow_salvaged += total - cap - excess;

        log.push(
            turn,
            Phase::Maintenance,
            EventKind::CapacityEnforced { colony: colony_id, excess: total - cap, salvaged },
        );
    }
}

/// Runs once per turn, in this fixed order, during the Maintenance Phase.
pub fn enforce_capacities(state: &mut GameState, config: &Config, log: &mut EventLog) -> CapacityReport {
    let mut report = CapacityReport::default();
    enforce_hangar_capacity(state, config, log, &mut report);
    enforce_planet_breaker_cap(state, log, &mut report);
    enforce_fighter_cap(state, config, log, &mut report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::{Colony, PlanetaryFighterSquadron};
    use ec4x_common::entities::fleet::Fleet;
    use ec4x_common::entities::house::House;
    use ec4x_common::entities::ship::{Ship, ShipClass};
    use ec4x_common::entities::squadron::{Squadron, SquadronType};
    use ec4x_common::ids::{ColonyId, FleetId, HouseId, ShipId, SquadronId, SystemId};
    use std::collections::BTreeMap;

    #[test]
    fn fighter_overflow_is_untouched_until_grace_period_elapses() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let mut colony = Colony::new(ColonyId::from_raw(0), SystemId::from_raw(0), HouseId::from_raw(0));
        colony.infrastructure = 0;
        colony.fighter_squadrons.push(PlanetaryFighterSquadron { ship_count: 100 });
        state.insert_colony(colony);

        let mut log = EventLog::new();
        for _ in 0..config.capacity.fighter_grace_period_turns - 1 {
            enforce_capacities(&mut state, &config, &mut log);
        }
        let remaining: u32 = state
            .colony(ColonyId::from_raw(0))
            .unwrap()
            .fighter_squadrons
            .iter()
            .map(|sq| sq.ship_count)
            .sum();
        assert_eq!(remaining, 100);

        let report = enforce_capacities(&mut state, &config, &mut log);
        assert!(report.fighter_overflow_salvaged > 0);
        let remaining: u32 = state
            .colony(ColonyId::from_raw(0))
            .unwrap()
            .fighter_squadrons
            .iter()
            .map(|sq| sq.ship_count)
            .sum();
        assert!(remaining <= config.capacity.fighter_cap(0));
    }

    #[test]
    fn planet_breaker_excess_scraps_lowest_squadron_id_first() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let owner = HouseId::from_raw(0);
        let system = SystemId::from_raw(0);
        state.insert_house(House::new(owner, 0));
        // Only one colony remains, but two planet-breaker squadrons exist.
        state.insert_colony(Colony::new(ColonyId::from_raw(0), system, owner));

        let mut fleet = Fleet::new(FleetId::from_raw(0), owner, system);
        for raw in [0u32, 1u32] {
            let ship = Ship::new(ShipId::from_raw(raw), ShipClass::PlanetBreaker, 0, owner);
            let squadron = Squadron::new(SquadronId::from_raw(raw), ship, owner, system, SquadronType::Combat);
            fleet.squadrons.push(squadron);
        }
        state.insert_fleet(fleet);

        let mut log = EventLog::new();
        let report = enforce_capacities(&mut state, &config, &mut log);

        assert_eq!(report.planet_breakers_scrapped, 1);
        let fleet = state.fleet(FleetId::from_raw(0)).unwrap();
        assert_eq!(fleet.squadrons.len(), 1);
        assert_eq!(fleet.squadrons[0].id, SquadronId::from_raw(1));
    }
}
