//! Maintenance Phase (§4.1 step 1): pay upkeep on every ship, facility,
//! and starbase out of the treasury *before* this turn's Income Phase
//! credits anything, so a house can genuinely run dry (§4.14 [EXPANSION]).

use ec4x_common::config::Config;
use ec4x_common::entities::fleet::FleetStatus;
use ec4x_common::entities::house::HouseStatus;
use ec4x_common::entities::prestige::PrestigeSource;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::store::GameState;

fn fleet_upkeep(config: &Config, fleet: &ec4x_common::entities::Fleet) -> i64 {
    let pct = match fleet.status {
        FleetStatus::Active => 100,
        FleetStatus::Reserve => config.economy.reserve_maintenance_pct,
        FleetStatus::Mothballed => config.economy.mothball_maintenance_pct,
    };
    let mut total = 0i64;
    for squadron in &fleet.squadrons {
        for ship in squadron.ships() {
            if let Some(spec) = config.ships.spec(ship.class) {
                total += spec.maintenance * pct as i64 / 100;
            }
        }
    }
    for ship in &fleet.spacelift {
        if let Some(spec) = config.ships.spec(ship.class) {
            total += spec.maintenance * pct as i64 / 100;
        }
    }
    total
}

fn facility_upkeep(config: &Config, state: &GameState, colony: &ec4x_common::entities::Colony) -> i64 {
    let mut total = 0i64;
    for neoria_id in &colony.neoria {
        if let Some(neoria) = state.neoria.get(neoria_id) {
            let spec = match neoria.kind {
                ec4x_common::entities::neoria::NeoriaKind::Spaceport => &config.facilities.spaceport,
                ec4x_common::entities::neoria::NeoriaKind::Shipyard => &config.facilities.shipyard,
                ec4x_common::entities::neoria::NeoriaKind::Drydock => &config.facilities.drydock,
            };
            total += spec.maintenance;
        }
    }
    for kastra_id in &colony.kastra {
        if state.kastra.contains_key(kastra_id) {
            total += config.facilities.starbase.maintenance;
        }
    }
    total
}

/// Runs once per house per turn. A house that cannot cover its bill goes
/// into shortfall: `consecutive_shortfall_turns` increments and a prestige
/// penalty is logged; sustained shortfall trips `DefensiveCollapse`
/// (§4.10).
pub fn run_maintenance_phase(state: &mut GameState, config: &Config, log: &mut EventLog) {
    let turn = state.turn;
    let house_ids: Vec<_> = state.houses.keys().copied().collect();

    for house_id in house_ids {
        if !state.houses.get(&house_id).map(|h| h.is_active()).unwrap_or(false) {
            continue;
        }

        let mut bill = 0i64;
        for fleet in state.fleets_owned_by(house_id) {
            bill += fleet_upkeep(config, fleet);
        }
        let colonies: Vec<_> = state.colonies_owned_by(house_id).map(|c| c.id).collect();
        for colony_id in &colonies {
            if let Some(colony) = state.colonies.get(colony_id) {
                bill += facility_upkeep(config, state, colony);
            }
        }

        let house = state.houses.get_mut(&house_id).expect("house listed above must exist");
        if house.treasury >= bill {
            house.treasury -= bill;
            house.consecutive_shortfall_turns = 0;
        } else {
            house.treasury = 0;
            house.consecutive_shortfall_turns += 1;
            let penalty = config.economy.shortfall_prestige_penalty;
            house.prestige_total -= penalty;
            log.push(
                turn,
                Phase::Maintenance,
                EventKind::PrestigePenalized {
                    house: house_id,
                    source: PrestigeSource::MaintenanceShortfall,
                    amount: penalty,
                },
            );
            if house.consecutive_shortfall_turns >= config.economy.shortfall_collapse_threshold_turns {
                house.status = HouseStatus::DefensiveCollapse;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::house::House;
    use ec4x_common::ids::HouseId;
    use std::collections::BTreeMap;

    #[test]
    fn shortfall_is_recorded_and_drains_treasury_to_zero() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let mut house = House::new(HouseId::from_raw(0), 0);
        house.treasury = 0;
        state.insert_house(house);
        let mut log = EventLog::new();

        run_maintenance_phase(&mut state, &config, &mut log);

        let house = state.house(HouseId::from_raw(0)).unwrap();
        assert_eq!(house.treasury, 0);
        assert_eq!(house.consecutive_shortfall_turns, 1);
    }

    #[test]
    fn sufficient_treasury_pays_bill_without_penalty() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let house = House::new(HouseId::from_raw(0), 1_000_000);
        state.insert_house(house);
        let mut log = EventLog::new();

        run_maintenance_phase(&mut state, &config, &mut log);

        let house = state.house(HouseId::from_raw(0)).unwrap();
        assert_eq!(house.consecutive_shortfall_turns, 0);
        assert!(house.treasury <= 1_000_000);
    }
}
