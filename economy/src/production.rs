//! Income Phase (§4.1 step 2): colony production, tax collection,
//! morale-driven population growth, and espionage budget accrual. Runs
//! after Maintenance, so this turn's income cannot be used to cover this
//! turn's upkeep bill (§4.14 [EXPANSION]).

use ec4x_common::config::Config;
use ec4x_common::entities::house::TechField;
use ec4x_common::entities::Colony;
use ec4x_common::events::EventLog;
use ec4x_common::store::GameState;

/// A blockaded colony produces nothing this turn; the flag is cleared
/// immediately so the blockading fleet must still hold station to renew
/// it next Conflict Phase (§4.7 Blockade).
fn gross_output(colony: &Colony) -> i64 {
    if colony.blockaded {
        return 0;
    }
    let base = colony.industrial_units as i64 * colony.infrastructure as i64 / 10;
    let damage_fraction = (100u32.saturating_sub(colony.damage.min(100))) as i64;
    base * damage_fraction / 100
}

fn apply_growth(config: &Config, colony: &mut Colony) {
    let morale_bonus = (colony.morale.max(-50) as f64 / 100.0).max(-0.5);
    let rate = (config.economy.base_growth_rate_pct as f64 / 100.0) + morale_bonus / 10.0;
    let growth = (colony.population_souls as f64 * rate.max(0.0)) as u64;
    colony.population_souls = colony.population_souls.saturating_add(growth);
    colony.population_units = (colony.population_souls / 1_000_000).max(1) as u32;
}

/// Runs once per colony, then once per house. Tax is collected at the
/// colony's effective rate (override or house default), credited to the
/// owning house, and next turn's morale delta is queued from the
/// tax-band table. Espionage budget then accrues per house, scaled by
/// its ELI tech level (§3.2, §4.9).
pub fn run_income_phase(state: &mut GameState, config: &Config, _log: &mut EventLog) {
    let colony_ids: Vec<_> = state.colonies.keys().copied().collect();

    for colony_id in colony_ids {
        let (owner, output, tax_rate) = {
            let colony = state.colonies.get(&colony_id).expect("listed above");
            let house_default = state.houses.get(&colony.owner).map(|h| h.tax_rate).unwrap_or(0);
            let tax_rate = colony.effective_tax_rate(house_default);
            (colony.owner, gross_output(colony), tax_rate)
        };

        let tax_revenue = output * tax_rate as i64 / 100;

        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            colony.production_capacity = output - tax_revenue;
            colony.blockaded = false;
            apply_growth(config, colony);
            let delta = config.economy.tax_morale_delta(tax_rate);
            colony.morale = (colony.morale + delta).clamp(-100, 100);
        }

        if let Some(house) = state.houses.get_mut(&owner) {
            house.treasury += tax_revenue;
        }
    }

    let house_ids: Vec<_> = state.houses.keys().copied().collect();
    for house_id in house_ids {
        if let Some(house) = state.houses.get_mut(&house_id) {
            let accrual = config.espionage.ebp_accrual(house.tech.level(TechField::Eli));
            house.ebp = house.ebp.saturating_add(accrual);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::house::House;
    use ec4x_common::ids::{ColonyId, HouseId, SystemId};
    use std::collections::BTreeMap;

    #[test]
    fn tax_revenue_is_credited_to_house_treasury() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let house_id = HouseId::from_raw(0);
        state.insert_house(House::new(house_id, 0));

        let mut colony = Colony::new(ColonyId::from_raw(0), SystemId::from_raw(0), house_id);
        colony.industrial_units = 100;
        colony.infrastructure = 50;
        colony.population_souls = 1_000_000;
        state.insert_colony(colony);

        let mut log = EventLog::new();
        run_income_phase(&mut state, &config, &mut log);

        let house = state.house(house_id).unwrap();
        assert!(house.treasury >= 0);
    }
}
