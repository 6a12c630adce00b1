//! Ground invasion (§4.7): landed marine/army strength against a
//! colony's ground batteries and shield, resolved as a single strength
//! comparison rather than round-by-round (ground combat has no retreat
//! and no crippled state). Invasion prestige is zero-sum - the attacker's
//! gain equals the defender's loss (§4.10, §8 Prestige zero-sum
//! property).

use rand::Rng;

use ec4x_common::config::Config;
use ec4x_common::entities::prestige::PrestigeSource;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{ColonyId, HouseId};
use ec4x_common::rng::{RngService, Subsystem};
use ec4x_common::store::GameState;

fn defender_strength(config: &Config, colony: &ec4x_common::entities::Colony) -> u32 {
    let gf = &colony.ground_forces;
    gf.marine_divisions * config.ground_units.marines.combat_strength
        + gf.army_divisions * config.ground_units.army.combat_strength
        + gf.ground_batteries * config.ground_units.ground_battery.combat_strength
        + gf.planetary_shield_level * 20
}

/// `attacker_troop_strength` is computed by the caller from embarked
/// marine/army cargo on the invading fleet's troop transports (§3.2
/// cargo model); this function only resolves the strength comparison and
/// applies the outcome.
pub fn resolve_invasion(
    state: &mut GameState,
    config: &Config,
    rng_service: &RngService,
    attacker: HouseId,
    colony_id: ColonyId,
    attacker_troop_strength: u32,
    log: &mut EventLog,
) -> bool {
    let turn = state.turn;
    let Some(colony) = state.colonies.get(&colony_id) else { return false };
    let defender = colony.owner;
    let defense = defender_strength(config, colony);

    let mut rng = rng_service.subsystem_stream(turn, Subsystem::Combat);
    let roll_bonus = rng.gen_range(0..=20) as i64;
    let attacker_total = attacker_troop_strength as i64 + roll_bonus;

    let success = attacker_total > defense as i64;

    if success {
        let _ = state.transfer_colony_owner(colony_id, attacker);
        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            colony.ground_forces = Default::default();
        }
        let gain = config.prestige.amount_for(PrestigeSource::Invasion);
        if let Some(h) = state.houses.get_mut(&attacker) {
            h.prestige_total += gain;
        }
        if let Some(h) = state.houses.get_mut(&defender) {
            h.prestige_total -= gain;
        }
        log.push(
            turn,
            Phase::Conflict,
            EventKind::ColonyConquered { colony: colony_id, from: defender, to: attacker },
        );
        log.push(
            turn,
            Phase::Conflict,
            EventKind::PrestigeAwarded { house: attacker, source: PrestigeSource::Invasion, amount: gain },
        );
        log.push(
            turn,
            Phase::Conflict,
            EventKind::PrestigePenalized { house: defender, source: PrestigeSource::Invasion, amount: gain },
        );
    } else if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.ground_forces.marine_divisions = colony.ground_forces.marine_divisions.saturating_sub(1);
    }

    success
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::Colony;
    use ec4x_common::ids::SystemId;
    use std::collections::BTreeMap;

    #[test]
    fn overwhelming_attacker_strength_always_conquers_an_undefended_colony() {
        let config = test_config();
        let mut state = GameState::new(11, BTreeMap::new());
        let defender = HouseId::from_raw(0);
        let attacker = HouseId::from_raw(1);
        let colony = Colony::new(ColonyId::from_raw(0), SystemId::from_raw(0), defender);
        state.insert_colony(colony);

        let rng_service = RngService::new(state.seed);
        let mut log = EventLog::new();
        let success = resolve_invasion(&mut state, &config, &rng_service, attacker, ColonyId::from_raw(0), 10_000, &mut log);

        assert!(success);
        assert_eq!(state.colony(ColonyId::from_raw(0)).unwrap().owner, attacker);
    }
}
