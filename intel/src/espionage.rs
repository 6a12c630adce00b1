//! Data-driven espionage mission execution (§4.9): every
//! [`EspionageAction`] is resolved by the same function, keyed entirely
//! on `config.espionage`, rather than one match arm per mission - adding
//! a new mission kind only ever touches the config fixture, never this
//! code.

use rand::Rng;

use ec4x_common::config::Config;
use ec4x_common::entities::intel_report::{Confidence, IntelSubject, IntelligenceReport, ObservedColonyFacts};
use ec4x_common::entities::prestige::PrestigeSource;
use ec4x_common::espionage_kinds::EspionageAction;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::HouseId;
use ec4x_common::rng::{RngService, Subsystem};
use ec4x_common::store::GameState;

pub struct MissionOutcome {
    pub success: bool,
    pub detected: bool,
    pub damage_rolled: Option<u32>,
    pub srp_stolen: u32,
    pub intel_gained: bool,
}

/// Spends the acting house's EBP, rolls success against the target's CIC
/// detection threshold, and applies the mission's configured payload.
/// Detection inverts a would-be success to failure (§4.9 "detected
/// outcomes invert to failure") - only an undetected mission that also
/// clears its success roll applies the success payload. The detection
/// penalty lands on the attacker only; the target's prestige is
/// unaffected by a failed, detected mission.
pub fn execute_mission(
    state: &mut GameState,
    config: &Config,
    rng_service: &RngService,
    acting_house: HouseId,
    target_house: HouseId,
    action: EspionageAction,
    log: &mut EventLog,
) -> Option<MissionOutcome> {
    let turn = state.turn;
    let spec = config.espionage.spec(action)?;

    let available_ebp = state.houses.get(&acting_house).map(|h| h.ebp).unwrap_or(0);
    if available_ebp < spec.ebp_cost {
        return None;
    }
    if let Some(house) = state.houses.get_mut(&acting_house) {
        house.ebp -= spec.ebp_cost;
    }

    let target_cic = state
        .houses
        .get(&target_house)
        .map(|h| h.tech.level(ec4x_common::entities::house::TechField::Cic))
        .unwrap_or(0);
    let detection_threshold = config.espionage.detection_threshold(target_cic);

    let mut rng = rng_service.subsystem_stream(turn, Subsystem::Espionage);
    let success_roll = rng.gen_range(1..=20);

    let mut detect_rng = rng_service.subsystem_stream(turn, Subsystem::Detection);
    let detection_roll = detect_rng.gen_range(1..=20u32);
    let detected = detection_roll >= detection_threshold;

    // A detected mission inverts to failure regardless of its own roll.
    let success = !detected && success_roll >= 10;

    let damage_rolled = if success {
        spec.damage_dice.map(|(n, sides)| (0..n).map(|_| rng.gen_range(1..=sides)).sum())
    } else {
        None
    };

    let mut srp_stolen = 0u32;
    let mut intel_gained = false;

    if success {
        if let Some(damage) = damage_rolled {
            if spec.damages_iu {
                apply_industrial_damage(state, target_house, damage);
            }
            if spec.steals_srp {
                srp_stolen = steal_treasury(state, acting_house, target_house, damage as i64);
            }
        }
        if spec.grants_intel {
            intel_gained = grant_colony_intel(state, turn, acting_house, target_house);
        }
        // Zero-sum on success (§4.10): the attacker's gain is the target's
        // loss, not conjured from nowhere.
        let gain = spec.prestige_on_success;
        if let Some(h) = state.houses.get_mut(&acting_house) {
            h.prestige_total += gain;
        }
        if let Some(h) = state.houses.get_mut(&target_house) {
            h.prestige_total -= gain;
        }
        log.push(
            turn,
            Phase::Conflict,
            EventKind::PrestigeAwarded { house: acting_house, source: PrestigeSource::EspionageSuccess, amount: gain },
        );
    }

    if detected {
        let penalty = spec.detection_penalty_on_failure;
        if let Some(h) = state.houses.get_mut(&acting_house) {
            h.prestige_total -= penalty;
        }
        log.push(
            turn,
            Phase::Conflict,
            EventKind::PrestigePenalized { house: acting_house, source: PrestigeSource::EspionageFailureDetected, amount: penalty },
        );
    }

    log.push(
        turn,
        Phase::Conflict,
        EventKind::EspionageExecuted { acting_house, target_house, action, success, detected },
    );

    Some(MissionOutcome { success, detected, damage_rolled, srp_stolen, intel_gained })
}

fn apply_industrial_damage(state: &mut GameState, target_house: HouseId, damage: u32) {
    let colony_ids: Vec<_> = state.colonies_owned_by(target_house).map(|c| c.id).collect();
    let Some(first) = colony_ids.into_iter().min_by_key(|id| id.raw()) else { return };
    if let Some(colony) = state.colonies.get_mut(&first) {
        colony.industrial_units = colony.industrial_units.saturating_sub(damage);
    }
}

/// Moves production points from the target's treasury to the attacker's,
/// capped by what the target actually has on hand - a theft can't put a
/// house's treasury negative.
fn steal_treasury(state: &mut GameState, acting_house: HouseId, target_house: HouseId, amount: i64) -> u32 {
    let target_treasury = state.houses.get(&target_house).map(|h| h.treasury).unwrap_or(0);
    let taken = amount.clamp(0, target_treasury.max(0));
    if taken == 0 {
        return 0;
    }
    if let Some(h) = state.houses.get_mut(&target_house) {
        h.treasury -= taken;
    }
    if let Some(h) = state.houses.get_mut(&acting_house) {
        h.treasury += taken;
    }
    taken as u32
}

/// Builds a fresh `IntelligenceReport` on the target house's
/// lowest-id colony for the acting house, the same colony-selection
/// convention `apply_industrial_damage` uses when an order names a house
/// rather than a specific colony (§6.2's espionage order carries no
/// colony target).
fn grant_colony_intel(state: &mut GameState, turn: u32, acting_house: HouseId, target_house: HouseId) -> bool {
    let colony_ids: Vec<_> = state.colonies_owned_by(target_house).map(|c| c.id).collect();
    let Some(first) = colony_ids.into_iter().min_by_key(|id| id.raw()) else { return false };
    let Some(colony) = state.colonies.get(&first) else { return false };

    let facts = ObservedColonyFacts {
        owner: Some(target_house),
        approx_population: Some(colony.population_souls),
        approx_infrastructure: Some(colony.infrastructure),
        starbase_count: Some(colony.kastra.len() as u32),
        drydock_count: Some(colony.neoria.len() as u32),
    };
    let system = colony.system;
    let colony_id = colony.id;

    state.record_intel_report(IntelligenceReport {
        viewing_house: acting_house,
        subject: IntelSubject::System(system),
        freshness_turn: turn,
        confidence: Confidence::Verified,
        observed_fleet_strength: None,
        colony: Some((colony_id, facts)),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::house::House;
    use std::collections::BTreeMap;

    #[test]
    fn mission_without_sufficient_ebp_is_refused() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let acting = HouseId::from_raw(0);
        let target = HouseId::from_raw(1);
        state.insert_house(House::new(acting, 0));
        state.insert_house(House::new(target, 0));

        let rng_service = RngService::new(state.seed);
        let mut log = EventLog::new();
        let outcome = execute_mission(&mut state, &config, &rng_service, acting, target, EspionageAction::SpyPlanet, &mut log);
        assert!(outcome.is_none());
    }

    #[test]
    fn mission_with_sufficient_ebp_spends_it_and_logs_an_event() {
        let config = test_config();
        let mut state = GameState::new(2, BTreeMap::new());
        let acting = HouseId::from_raw(0);
        let target = HouseId::from_raw(1);
        let mut acting_house = House::new(acting, 0);
        acting_house.ebp = 100;
        state.insert_house(acting_house);
        state.insert_house(House::new(target, 0));

        let rng_service = RngService::new(state.seed);
        let mut log = EventLog::new();
        let outcome = execute_mission(&mut state, &config, &rng_service, acting, target, EspionageAction::SpyPlanet, &mut log);
        assert!(outcome.is_some());
        assert!(log.as_slice().iter().any(|e| matches!(e.kind, EventKind::EspionageExecuted { .. })));
    }
}
