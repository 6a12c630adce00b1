//! Passive scouting (§4.9): opposed stealth-vs-sensor rolls between a
//! scout's cloak (`Clk`) tech and the defending house's electronic
//! intelligence (`Eli`) tech, with a bonus for mesh-network coverage -
//! multiple friendly scouts at adjacent systems raise detection odds for
//! everyone in the mesh rather than each scout rolling independently.

use rand::Rng;

use ec4x_common::config::Config;
use ec4x_common::entities::house::TechField;
use ec4x_common::entities::intel_report::{Confidence, IntelSubject, IntelligenceReport, ObservedColonyFacts};
use ec4x_common::ids::{HouseId, SystemId};
use ec4x_common::rng::{RngService, Subsystem};
use ec4x_common::store::GameState;

/// Counts the viewer's own scout ships present at the target system or
/// one of its immediate neighbors - the mesh a scout commander would
/// actually be relying on for cross-cued sensor data.
fn scouts_in_mesh(state: &GameState, viewer: HouseId, target: SystemId) -> u32 {
    let Some(system) = state.system(target) else { return 0 };
    let mut systems: Vec<SystemId> = system.neighbors().collect();
    systems.push(target);
    systems
        .iter()
        .flat_map(|s| state.fleets_at(*s))
        .filter(|f| f.owner == viewer)
        .flat_map(|f| f.all_ships())
        .filter(|s| s.is_alive() && s.class.is_scout())
        .count() as u32
}

/// Mesh-network coverage bonus (§4.4): +1 at 2-3 coalesced scouts, +2 at
/// 4-5, +3 at 6+. A lone scout gets no bonus — the mesh needs at least a
/// second set of eyes to cross-cue.
fn mesh_bonus(state: &GameState, viewer: HouseId, target: SystemId) -> u32 {
    match scouts_in_mesh(state, viewer, target) {
        0..=1 => 0,
        2..=3 => 1,
        4..=5 => 2,
        _ => 3,
    }
}

/// Produces a fresh `IntelligenceReport` on `target` for `viewer`, or
/// `None` if the opposed roll fails to pierce the subject's stealth.
pub fn scout_system(
    state: &GameState,
    config: &Config,
    rng_service: &RngService,
    viewer: HouseId,
    target: SystemId,
) -> Option<IntelligenceReport> {
    let turn = state.turn;
    let colony = state.colony_at(target);
    let Some(defender) = colony.map(|c| c.owner) else {
        return Some(IntelligenceReport {
            viewing_house: viewer,
            subject: IntelSubject::System(target),
            freshness_turn: turn,
            confidence: Confidence::Verified,
            observed_fleet_strength: Some(fleet_strength_at(state, config, target)),
            colony: None,
        });
    };

    let viewer_eli = state.house(viewer).map(|h| h.tech.level(TechField::Eli)).unwrap_or(0);
    let defender_clk = state.house(defender).map(|h| h.tech.level(TechField::Clk)).unwrap_or(0);

    let mut rng = rng_service.subsystem_stream(turn, Subsystem::Detection);
    let roll = rng.gen_range(1..=20) + mesh_bonus(state, viewer, target) as i32;
    let threshold = 10 + defender_clk as i32 - viewer_eli as i32;

    if roll < threshold {
        return None;
    }

    let colony = colony.unwrap();
    let facts = ObservedColonyFacts {
        owner: Some(defender),
        approx_population: Some(colony.population_souls),
        approx_infrastructure: Some(colony.infrastructure),
        starbase_count: Some(colony.kastra.len() as u32),
        drydock_count: Some(colony.neoria.len() as u32),
    };

    Some(IntelligenceReport {
        viewing_house: viewer,
        subject: IntelSubject::System(target),
        freshness_turn: turn,
        confidence: Confidence::Fresh,
        observed_fleet_strength: Some(fleet_strength_at(state, config, target)),
        colony: Some((colony.id, facts)),
    })
}

fn fleet_strength_at(state: &GameState, config: &Config, system: SystemId) -> u64 {
    state
        .fleets_at(system)
        .flat_map(|f| f.all_ships())
        .filter_map(|s| config.ships.spec(s.class).map(|spec| spec.combat_strength as u64))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use std::collections::BTreeMap;

    #[test]
    fn scouting_an_empty_system_always_succeeds() {
        let config = test_config();
        let state = GameState::new(5, BTreeMap::new());
        let rng_service = RngService::new(state.seed);
        let report = scout_system(&state, &config, &rng_service, HouseId::from_raw(0), SystemId::from_raw(0));
        assert!(report.is_some());
    }
}
