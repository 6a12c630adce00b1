//! Terraforming requests and queue advancement (§4.1 Maintenance Phase
//! "advance terraforming", listed as its own step, distinct from facility/
//! colony construction queues and repair queues).
//!
//! Requested as a zero-turn admin command, paid up front like a build
//! order, then advanced one colony-wide project at a time during the
//! Maintenance Phase until it completes and credits infrastructure.

use ec4x_common::config::Config;
use ec4x_common::entities::colony::TerraformProject;
use ec4x_common::entities::house::TechField;
use ec4x_common::errors::OrderRejectReason;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::{ColonyId, HouseId};
use ec4x_common::store::GameState;

/// Requests a terraforming project at a colony owned by `house`. Only one
/// project may be active per colony at a time.
pub fn request_terraform(
    state: &mut GameState,
    config: &Config,
    house: HouseId,
    colony_id: ColonyId,
    log: &mut EventLog,
) -> Result<(), OrderRejectReason> {
    let colony = state.colony(colony_id).ok_or(OrderRejectReason::UnknownColony(colony_id))?;
    if colony.owner != house {
        return Err(OrderRejectReason::ColonyNotOwnedByHouse { colony: colony_id, house });
    }
    if colony.terraform_project.is_some() {
        return Err(OrderRejectReason::ProjectNotFound);
    }

    let cost = config.economy.terraform_cost;
    let treasury = state.houses.get(&house).map(|h| h.treasury).unwrap_or(0);
    if treasury < cost {
        return Err(OrderRejectReason::InsufficientTreasury { required: cost, available: treasury });
    }

    let level = state.houses.get(&house).map(|h| h.tech.level(TechField::Terraforming)).unwrap_or(0);
    let multiplier = config.tech.entry(TechField::Terraforming, level).map(|e| e.multiplier).unwrap_or(1.0);
    let bonus = (config.economy.terraform_infrastructure_bonus as f64 * multiplier) as u32;

    if let Some(h) = state.houses.get_mut(&house) {
        h.treasury -= cost;
    }
    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.terraform_project = Some(TerraformProject {
            turns_remaining: config.economy.terraform_turns,
            infrastructure_bonus: bonus,
        });
    }
    log.push(state.turn, Phase::Command, EventKind::TerraformStarted { colony: colony_id });
    Ok(())
}

/// Advances every colony's in-flight terraforming project by one turn
/// (§4.1 Maintenance Phase), crediting infrastructure on completion.
pub fn advance_terraforming(state: &mut GameState, _config: &Config, log: &mut EventLog) {
    let turn = state.turn;
    let colony_ids: Vec<ColonyId> = state.colonies.keys().copied().collect();

    for colony_id in colony_ids {
        let Some(colony) = state.colonies.get_mut(&colony_id) else { continue };
        let Some(project) = colony.terraform_project.as_mut() else { continue };
        project.advance_one_turn();
        if !project.is_complete() {
            continue;
        }
        let bonus = project.infrastructure_bonus;
        colony.infrastructure += bonus;
        colony.terraform_project = None;
        log.push(turn, Phase::Maintenance, EventKind::TerraformCompleted { colony: colony_id, infrastructure_gained: bonus });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::Colony;
    use ec4x_common::entities::house::House;
    use ec4x_common::ids::SystemId;
    use std::collections::BTreeMap;

    fn setup() -> (GameState, HouseId, ColonyId) {
        let mut state = GameState::new(1, BTreeMap::new());
        let owner = HouseId::from_raw(0);
        state.insert_house(House::new(owner, 10_000));
        let colony_id = ColonyId::from_raw(0);
        let colony = Colony::new(colony_id, SystemId::from_raw(0), owner);
        state.insert_colony(colony);
        (state, owner, colony_id)
    }

    #[test]
    fn terraform_completes_and_credits_infrastructure_after_configured_turns() {
        let config = test_config();
        let (mut state, owner, colony_id) = setup();
        let mut log = EventLog::new();
        let starting_treasury = state.houses[&owner].treasury;

        request_terraform(&mut state, &config, owner, colony_id, &mut log).unwrap();
        assert_eq!(state.houses[&owner].treasury, starting_treasury - config.economy.terraform_cost);

        let starting_infra = state.colonies[&colony_id].infrastructure;
        for _ in 0..config.economy.terraform_turns {
            assert!(state.colonies[&colony_id].terraform_project.is_some());
            advance_terraforming(&mut state, &config, &mut log);
        }

        let colony = &state.colonies[&colony_id];
        assert!(colony.terraform_project.is_none());
        assert!(colony.infrastructure > starting_infra);
    }

    #[test]
    fn a_second_terraform_request_is_rejected_while_one_is_in_flight() {
        let config = test_config();
        let (mut state, owner, colony_id) = setup();
        let mut log = EventLog::new();

        request_terraform(&mut state, &config, owner, colony_id, &mut log).unwrap();
        let result = request_terraform(&mut state, &config, owner, colony_id, &mut log);
        assert!(result.is_err());
    }

    #[test]
    fn terraform_is_rejected_without_sufficient_treasury() {
        let config = test_config();
        let (mut state, owner, colony_id) = setup();
        state.houses.get_mut(&owner).unwrap().treasury = 0;
        let mut log = EventLog::new();

        let result = request_terraform(&mut state, &config, owner, colony_id, &mut log);
        assert!(matches!(result, Err(OrderRejectReason::InsufficientTreasury { .. })));
    }
}
