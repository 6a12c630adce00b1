//! Public engine API (§6.1): `new_game`, `resolve_turn`, `filtered_view`,
//! and `is_game_over` are the only entry points a caller outside this
//! crate needs - everything else here is an implementation detail of the
//! turn pipeline, kept public only so the subsystem crates can be tested
//! and composed independently.

pub mod orchestrator;
pub mod packets;
pub mod victory;

use std::collections::{BTreeMap, BTreeSet};

use ec4x_common::config::Config;
use ec4x_common::entities::house::House;
use ec4x_common::entities::system::System;
use ec4x_common::entities::Colony;
use ec4x_common::errors::EngineError;
use ec4x_common::events::EventEnvelope;
use ec4x_common::ids::{ColonyId, HouseId, SystemId};
use ec4x_common::store::GameState;

pub use ec4x_intel::fow::FilteredGameState;
pub use packets::{
    AdminCommand, BuildCommand, CommandPacket, DiplomaticOrder, EspionageOrder, FleetCommand,
    ResearchAllocation, StandingOrderUpdate,
};
pub use victory::VictoryKind;

/// Builds a fresh game: validates `config`, then seeds one house per
/// entry in `house_ids` at a distinct system drawn from `starmap`
/// (lowest system id first) with a starting homeworld colony (§6.1
/// `newGame`, §3.2 House/Colony lifecycle).
pub fn new_game(
    config: &Config,
    seed: u64,
    starmap: BTreeMap<SystemId, System>,
    house_ids: &[HouseId],
) -> Result<GameState, EngineError> {
    config.validate()?;

    if starmap.len() < house_ids.len() {
        return Err(EngineError::InsufficientStarmap { houses: house_ids.len(), systems: starmap.len() });
    }

    let mut seen = BTreeSet::new();
    for id in house_ids {
        if !seen.insert(*id) {
            return Err(EngineError::DuplicateHouse(*id));
        }
    }

    let mut system_ids: Vec<SystemId> = starmap.keys().copied().collect();
    system_ids.sort_by_key(|id| id.raw());

    let mut state = GameState::new(seed, starmap);

    for (index, house_id) in house_ids.iter().enumerate() {
        state.insert_house(House::new(*house_id, config.economy.starting_treasury));

        let system = system_ids[index];
        let colony_id = ColonyId::from_raw(state.allocators.colony.alloc());
        let mut colony = Colony::new(colony_id, system, *house_id);
        colony.infrastructure = config.economy.starting_infrastructure;
        colony.industrial_units = config.economy.starting_industrial_units;
        colony.population_souls = config.economy.starting_population_souls;
        colony.population_units = (colony.population_souls / 1_000_000).max(1) as u32;
        state.insert_colony(colony);
    }

    Ok(state)
}

/// Resolves one full turn and returns its event log (§6.1
/// `resolveTurn`). `state` is mutated in place; the orchestrator never
/// partially applies a turn or returns an error - a rejected order
/// simply surfaces as an `OrderRejected` event for that house.
pub fn resolve_turn(state: &mut GameState, config: &Config, packets: &[CommandPacket]) -> Vec<EventEnvelope> {
    orchestrator::resolve_turn(state, config, packets).into_events()
}

/// Derives the view `house` is authorized to see this turn (§6.1
/// `filteredView`, §4.9/§4.11 fog of war).
pub fn filtered_view(state: &GameState, house: HouseId) -> FilteredGameState {
    ec4x_intel::derive_filtered_view(state, house)
}

/// `None` while the game continues; `Some((winner, kind))` once a
/// victory condition has been met (§6.1 `isGameOver`).
pub fn is_game_over(state: &GameState, config: &Config) -> Option<(HouseId, VictoryKind)> {
    victory::check_victory(state, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::system::{HexCoord, PlanetClass};

    fn sample_starmap(count: u64) -> BTreeMap<SystemId, System> {
        (0..count)
            .map(|raw| {
                let id = SystemId::from_raw(raw);
                (
                    id,
                    System {
                        id,
                        coord: HexCoord::new(raw as i32, 0),
                        ring_index: raw as u32,
                        planet_class: PlanetClass::Terran,
                        resource_rating: 10,
                        adjacency: Vec::new(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn new_game_seeds_one_homeworld_colony_per_house() {
        let config = test_config();
        let houses = [HouseId::from_raw(0), HouseId::from_raw(1)];
        let state = new_game(&config, 7, sample_starmap(4), &houses).unwrap();

        assert_eq!(state.houses.len(), 2);
        assert_eq!(state.colonies.len(), 2);
        for house in houses {
            assert_eq!(state.colonies_owned_by(house).count(), 1);
        }
    }

    #[test]
    fn new_game_refuses_a_starmap_too_small_for_the_house_count() {
        let config = test_config();
        let houses = [HouseId::from_raw(0), HouseId::from_raw(1), HouseId::from_raw(2)];
        let result = new_game(&config, 7, sample_starmap(2), &houses);
        assert!(matches!(result, Err(EngineError::InsufficientStarmap { houses: 3, systems: 2 })));
    }

    #[test]
    fn new_game_refuses_duplicate_house_ids() {
        let config = test_config();
        let houses = [HouseId::from_raw(0), HouseId::from_raw(0)];
        let result = new_game(&config, 7, sample_starmap(4), &houses);
        assert!(matches!(result, Err(EngineError::DuplicateHouse(_))));
    }

    #[test]
    fn is_game_over_is_none_for_a_freshly_created_game() {
        let config = test_config();
        let houses = [HouseId::from_raw(0), HouseId::from_raw(1)];
        let state = new_game(&config, 7, sample_starmap(4), &houses).unwrap();
        assert_eq!(is_game_over(&state, &config), None);
    }

    #[test]
    fn resolve_turn_advances_the_turn_counter_without_panicking() {
        let config = test_config();
        let houses = [HouseId::from_raw(0)];
        let mut state = new_game(&config, 7, sample_starmap(2), &houses).unwrap();
        let events = resolve_turn(&mut state, &config, &[]);
        assert_eq!(state.turn, 1);
        assert!(events.iter().all(|e| e.turn <= 1));
    }
}
