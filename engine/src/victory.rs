//! Victory determination (§6.1 `isGameOver`): prestige threshold,
//! last-standing elimination, or turn-limit leader.

use serde::{Deserialize, Serialize};

use ec4x_common::config::Config;
use ec4x_common::ids::HouseId;
use ec4x_common::store::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryKind {
    PrestigeThreshold,
    LastStanding,
    TurnLimit,
}

/// Checked once per turn, at the end of the Conflict Phase. Prestige
/// threshold takes priority over last-standing, which takes priority over
/// the turn-limit fallback — a house that both clears the threshold and is
/// the sole survivor still wins by prestige, since that is the condition
/// that was satisfied first in this ordering.
pub fn check_victory(state: &GameState, config: &Config) -> Option<(HouseId, VictoryKind)> {
    let mut house_ids: Vec<HouseId> = state.houses.keys().copied().collect();
    house_ids.sort_by_key(|h| h.raw());

    let leader_by_prestige = house_ids
        .iter()
        .filter(|id| state.houses.get(id).map(|h| h.is_active()).unwrap_or(false))
        .max_by_key(|id| state.houses.get(id).map(|h| h.prestige_total).unwrap_or(i64::MIN))
        .copied();

    if let Some(leader) = leader_by_prestige {
        let prestige = state.houses.get(&leader).map(|h| h.prestige_total).unwrap_or(0);
        if prestige >= config.prestige.victory_prestige_threshold {
            return Some((leader, VictoryKind::PrestigeThreshold));
        }
    }

    let active: Vec<HouseId> = house_ids
        .iter()
        .copied()
        .filter(|id| state.houses.get(id).map(|h| h.is_active()).unwrap_or(false))
        .collect();
    if house_ids.len() > 1 && active.len() == 1 {
        return Some((active[0], VictoryKind::LastStanding));
    }

    if state.turn >= config.victory_turn_limit {
        if let Some(leader) = leader_by_prestige {
            return Some((leader, VictoryKind::TurnLimit));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::house::House;
    use std::collections::BTreeMap;

    #[test]
    fn a_house_clearing_the_prestige_threshold_wins() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let mut house = House::new(HouseId::from_raw(0), 0);
        house.prestige_total = config.prestige.victory_prestige_threshold + 1;
        state.insert_house(house);
        state.insert_house(House::new(HouseId::from_raw(1), 0));

        let result = check_victory(&state, &config);
        assert_eq!(result, Some((HouseId::from_raw(0), VictoryKind::PrestigeThreshold)));
    }

    #[test]
    fn a_single_surviving_house_among_several_wins_by_last_standing() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        state.insert_house(House::new(HouseId::from_raw(0), 0));
        let mut eliminated = House::new(HouseId::from_raw(1), 0);
        eliminated.eliminate(3);
        state.insert_house(eliminated);

        let result = check_victory(&state, &config);
        assert_eq!(result, Some((HouseId::from_raw(0), VictoryKind::LastStanding)));
    }

    #[test]
    fn no_victory_before_any_condition_is_met() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        state.insert_house(House::new(HouseId::from_raw(0), 0));
        state.insert_house(House::new(HouseId::from_raw(1), 0));

        assert_eq!(check_victory(&state, &config), None);
    }
}
