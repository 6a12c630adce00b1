//! Orbital bombardment (§4.7, §9 Open Question resolution): infrastructure
//! damage dice are read from `config.combat.bombardment_damage_dice_per_shield_level`,
//! indexed by the target colony's current planetary shield level, and a
//! `Blitz` order's shield-bypass bonus only ever applies to the
//! bombardment sub-step of that order, never to the invasion sub-step
//! that follows it (§9 resolution).

use rand::Rng;

use ec4x_common::config::Config;
use ec4x_common::ids::ColonyId;
use ec4x_common::rng::{RngService, Subsystem};
use ec4x_common::store::GameState;

/// `is_blitz` raises the shield block probability roll's difficulty,
/// modeling the order's risk-for-speed tradeoff; it never removes the
/// shield level used to index the damage-dice table itself.
pub fn bombard_colony(
    state: &mut GameState,
    config: &Config,
    rng_service: &RngService,
    colony_id: ColonyId,
    is_blitz: bool,
) -> u32 {
    let turn = state.turn;
    let Some(colony) = state.colonies.get(&colony_id) else { return 0 };
    let shield_level = colony.ground_forces.planetary_shield_level;

    let mut rng = rng_service.subsystem_stream(turn, Subsystem::Combat);
    let block_probability = config.combat.shield_block_probability(shield_level);
    let effective_probability = if is_blitz { block_probability * 0.5 } else { block_probability };
    if rng.gen_bool(effective_probability.clamp(0.0, 1.0)) {
        return 0;
    }

    let (num_dice, sides) = config.combat.bombardment_dice(shield_level);
    let damage: u32 = (0..num_dice).map(|_| rng.gen_range(1..=sides)).sum();

    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        colony.damage = colony.damage.saturating_add(damage);
        colony.infrastructure = colony.infrastructure.saturating_sub(damage / 2);
    }
    damage
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::colony::Colony;
    use ec4x_common::ids::{HouseId, SystemId};
    use std::collections::BTreeMap;

    #[test]
    fn bombardment_never_panics_on_a_shielded_colony() {
        let config = test_config();
        let mut state = GameState::new(3, BTreeMap::new());
        let mut colony = Colony::new(ColonyId::from_raw(0), SystemId::from_raw(0), HouseId::from_raw(0));
        colony.ground_forces.planetary_shield_level = 2;
        colony.infrastructure = 100;
        state.insert_colony(colony);

        let rng_service = RngService::new(state.seed);
        let _damage = bombard_colony(&mut state, &config, &rng_service, ColonyId::from_raw(0), false);
    }
}
