//! Diplomatic state transitions (§4.9, §4.10): every transition is
//! broadcast as a public event so every house's filtered view sees it
//! (diplomacy is never hidden by fog of war, §4.9 Non-goals).

use ec4x_common::config::Config;
use ec4x_common::entities::diplomacy::DiplomaticState;
use ec4x_common::entities::prestige::PrestigeSource;
use ec4x_common::errors::OrderRejectReason;
use ec4x_common::events::{EventKind, EventLog, Phase};
use ec4x_common::ids::HouseId;
use ec4x_common::store::GameState;

/// Validates the requested transition against the current relation (a
/// `NonAggressionPact` cannot jump straight to `Alliance` within
/// `config.diplomacy.nap_min_duration_turns`) and applies it, including
/// the prestige side effects of declaring war or forming an alliance.
pub fn apply_diplomatic_action(
    state: &mut GameState,
    config: &Config,
    a: HouseId,
    b: HouseId,
    to: DiplomaticState,
    log: &mut EventLog,
) -> Result<(), OrderRejectReason> {
    let turn = state.turn;
    let current = state.diplomacy_between(a, b).map(|r| r.state).unwrap_or(DiplomaticState::Peace);

    if current == DiplomaticState::NonAggressionPact
        && to == DiplomaticState::Alliance
    {
        let last_transition_turn = state
            .diplomacy_between(a, b)
            .and_then(|r| r.history.last())
            .map(|t| t.turn)
            .unwrap_or(0);
        if turn.saturating_sub(last_transition_turn) < config.diplomacy.nap_min_duration_turns {
            return Err(OrderRejectReason::OrderConflictsWithStandingOrder);
        }
    }

    let relation = state.diplomacy_between_mut(a, b);
    relation.transition(turn, to);

    log.push(turn, Phase::Conflict, EventKind::DiplomaticStateChanged { a, b, from: current, to });

    match to {
        DiplomaticState::War => {
            let penalty = config.diplomacy.war_declaration_prestige_penalty;
            if let Some(h) = state.houses.get_mut(&a) {
                h.prestige_total += penalty;
            }
            log.push(
                turn,
                Phase::Conflict,
                EventKind::PrestigePenalized { house: a, source: PrestigeSource::DiplomaticAction, amount: -penalty },
            );
        }
        DiplomaticState::Alliance => {
            let bonus = config.diplomacy.alliance_formation_prestige_bonus;
            for house in [a, b] {
                if let Some(h) = state.houses.get_mut(&house) {
                    h.prestige_total += bonus;
                }
                log.push(
                    turn,
                    Phase::Conflict,
                    EventKind::PrestigeAwarded { house, source: PrestigeSource::DiplomaticAction, amount: bonus },
                );
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::config::fixture::test_config;
    use ec4x_common::entities::house::House;
    use std::collections::BTreeMap;

    #[test]
    fn declaring_war_records_a_transition_and_a_prestige_penalty() {
        let config = test_config();
        let mut state = GameState::new(1, BTreeMap::new());
        let a = HouseId::from_raw(0);
        let b = HouseId::from_raw(1);
        state.insert_house(House::new(a, 0));
        state.insert_house(House::new(b, 0));
        let mut log = EventLog::new();

        apply_diplomatic_action(&mut state, &config, a, b, DiplomaticState::War, &mut log).unwrap();

        assert_eq!(state.diplomacy_between(a, b).unwrap().state, DiplomaticState::War);
    }
}
