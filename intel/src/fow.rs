//! Fog-of-war filtered view derivation (§4.9, §4.11). A house sees its
//! own entities in full, allied entities by agreement, and everything
//! else only through its own `IntelligenceReport`s, decayed by age.
//! Information is withheld until a deliberate reveal action (scouting)
//! discloses it; hidden-until-revealed is purely a data-filtering concern
//! here, not a cryptographic commitment scheme.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ec4x_common::entities::diplomacy::{DiplomaticRelation, DiplomaticState};
use ec4x_common::entities::house::House;
use ec4x_common::entities::intel_report::IntelligenceReport;
use ec4x_common::entities::system::System;
use ec4x_common::entities::Colony;
use ec4x_common::entities::Fleet;
use ec4x_common::events::EventEnvelope;
use ec4x_common::ids::{HouseId, SystemId, ViewingHouse};
use ec4x_common::store::GameState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredGameState {
    pub viewing_house: ViewingHouse,
    pub turn: u32,
    pub own_house: Option<House>,
    pub visible_houses: Vec<House>,
    pub own_colonies: Vec<Colony>,
    pub own_fleets: Vec<Fleet>,
    pub visible_fleets: Vec<Fleet>,
    pub intelligence: Vec<IntelligenceReport>,
    /// The starmap graph is always exposed in full (§4.11); lane classes
    /// and adjacency are public knowledge regardless of scouting.
    pub starmap: BTreeMap<SystemId, System>,
    /// Systems adjacent to own colonies, adjacent to own fleets'
    /// locations, or scouted this turn with non-expired intel (§4.11).
    pub visible_systems: Vec<SystemId>,
    pub diplomacy: Vec<DiplomaticRelation>,
    pub public_events: Vec<EventEnvelope>,
}

fn is_allied(state: &GameState, a: HouseId, b: HouseId) -> bool {
    state
        .diplomacy_between(a, b)
        .map(|r| matches!(r.state, DiplomaticState::Alliance))
        .unwrap_or(false)
}

/// Confidence decays one tier per this many turns since a report's last
/// refresh (§4.9); stale reports are kept, never deleted.
const CONFIDENCE_DECAY_INTERVAL_TURNS: u32 = 5;

/// Builds the single view `viewing_house` is authorized to see this
/// turn. Allied fleets/colonies are shared in full (an alliance implies
/// shared tactical awareness, §4.9); everyone else's assets appear only
/// as decayed `IntelligenceReport`s, never as raw entities. Intelligence
/// is read straight from `state.intelligence` - a filtered view never
/// needs the caller to thread its own intel slice through.
pub fn derive_filtered_view(state: &GameState, viewing_house: HouseId) -> FilteredGameState {
    let own_house = state.house(viewing_house).cloned();

    let visible_houses: Vec<House> = state
        .houses
        .values()
        .filter(|h| h.id == viewing_house || is_allied(state, viewing_house, h.id))
        .cloned()
        .collect();

    let own_colonies: Vec<Colony> = state.colonies_owned_by(viewing_house).cloned().collect();

    let own_fleets: Vec<Fleet> = state.fleets_owned_by(viewing_house).cloned().collect();

    let visible_fleets: Vec<Fleet> = state
        .fleets
        .values()
        .filter(|f| f.owner != viewing_house && is_allied(state, viewing_house, f.owner))
        .cloned()
        .collect();

    let turn = state.turn;
    let intelligence: Vec<IntelligenceReport> = state
        .intelligence
        .get(&viewing_house)
        .into_iter()
        .flatten()
        .map(|report| {
            let mut report = report.clone();
            report.confidence = report.decayed_confidence(turn, CONFIDENCE_DECAY_INTERVAL_TURNS);
            report
        })
        .collect();

    let mut visible_systems: Vec<SystemId> = Vec::new();
    for colony in &own_colonies {
        if let Some(system) = state.system(colony.system) {
            visible_systems.push(colony.system);
            visible_systems.extend(system.neighbors());
        }
    }
    for fleet in &own_fleets {
        if let Some(system) = state.system(fleet.location) {
            visible_systems.push(fleet.location);
            visible_systems.extend(system.neighbors());
        }
    }
    for report in &intelligence {
        if let ec4x_common::entities::intel_report::IntelSubject::System(system) = report.subject {
            if !matches!(report.confidence, ec4x_common::entities::intel_report::Confidence::Stale) {
                visible_systems.push(system);
            }
        }
    }
    visible_systems.sort_by_key(|id| id.raw());
    visible_systems.dedup();

    let diplomacy: Vec<DiplomaticRelation> = state
        .diplomacy
        .values()
        .filter(|rel| rel.pair.contains(viewing_house))
        .cloned()
        .collect();

    FilteredGameState {
        viewing_house: ViewingHouse(viewing_house),
        turn: state.turn,
        own_house,
        visible_houses,
        own_colonies,
        own_fleets,
        visible_fleets,
        intelligence,
        starmap: state.systems.clone(),
        visible_systems,
        diplomacy,
        public_events: state.public_events.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_common::entities::house::House as HouseEntity;
    use std::collections::BTreeMap;

    #[test]
    fn filtered_view_never_exposes_an_unallied_house_fleet_directly() {
        let mut state = GameState::new(1, BTreeMap::new());
        let viewer = HouseId::from_raw(0);
        let stranger = HouseId::from_raw(1);
        state.insert_house(HouseEntity::new(viewer, 0));
        state.insert_house(HouseEntity::new(stranger, 0));

        let fleet = Fleet::new(
            ec4x_common::ids::FleetId::from_raw(0),
            stranger,
            ec4x_common::ids::SystemId::from_raw(0),
        );
        state.insert_fleet(fleet);

        let view = derive_filtered_view(&state, viewer);
        assert!(view.visible_fleets.is_empty());
    }
}
