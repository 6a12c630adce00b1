//! The IntelligenceReport entity (§3.2). Richer per-kind databases built on
//! top of this base shape live in the `intel` crate (§4.9).

use serde::{Deserialize, Serialize};

use crate::ids::{ColonyId, HouseId, SystemId};

/// Confidence decays one tier per N turns since last refresh (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Stale,
    Aging,
    Fresh,
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntelSubject {
    System(SystemId),
    House(HouseId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservedColonyFacts {
    pub owner: Option<HouseId>,
    pub approx_population: Option<u64>,
    pub approx_infrastructure: Option<u32>,
    pub starbase_count: Option<u32>,
    pub drydock_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub viewing_house: HouseId,
    pub subject: IntelSubject,
    pub freshness_turn: u32,
    pub confidence: Confidence,
    pub observed_fleet_strength: Option<u64>,
    pub colony: Option<(ColonyId, ObservedColonyFacts)>,
}

impl IntelligenceReport {
    pub fn age_turns(&self, current_turn: u32) -> u32 {
        current_turn.saturating_sub(self.freshness_turn)
    }

    /// Decay confidence by one tier per `decay_interval_turns` elapsed,
    /// never refreshing `freshness_turn` itself — stale reports are
    /// preserved but marked, not deleted (§4.9).
    pub fn decayed_confidence(&self, current_turn: u32, decay_interval_turns: u32) -> Confidence {
        if decay_interval_turns == 0 {
            return self.confidence;
        }
        let tiers_elapsed = self.age_turns(current_turn) / decay_interval_turns;
        let mut level = self.confidence;
        for _ in 0..tiers_elapsed {
            level = match level {
                Confidence::Verified => Confidence::Fresh,
                Confidence::Fresh => Confidence::Aging,
                Confidence::Aging => Confidence::Stale,
                Confidence::Stale => Confidence::Stale,
            };
        }
        level
    }
}
