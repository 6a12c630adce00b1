//! Diplomatic relation entity, keyed on an unordered pair of houses.

use serde::{Deserialize, Serialize};

use crate::ids::HouseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiplomaticState {
    Peace,
    NonAggressionPact,
    Alliance,
    Hostile,
    War,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiplomaticTransition {
    pub turn: u32,
    pub from: DiplomaticState,
    pub to: DiplomaticState,
}

/// Unordered key over a pair of houses, normalized so `(a, b)` and `(b, a)`
/// hash and compare identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HousePair(HouseId, HouseId);

impl HousePair {
    pub fn new(a: HouseId, b: HouseId) -> Self {
        if a.raw() <= b.raw() {
            HousePair(a, b)
        } else {
            HousePair(b, a)
        }
    }

    pub fn houses(&self) -> (HouseId, HouseId) {
        (self.0, self.1)
    }

    pub fn contains(&self, house: HouseId) -> bool {
        self.0 == house || self.1 == house
    }

    pub fn other(&self, house: HouseId) -> Option<HouseId> {
        if self.0 == house {
            Some(self.1)
        } else if self.1 == house {
            Some(self.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiplomaticRelation {
    pub pair: HousePair,
    pub state: DiplomaticState,
    pub history: Vec<DiplomaticTransition>,
}

impl DiplomaticRelation {
    pub fn new(pair: HousePair) -> Self {
        Self {
            pair,
            state: DiplomaticState::Peace,
            history: Vec::new(),
        }
    }

    pub fn transition(&mut self, turn: u32, to: DiplomaticState) {
        self.history.push(DiplomaticTransition {
            turn,
            from: self.state,
            to,
        });
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_pair_is_order_independent() {
        let a = HouseId::from_raw(3);
        let b = HouseId::from_raw(1);
        assert_eq!(HousePair::new(a, b), HousePair::new(b, a));
    }
}
