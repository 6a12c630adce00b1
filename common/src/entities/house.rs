//! The House entity — a player's empire-level record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::HouseId;

/// Tech fields recognized by the `tech` config group (§6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TechField {
    Construction,
    Weapons,
    Shields,
    Economic,
    Science,
    /// Electronic intelligence.
    Eli,
    /// Cloaking.
    Clk,
    /// Counter-intelligence.
    Cic,
    StrategicLift,
    FleetCommand,
    StrategicCommand,
    FighterDoctrine,
    AdvancedCarrierOps,
    Terraforming,
}

impl TechField {
    pub const ALL: [TechField; 14] = [
        TechField::Construction,
        TechField::Weapons,
        TechField::Shields,
        TechField::Economic,
        TechField::Science,
        TechField::Eli,
        TechField::Clk,
        TechField::Cic,
        TechField::StrategicLift,
        TechField::FleetCommand,
        TechField::StrategicCommand,
        TechField::FighterDoctrine,
        TechField::AdvancedCarrierOps,
        TechField::Terraforming,
    ];
}

/// A house's per-field research level, defaulting to 0 (unresearched).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechTree {
    levels: BTreeMap<TechField, u32>,
}

impl TechTree {
    pub fn level(&self, field: TechField) -> u32 {
        self.levels.get(&field).copied().unwrap_or(0)
    }

    pub fn set_level(&mut self, field: TechField, level: u32) {
        self.levels.insert(field, level);
    }

    /// Mean tech level across all fields, used by the ELI dominant-tech
    /// penalty formula (§9 Open Questions).
    pub fn mean_level(&self) -> f64 {
        let sum: u32 = TechField::ALL.iter().map(|f| self.level(*f)).sum();
        sum as f64 / TechField::ALL.len() as f64
    }

    /// Count of fields strictly below the given average — the "below
    /// average counting rule" referenced by §9.
    pub fn fields_below(&self, average: f64) -> u32 {
        TechField::ALL
            .iter()
            .filter(|f| (self.level(**f) as f64) < average)
            .count() as u32
    }
}

/// Lifecycle / operating status of a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HouseStatus {
    Active,
    /// Orders are generated by an external AI client standing in for an
    /// absent player; the engine treats this identically to `Active`.
    Autopilot,
    /// Triggered by sustained maintenance shortfall (§4.10).
    DefensiveCollapse,
}

/// Morale band derived from total prestige. Never stored — always
/// recomputed from `House::prestige_total` against `config.prestige`
/// thresholds via [`House::morale_band`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoraleBand {
    Jubilant,
    Content,
    Wary,
    Unrest,
    Rebellious,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
    pub id: HouseId,
    pub treasury: i64,
    pub tech: TechTree,
    /// Percentage points, 0-100.
    pub tax_rate: u8,
    /// Espionage budget points accrued and unspent.
    pub ebp: u32,
    /// Counter-intelligence points accrued and unspent.
    pub cip: u32,
    pub prestige_total: i64,
    pub status: HouseStatus,
    pub eliminated: bool,
    pub eliminated_turn: Option<u32>,
    pub consecutive_shortfall_turns: u32,
    pub planet_breaker_count: u32,
}

impl House {
    pub fn new(id: HouseId, starting_treasury: i64) -> Self {
        Self {
            id,
            treasury: starting_treasury,
            tech: TechTree::default(),
            tax_rate: 0,
            ebp: 0,
            cip: 0,
            prestige_total: 0,
            status: HouseStatus::Active,
            eliminated: false,
            eliminated_turn: None,
            consecutive_shortfall_turns: 0,
            planet_breaker_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    pub fn morale_band(&self, bands: &[(i64, MoraleBand)]) -> MoraleBand {
        // `bands` is sorted ascending by threshold; pick the highest
        // threshold not exceeding prestige_total, defaulting to the lowest.
        bands
            .iter()
            .rev()
            .find(|(threshold, _)| self.prestige_total >= *threshold)
            .map(|(_, band)| *band)
            .unwrap_or(MoraleBand::Rebellious)
    }

    pub fn eliminate(&mut self, turn: u32) {
        self.eliminated = true;
        self.eliminated_turn = Some(turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tech_tree_defaults_to_zero() {
        let tree = TechTree::default();
        assert_eq!(tree.level(TechField::Weapons), 0);
    }

    #[test]
    fn mean_level_and_below_average_count() {
        let mut tree = TechTree::default();
        tree.set_level(TechField::Weapons, 10);
        tree.set_level(TechField::Shields, 0);
        let avg = tree.mean_level();
        assert!(tree.fields_below(avg) >= 1);
    }

    #[test]
    fn morale_band_picks_highest_satisfied_threshold() {
        let mut house = House::new(HouseId::from_raw(0), 1000);
        house.prestige_total = 50;
        let bands = vec![
            (i64::MIN, MoraleBand::Rebellious),
            (0, MoraleBand::Unrest),
            (25, MoraleBand::Wary),
            (100, MoraleBand::Content),
        ];
        assert!(matches!(house.morale_band(&bands), MoraleBand::Wary));
    }
}
