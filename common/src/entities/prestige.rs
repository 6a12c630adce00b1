//! PrestigeEvent entity.

use serde::{Deserialize, Serialize};

use crate::ids::HouseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrestigeSource {
    ColonyEstablished,
    TechBreakthrough,
    CombatVictory,
    Invasion,
    EspionageSuccess,
    EspionageFailureDetected,
    MaintenanceShortfall,
    DiplomaticAction,
}

impl PrestigeSource {
    /// Zero-sum sources credit the acting house and debit the opposite
    /// party the same turn (§4.10, §8 Prestige zero-sum property).
    pub fn is_zero_sum(&self) -> bool {
        matches!(
            self,
            PrestigeSource::EspionageSuccess
                | PrestigeSource::EspionageFailureDetected
                | PrestigeSource::Invasion
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeEvent {
    pub source: PrestigeSource,
    pub house: HouseId,
    /// Signed amount; zero-sum sources pair two events with opposite signs
    /// on the same turn.
    pub amount: i64,
    pub reason: String,
    pub turn: u32,
}
