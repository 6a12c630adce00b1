//! The closed set of espionage mission kinds (§4.9). Their resolution is
//! data-driven from `Config::espionage`; this enum is only the tag.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EspionageAction {
    SpyPlanet,
    SpySystem,
    HackStarbase,
    TechTheft,
    SabotageLow,
    SabotageHigh,
    Assassination,
    CyberAttack,
    EconomicManipulation,
    PsyopsCampaign,
    CounterIntelSweep,
    IntelligenceTheft,
    PlantDisinformation,
}

impl EspionageAction {
    pub const ALL: [EspionageAction; 13] = [
        EspionageAction::SpyPlanet,
        EspionageAction::SpySystem,
        EspionageAction::HackStarbase,
        EspionageAction::TechTheft,
        EspionageAction::SabotageLow,
        EspionageAction::SabotageHigh,
        EspionageAction::Assassination,
        EspionageAction::CyberAttack,
        EspionageAction::EconomicManipulation,
        EspionageAction::PsyopsCampaign,
        EspionageAction::CounterIntelSweep,
        EspionageAction::IntelligenceTheft,
        EspionageAction::PlantDisinformation,
    ];

    /// Pure reconnaissance actions never roll detection against a failed
    /// prestige-penalizing outcome the way active-measures actions do;
    /// they still can be detected, but detection has no sabotage payload
    /// to invert.
    pub fn is_passive_recon(&self) -> bool {
        matches!(self, EspionageAction::SpyPlanet | EspionageAction::SpySystem)
    }
}
