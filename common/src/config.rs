//! The read-only `Config` record (§6.3) — consumed as an already-parsed
//! in-memory structure. Loading it from disk is an external collaborator's
//! job (§1 Out of Scope); this module owns the type, its validation, and a
//! plausible test fixture.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::house::{MoraleBand, TechField};
use crate::entities::prestige::PrestigeSource;
use crate::entities::ship::ShipClass;
use crate::espionage_kinds::EspionageAction;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tech field {0:?} has no table entries")]
    MissingTechTable(TechField),
    #[error("ship class {0:?} has no spec")]
    MissingShipSpec(ShipClass),
    #[error("tech field {field:?} level {level} requires level {prereq_level} but table stops at {max_level}")]
    ImpossiblePrerequisite {
        field: TechField,
        level: u32,
        prereq_level: u32,
        max_level: u32,
    },
    #[error("capacity config has zero fighter grace period but a nonzero salvage rate, which is contradictory")]
    InconsistentCapacityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechLevelEntry {
    /// Prerequisite "science level" gating this tech level.
    pub sl_required: u32,
    pub cost: i64,
    pub multiplier: f64,
    pub unlocks: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechFieldTable {
    pub levels: BTreeMap<u32, TechLevelEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechConfig {
    pub fields: BTreeMap<TechField, TechFieldTable>,
}

impl TechConfig {
    pub fn entry(&self, field: TechField, level: u32) -> Option<&TechLevelEntry> {
        self.fields.get(&field).and_then(|t| t.levels.get(&level))
    }

    pub fn max_level(&self, field: TechField) -> u32 {
        self.fields
            .get(&field)
            .and_then(|t| t.levels.keys().max().copied())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySpec {
    pub docks: u32,
    pub cost: i64,
    pub build_time_turns: u32,
    pub maintenance: i64,
    pub requires_spaceport: bool,
    /// Starbase-only: production growth bonus percentage at the host
    /// colony (§4.4).
    pub growth_bonus_pct: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitiesConfig {
    pub spaceport: FacilitySpec,
    pub shipyard: FacilitySpec,
    pub drydock: FacilitySpec,
    pub starbase: FacilitySpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipSpec {
    pub construction_cost: i64,
    pub maintenance: i64,
    pub combat_strength: u32,
    /// Hits-to-cripple (§4.7); crippled ships have half this value.
    pub defensive_strength: u32,
    /// Escort slots granted if this class is a flagship; escort cost if
    /// used as an escort. Capital ships (rating >= threshold) cannot
    /// escort another squadron (§3.2).
    pub command_rating: u32,
    pub cargo_capacity: u32,
    pub tech_prereqs: Vec<(TechField, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipsConfig {
    pub specs: BTreeMap<ShipClass, ShipSpec>,
    /// Hangar capacity keyed by `(carrier class, ACO tech level)` (§4.4).
    pub hangar_capacity: BTreeMap<(ShipClass, u32), u32>,
    /// Command rating at/above which a flagship counts as a capital ship.
    pub capital_ship_command_threshold: u32,
}

impl ShipsConfig {
    pub fn spec(&self, class: ShipClass) -> Option<&ShipSpec> {
        self.specs.get(&class)
    }

    pub fn hangar_capacity_for(&self, class: ShipClass, aco_level: u32) -> u32 {
        self.hangar_capacity
            .get(&(class, aco_level))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_capital(&self, class: ShipClass) -> bool {
        self.spec(class)
            .map(|s| s.command_rating >= self.capital_ship_command_threshold)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundUnitSpec {
    pub cost: i64,
    pub population_cost: u32,
    pub combat_strength: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundUnitsConfig {
    pub marines: GroundUnitSpec,
    pub army: GroundUnitSpec,
    pub ground_battery: GroundUnitSpec,
    pub planetary_shield: GroundUnitSpec,
    /// Minimum viable population required after marine/army recruitment
    /// consumes population (§4.4).
    pub minimum_viable_population: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBandEffect {
    pub min_rate: u8,
    pub morale_delta_next_turn: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    pub base_growth_rate_pct: u32,
    pub tax_bands: Vec<TaxBandEffect>,
    pub reserve_maintenance_pct: u32,
    pub mothball_maintenance_pct: u32,
    pub shortfall_prestige_penalty: i64,
    pub shortfall_collapse_threshold_turns: u32,
    /// 100% cost penalty for non-fighter ships built via spaceport-only
    /// construction (§4.4).
    pub spaceport_non_fighter_cost_penalty_pct: u32,
    /// Ascending `(turn_threshold, act_number)` pairs (§4.13).
    pub act_boundaries: Vec<(u32, u8)>,
    /// Turns a standing order waits before it can fire, reset whenever an
    /// explicit order is accepted (§9 "Standing-order activation delay").
    pub standing_order_activation_delay_turns: u32,
    /// Global kill-switch gating all standing-order activation regardless
    /// of each fleet's own enable flag (§9).
    pub standing_orders_enabled: bool,
    /// Seeded into each house's treasury and its homeworld colony at
    /// `new_game` (§6.1 `newGame`).
    pub starting_treasury: i64,
    pub starting_infrastructure: u32,
    pub starting_industrial_units: u32,
    pub starting_population_souls: u64,
    /// Percentage of a ship's/starbase's build cost a `RepairProject`
    /// costs (§3.2: "25% of build cost").
    pub repair_cost_pct: u32,
    /// Flat treasury cost of a terraforming project, paid up front like a
    /// build order (§4.1 Maintenance Phase "advance terraforming").
    pub terraform_cost: i64,
    /// Turns a terraforming project takes to complete before tech scaling.
    pub terraform_turns: u32,
    /// Infrastructure granted per completed project at Terraforming tech
    /// level 0; scaled up by that level's `multiplier` from the tech table.
    pub terraform_infrastructure_bonus: u32,
}

impl EconomyConfig {
    pub fn act_for_turn(&self, turn: u32) -> u8 {
        self.act_boundaries
            .iter()
            .rev()
            .find(|(threshold, _)| turn >= *threshold)
            .map(|(_, act)| *act)
            .unwrap_or(1)
    }

    pub fn tax_morale_delta(&self, tax_rate: u8) -> i32 {
        self.tax_bands
            .iter()
            .rev()
            .find(|b| tax_rate >= b.min_rate)
            .map(|b| b.morale_delta_next_turn)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeSourceConfig {
    pub base_amount: i64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeConfig {
    pub sources: BTreeMap<PrestigeSource, PrestigeSourceConfig>,
    /// Ascending `(threshold, band)` pairs consumed by `House::morale_band`.
    pub morale_bands: Vec<(i64, MoraleBand)>,
    pub victory_prestige_threshold: i64,
}

impl PrestigeConfig {
    pub fn amount_for(&self, source: PrestigeSource) -> i64 {
        self.sources
            .get(&source)
            .map(|c| (c.base_amount as f64 * c.multiplier) as i64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Sides of the to-hit die (a d20-like roll per §4.7).
    pub hit_die_sides: u32,
    /// A roll at or above this value is a critical hit.
    pub critical_threshold: u32,
    pub round_cap: u32,
    /// Shield block probability indexed by planetary shield level.
    pub shield_block_probability_per_level: Vec<f64>,
    /// Bombardment infrastructure-damage dice as `(num_dice, sides)`,
    /// indexed by planetary shield level, read from this config group
    /// per §9's Open Question resolution.
    pub bombardment_damage_dice_per_shield_level: Vec<(u32, u32)>,
    /// Combat strength a single uncrippled starbase adds to its host
    /// colony's defenders (§4.7 "starbases participate on the defender
    /// side"); a crippled starbase contributes zero.
    pub starbase_combat_strength: u32,
}

impl CombatConfig {
    pub fn shield_block_probability(&self, level: u32) -> f64 {
        self.shield_block_probability_per_level
            .get(level as usize)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn bombardment_dice(&self, shield_level: u32) -> (u32, u32) {
        self.bombardment_damage_dice_per_shield_level
            .get(shield_level as usize)
            .copied()
            .unwrap_or((1, 6))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspionageActionSpec {
    pub ebp_cost: u32,
    pub prestige_on_success: i64,
    pub damage_dice: Option<(u32, u32)>,
    pub detection_penalty_on_failure: i64,
    pub steals_srp: bool,
    pub damages_iu: bool,
    pub grants_intel: bool,
    pub ongoing_effect: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspionageConfig {
    pub actions: BTreeMap<EspionageAction, EspionageActionSpec>,
    /// Detection threshold on a d20-like roll, indexed by the defender's
    /// CIC tech level.
    pub detection_threshold_by_cic_level: BTreeMap<u32, u32>,
    /// EBP/CIP accrued per house each Income Phase, scaled by the house's
    /// ELI tech level (§3.2 "espionage budget accrued per turn").
    pub ebp_accrual_base: u32,
    pub ebp_accrual_per_eli_level: u32,
}

impl EspionageConfig {
    pub fn spec(&self, action: EspionageAction) -> Option<&EspionageActionSpec> {
        self.actions.get(&action)
    }

    pub fn detection_threshold(&self, cic_level: u32) -> u32 {
        self.detection_threshold_by_cic_level
            .get(&cic_level)
            .copied()
            .unwrap_or(10)
    }

    pub fn ebp_accrual(&self, eli_level: u32) -> u32 {
        self.ebp_accrual_base + self.ebp_accrual_per_eli_level * eli_level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub fighter_cap_base: u32,
    pub fighter_cap_per_infrastructure: f64,
    pub fighter_grace_period_turns: u32,
    pub fighter_partial_salvage_pct: u32,
}

impl CapacityConfig {
    pub fn fighter_cap(&self, infrastructure: u32) -> u32 {
        self.fighter_cap_base + (infrastructure as f64 * self.fighter_cap_per_infrastructure) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiplomacyConfig {
    pub war_declaration_prestige_penalty: i64,
    pub alliance_formation_prestige_bonus: i64,
    pub blockade_diplomatic_penalty: i64,
    pub nap_min_duration_turns: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tech: TechConfig,
    pub facilities: FacilitiesConfig,
    pub ships: ShipsConfig,
    pub ground_units: GroundUnitsConfig,
    pub economy: EconomyConfig,
    pub prestige: PrestigeConfig,
    pub combat: CombatConfig,
    pub espionage: EspionageConfig,
    pub capacity: CapacityConfig,
    pub diplomacy: DiplomacyConfig,
    pub victory_turn_limit: u32,
}

impl Config {
    pub fn act_for_turn(&self, turn: u32) -> u8 {
        self.economy.act_for_turn(turn)
    }

    /// Fatal at game-construction time (§7 Configuration error).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in TechField::ALL {
            if self.tech.fields.get(&field).map(|t| t.levels.is_empty()).unwrap_or(true) {
                return Err(ConfigError::MissingTechTable(field));
            }
        }
        for class in ShipClass::ALL {
            if self.ships.spec(class).is_none() {
                return Err(ConfigError::MissingShipSpec(class));
            }
        }
        for spec in self.ships.specs.values() {
            for (field, level) in &spec.tech_prereqs {
                let max = self.tech.max_level(*field);
                if *level > max {
                    return Err(ConfigError::ImpossiblePrerequisite {
                        field: *field,
                        level: *level,
                        prereq_level: *level,
                        max_level: max,
                    });
                }
            }
        }
        if self.capacity.fighter_grace_period_turns == 0 && self.capacity.fighter_partial_salvage_pct > 0 {
            return Err(ConfigError::InconsistentCapacityConfig);
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod fixture {
    use super::*;

    /// A complete, internally-consistent `Config` for tests. Not a
    /// production data source - see module docs.
    pub fn test_config() -> Config {
        let mut tech = TechConfig::default();
        for field in TechField::ALL {
            let mut table = TechFieldTable::default();
            for level in 0..=10u32 {
                table.levels.insert(
                    level,
                    TechLevelEntry {
                        sl_required: level,
                        cost: 100 * (level as i64 + 1),
                        multiplier: 1.0 + 0.1 * level as f64,
                        unlocks: Vec::new(),
                    },
                );
            }
            tech.fields.insert(field, table);
        }

        let mut specs = BTreeMap::new();
        let base_stats: [(ShipClass, i64, u32, u32, u32, u32); 20] = [
            (ShipClass::Scout, 100, 5, 10, 1, 0),
            (ShipClass::Fighter, 150, 10, 15, 1, 0),
            (ShipClass::Corvette, 300, 20, 40, 2, 0),
            (ShipClass::Frigate, 500, 35, 70, 2, 0),
            (ShipClass::Destroyer, 800, 60, 100, 3, 0),
            (ShipClass::LightCruiser, 1200, 90, 150, 4, 0),
            (ShipClass::HeavyCruiser, 1800, 130, 220, 5, 0),
            (ShipClass::Battlecruiser, 2600, 180, 300, 6, 0),
            (ShipClass::Battleship, 4000, 260, 420, 8, 0),
            (ShipClass::Dreadnought, 7000, 400, 650, 10, 0),
            (ShipClass::PlanetBreaker, 20000, 1000, 1500, 10, 0),
            (ShipClass::LightCarrier, 3000, 50, 250, 8, 0),
            (ShipClass::Carrier, 5000, 70, 400, 10, 0),
            (ShipClass::CommandCruiser, 3200, 140, 260, 12, 0),
            (ShipClass::MineLayer, 900, 10, 90, 2, 0),
            (ShipClass::Monitor, 2200, 150, 380, 3, 0),
            (ShipClass::Raider, 1100, 80, 80, 2, 0),
            (ShipClass::Etac, 700, 0, 60, 1, 0),
            (ShipClass::TroopTransport, 600, 0, 70, 1, 0),
            (ShipClass::Freighter, 500, 0, 80, 1, 0),
        ];
        for (class, cost, attack, defense, command, _cargo) in base_stats {
            let cargo_capacity = if class.is_spacelift() { 500 } else { 0 };
            specs.insert(
                class,
                ShipSpec {
                    construction_cost: cost,
                    maintenance: cost / 20,
                    combat_strength: attack,
                    defensive_strength: defense,
                    command_rating: command,
                    cargo_capacity,
                    tech_prereqs: Vec::new(),
                },
            );
        }

        let mut hangar_capacity = BTreeMap::new();
        for aco_level in 0..=10u32 {
            hangar_capacity.insert((ShipClass::LightCarrier, aco_level), 12 + aco_level);
            hangar_capacity.insert((ShipClass::Carrier, aco_level), 24 + aco_level * 2);
        }

        let mut espionage_actions = BTreeMap::new();
        for action in EspionageAction::ALL {
            espionage_actions.insert(
                action,
                EspionageActionSpec {
                    ebp_cost: 10,
                    prestige_on_success: 5,
                    damage_dice: Some((2, 6)),
                    detection_penalty_on_failure: 8,
                    steals_srp: matches!(action, EspionageAction::IntelligenceTheft),
                    damages_iu: matches!(
                        action,
                        EspionageAction::SabotageLow | EspionageAction::SabotageHigh
                    ),
                    grants_intel: action.is_passive_recon(),
                    ongoing_effect: matches!(action, EspionageAction::PlantDisinformation),
                },
            );
        }
        let mut detection_threshold_by_cic_level = BTreeMap::new();
        for level in 0..=10u32 {
            detection_threshold_by_cic_level.insert(level, 10 + level);
        }

        Config {
            tech,
            facilities: FacilitiesConfig {
                spaceport: FacilitySpec {
                    docks: 2,
                    cost: 500,
                    build_time_turns: 3,
                    maintenance: 20,
                    requires_spaceport: false,
                    growth_bonus_pct: 0,
                },
                shipyard: FacilitySpec {
                    docks: 4,
                    cost: 1500,
                    build_time_turns: 5,
                    maintenance: 50,
                    requires_spaceport: true,
                    growth_bonus_pct: 0,
                },
                drydock: FacilitySpec {
                    docks: 2,
                    cost: 1000,
                    build_time_turns: 4,
                    maintenance: 30,
                    requires_spaceport: true,
                    growth_bonus_pct: 0,
                },
                starbase: FacilitySpec {
                    docks: 0,
                    cost: 3000,
                    build_time_turns: 6,
                    maintenance: 80,
                    requires_spaceport: false,
                    growth_bonus_pct: 10,
                },
            },
            ships: ShipsConfig {
                specs,
                hangar_capacity,
                capital_ship_command_threshold: 8,
            },
            ground_units: GroundUnitsConfig {
                marines: GroundUnitSpec {
                    cost: 100,
                    population_cost: 50,
                    combat_strength: 10,
                },
                army: GroundUnitSpec {
                    cost: 150,
                    population_cost: 80,
                    combat_strength: 15,
                },
                ground_battery: GroundUnitSpec {
                    cost: 300,
                    population_cost: 0,
                    combat_strength: 20,
                },
                planetary_shield: GroundUnitSpec {
                    cost: 2000,
                    population_cost: 0,
                    combat_strength: 0,
                },
                minimum_viable_population: 100,
            },
            economy: EconomyConfig {
                base_growth_rate_pct: 5,
                tax_bands: vec![
                    TaxBandEffect { min_rate: 0, morale_delta_next_turn: 1 },
                    TaxBandEffect { min_rate: 25, morale_delta_next_turn: 0 },
                    TaxBandEffect { min_rate: 50, morale_delta_next_turn: -2 },
                    TaxBandEffect { min_rate: 75, morale_delta_next_turn: -5 },
                ],
                reserve_maintenance_pct: 50,
                mothball_maintenance_pct: 10,
                shortfall_prestige_penalty: 10,
                shortfall_collapse_threshold_turns: 3,
                spaceport_non_fighter_cost_penalty_pct: 100,
                act_boundaries: vec![(0, 1), (25, 2), (50, 3), (75, 4)],
                standing_order_activation_delay_turns: 2,
                standing_orders_enabled: true,
                starting_treasury: 5_000,
                starting_infrastructure: 20,
                starting_industrial_units: 50,
                starting_population_souls: 5_000_000,
                repair_cost_pct: 25,
                terraform_cost: 2_000,
                terraform_turns: 4,
                terraform_infrastructure_bonus: 5,
            },
            prestige: PrestigeConfig {
                sources: {
                    let mut m = BTreeMap::new();
                    m.insert(PrestigeSource::ColonyEstablished, PrestigeSourceConfig { base_amount: 20, multiplier: 1.0 });
                    m.insert(PrestigeSource::TechBreakthrough, PrestigeSourceConfig { base_amount: 10, multiplier: 1.0 });
                    m.insert(PrestigeSource::CombatVictory, PrestigeSourceConfig { base_amount: 15, multiplier: 1.0 });
                    m.insert(PrestigeSource::Invasion, PrestigeSourceConfig { base_amount: 30, multiplier: 1.0 });
                    m.insert(PrestigeSource::EspionageSuccess, PrestigeSourceConfig { base_amount: 5, multiplier: 1.0 });
                    m.insert(PrestigeSource::EspionageFailureDetected, PrestigeSourceConfig { base_amount: -8, multiplier: 1.0 });
                    m.insert(PrestigeSource::MaintenanceShortfall, PrestigeSourceConfig { base_amount: -10, multiplier: 1.0 });
                    m.insert(PrestigeSource::DiplomaticAction, PrestigeSourceConfig { base_amount: 5, multiplier: 1.0 });
                    m
                },
                morale_bands: vec![
                    (i64::MIN, MoraleBand::Rebellious),
                    (-50, MoraleBand::Unrest),
                    (0, MoraleBand::Wary),
                    (100, MoraleBand::Content),
                    (250, MoraleBand::Jubilant),
                ],
                victory_prestige_threshold: 1000,
            },
            combat: CombatConfig {
                hit_die_sides: 20,
                critical_threshold: 19,
                round_cap: 6,
                shield_block_probability_per_level: vec![0.0, 0.15, 0.30, 0.45, 0.60, 0.75],
                bombardment_damage_dice_per_shield_level: vec![
                    (3, 6), (3, 6), (2, 6), (2, 6), (1, 6), (1, 4),
                ],
                starbase_combat_strength: 40,
            },
            espionage: EspionageConfig {
                actions: espionage_actions,
                detection_threshold_by_cic_level,
                ebp_accrual_base: 5,
                ebp_accrual_per_eli_level: 2,
            },
            capacity: CapacityConfig {
                fighter_cap_base: 12,
                fighter_cap_per_infrastructure: 0.5,
                fighter_grace_period_turns: 2,
                fighter_partial_salvage_pct: 50,
            },
            diplomacy: DiplomacyConfig {
                war_declaration_prestige_penalty: -15,
                alliance_formation_prestige_bonus: 10,
                blockade_diplomatic_penalty: -5,
                nap_min_duration_turns: 5,
            },
            victory_turn_limit: 200,
        }
    }

    #[test]
    fn fixture_validates() {
        test_config().validate().expect("fixture config must validate");
    }
}
