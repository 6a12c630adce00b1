//! Core game entities (§3.2).

pub mod colony;
pub mod construction;
pub mod diplomacy;
pub mod fleet;
pub mod house;
pub mod intel_report;
pub mod kastra;
pub mod neoria;
pub mod prestige;
pub mod repair;
pub mod ship;
pub mod squadron;
pub mod system;

pub use colony::Colony;
pub use construction::ConstructionProject;
pub use diplomacy::DiplomaticRelation;
pub use fleet::Fleet;
pub use house::House;
pub use intel_report::IntelligenceReport;
pub use kastra::Kastra;
pub use neoria::Neoria;
pub use prestige::PrestigeEvent;
pub use repair::RepairProject;
pub use ship::Ship;
pub use squadron::Squadron;
pub use system::System;
