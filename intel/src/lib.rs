//! Espionage, scouting, diplomacy, and the fog-of-war view derivation
//! that runs during the Intel sub-step of the Conflict Phase and at
//! query time (§4.9).

pub mod diplomacy;
pub mod espionage;
pub mod fow;
pub mod scouting;

pub use diplomacy::apply_diplomatic_action;
pub use espionage::execute_mission;
pub use fow::derive_filtered_view;
