//! Conflict Phase resolution (§4.7): space combat, bombardment,
//! blockade, and ground invasion. Every roll in this crate is drawn from
//! an `RngService::combat_round_stream` scoped to `(turn, system, round)`
//! so two independent battles in the same turn never perturb each other.

pub mod bombardment;
pub mod ground;
pub mod space;

pub use ground::resolve_invasion;
pub use space::resolve_system_combat;
