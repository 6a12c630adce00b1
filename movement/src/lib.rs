//! Starmap pathfinding and the two-pass fleet movement resolution that
//! runs at the start of the Command Phase (§4.6).

pub mod pathfind;
pub mod resolve;

pub use pathfind::shortest_path;
pub use resolve::resolve_movement;
