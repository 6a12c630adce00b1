//! Maintenance, Income, and the construction/capacity machinery that runs
//! inside the Command Phase (§4 Turn pipeline).

pub mod assignment;
pub mod capacity;
pub mod construction;
pub mod fighters;
pub mod maintenance;
pub mod production;
pub mod repair;
pub mod terraforming;

pub use assignment::auto_assign_squadrons;
pub use capacity::{enforce_capacities, CapacityReport};
pub use construction::{
    advance_construction_queue, commission_ships, commit_build_order, recompute_dock_capacity, validate_build_order, BuildOrder,
};
pub use fighters::auto_load_fighter_squadrons;
pub use maintenance::run_maintenance_phase;
pub use production::run_income_phase;
pub use repair::{advance_repair_queues, request_ship_repair, request_starbase_repair};
pub use terraforming::{advance_terraforming, request_terraform};
