//! Off-peak appliance planner: peak/off-peak status and optimum start delays
//! for household appliances under recurring daily off-peak pricing windows.

#[cfg(feature = "api")]
pub mod api;
pub mod appliance;
pub mod config;
pub mod error;
pub mod ids;
pub mod io;
/// Notification scheduling collaborator and reminder builders.
pub mod notification;
/// Scheduling engine: periods, windows, status, planning and optimum.
pub mod schedule;
pub mod store;
