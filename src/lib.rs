//! Duckworth-Lewis-Stern Standard Edition resource-and-target engine.
//!
//! Resource tables are loaded once per format and shared read-only; every
//! calculation is a pure function of its inputs.

pub mod cli;
pub mod config;
pub mod data;
pub mod dls;
pub mod parallel;
pub mod server;

pub use data::{load_table, ResourceTable, TableCache, TableError};
pub use dls::{
    par_score_now, revised_target, team1_total_resources, team2_resources, MatchResourceContext,
};
