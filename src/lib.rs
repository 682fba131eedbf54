//! # Cellbench - battery cell bench monitor
//!
//! Evaluates lithium-ion cell readings against per-chemistry voltage
//! windows, derives state of charge, power, status and alerts, and serves
//! the live bench over a JSON/SSE HTTP API with optional random simulation.
//!
//! ## Architecture
//!
//! - `chemistry`: chemistry profiles and the lookup table
//! - `calculator`: per-cell and batch evaluation
//! - `simulation`: seeded random generators for demo data
//! - `alerts`: alert rules over evaluated cells
//! - `summary`: statistics, distributions and correlations
//! - `monitor`: application state, tick loop and snapshot publishing
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `web`: HTTP server and REST API

pub mod alerts;
pub mod calculator;
pub mod chemistry;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod simulation;
pub mod summary;
pub mod web;
pub mod web_schema;

#[cfg(test)]
mod config_tests;

// Re-export commonly used types
pub use calculator::{CellReading, CellResult, CellStatus, evaluate_batch};
pub use chemistry::{ChemistryProfile, ProfileTable};
pub use config::Config;
pub use error::{CellbenchError, Result};
pub use monitor::{CellMonitor, MonitorSnapshot};
