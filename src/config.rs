//! Configuration management for Cellbench
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. Every section falls back to its defaults,
//! so a partial file only needs the keys it changes.

use crate::calculator::CellReading;
use crate::chemistry::{ChemistryProfile, ProfileTable};
use crate::error::{CellbenchError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CELLBENCH_CONFIG";

/// Upper bound on cell slots per bench
pub const MAX_CELLS: usize = 64;

/// Voltage accepted from operators, in volts
pub const INPUT_VOLTAGE_RANGE: (f64, f64) = (0.0, 5.0);

/// Current accepted from operators, in amperes
pub const INPUT_CURRENT_RANGE: (f64, f64) = (0.0, 10.0);

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Bench identity shown alongside readings
    pub bench: BenchConfig,

    /// Cell slot layout and initial readings
    pub cells: CellsConfig,

    /// Extra chemistry profiles merged over the built-in LFP/NMC/LCO/LTO set
    pub chemistries: Vec<ChemistryProfile>,

    /// Demo data generation and live refresh
    pub simulation: SimulationConfig,

    /// Alert thresholds
    pub alerts: AlertsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Bench identity
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BenchConfig {
    /// Bench name
    pub name: String,

    /// Lab group number (1 or more)
    pub group_number: u32,
}

/// Cell slot layout
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CellsConfig {
    /// Number of cell slots on the bench
    pub count: usize,

    /// Chemistry for slots without an explicit initial reading
    pub default_chemistry: String,

    /// Voltage for slots without an explicit initial reading
    pub default_voltage: f64,

    /// Current for slots without an explicit initial reading
    pub default_current: f64,

    /// Explicit readings for the first slots, in slot order
    pub initial: Vec<CellReading>,
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SimulationConfig {
    /// Live refresh interval in milliseconds
    pub refresh_interval_ms: u64,

    /// Fixed RNG seed for reproducible runs; OS entropy when unset
    pub seed: Option<u64>,

    /// Start with live monitoring enabled
    pub start_monitoring: bool,

    /// Random current range (A)
    pub current_min_a: f64,
    pub current_max_a: f64,

    /// Synthetic temperature range (°C)
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,

    /// Half-width of the per-tick voltage jitter (V)
    pub voltage_jitter_v: f64,

    /// Half-width of the per-tick current jitter (A)
    pub current_jitter_a: f64,
}

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AlertsConfig {
    /// Alert when a cell is hotter than this (°C)
    pub high_temperature_c: f64,

    /// Alert when state of charge drops below this (%)
    pub low_soc_percent: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Console level override
    pub console_level: Option<String>,

    /// File level override
    pub file_level: Option<String>,

    /// Web stream level override
    pub web_level: Option<String>,

    /// Path to log file (or directory for rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Directory with static front-end assets served under /ui
    pub static_dir: String,
}

impl CellsConfig {
    /// Reading used for slots without an explicit initial value
    pub fn default_reading(&self) -> CellReading {
        CellReading::new(
            &self.default_chemistry,
            self.default_voltage,
            self.default_current,
        )
    }

    /// One reading per slot: explicit initial values first, defaults after
    pub fn initial_readings(&self) -> Vec<CellReading> {
        (0..self.count)
            .map(|i| {
                self.initial
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| self.default_reading())
            })
            .collect()
    }
}

/// Check an operator-entered reading against the input ranges
pub fn validate_reading(reading: &CellReading, profiles: &ProfileTable) -> Result<()> {
    if !profiles.contains(&reading.chemistry) {
        return Err(CellbenchError::unknown_chemistry(reading.chemistry.clone()));
    }
    let (vmin, vmax) = INPUT_VOLTAGE_RANGE;
    if !reading.voltage.is_finite() || reading.voltage < vmin || reading.voltage > vmax {
        return Err(CellbenchError::validation(
            "voltage",
            format!("Must be between {} and {} V", vmin, vmax),
        ));
    }
    let (imin, imax) = INPUT_CURRENT_RANGE;
    if !reading.current.is_finite() || reading.current < imin || reading.current > imax {
        return Err(CellbenchError::validation(
            "current",
            format!("Must be between {} and {} A", imin, imax),
        ));
    }
    Ok(())
}

/// Bounds of a uniform draw: ordered, and the span must fit in an f64
fn check_range(field: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(CellbenchError::validation(
            field,
            "Minimum must not exceed maximum",
        ));
    }
    if !(max - min).is_finite() {
        return Err(CellbenchError::validation(field, "Range is too wide"));
    }
    Ok(())
}

/// Half-width of a symmetric draw `[-jitter, jitter]`
fn check_jitter(field: &str, jitter: f64) -> Result<()> {
    check_non_negative(field, jitter)?;
    if !(2.0 * jitter).is_finite() {
        return Err(CellbenchError::validation(field, "Jitter is too wide"));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CellbenchError::validation(field, "Must be zero or positive"));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `$CELLBENCH_CONFIG` or the default locations
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        let default_paths = ["cellbench.yaml", "/etc/cellbench/config.yaml"];
        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Built-in profiles merged with the configured extras
    pub fn profile_table(&self) -> Result<ProfileTable> {
        ProfileTable::with_extra(&self.chemistries)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bench.name.trim().is_empty() {
            return Err(CellbenchError::validation(
                "bench.name",
                "Bench name cannot be empty",
            ));
        }
        if self.bench.group_number == 0 {
            return Err(CellbenchError::validation(
                "bench.group_number",
                "Must be 1 or greater",
            ));
        }

        // Cells
        if self.cells.count == 0 || self.cells.count > MAX_CELLS {
            return Err(CellbenchError::validation(
                "cells.count",
                format!("Must be between 1 and {}", MAX_CELLS),
            ));
        }
        if self.cells.initial.len() > self.cells.count {
            return Err(CellbenchError::validation(
                "cells.initial",
                "More initial readings than cell slots",
            ));
        }
        let profiles = self.profile_table()?;
        validate_reading(&self.cells.default_reading(), &profiles)?;
        for reading in &self.cells.initial {
            validate_reading(reading, &profiles)?;
        }

        // Simulation
        let sim = &self.simulation;
        if sim.refresh_interval_ms == 0 {
            return Err(CellbenchError::validation(
                "simulation.refresh_interval_ms",
                "Must be greater than 0",
            ));
        }
        check_range("simulation.current", sim.current_min_a, sim.current_max_a)?;
        check_non_negative("simulation.current_min_a", sim.current_min_a)?;
        check_range(
            "simulation.temperature",
            sim.temperature_min_c,
            sim.temperature_max_c,
        )?;
        check_jitter("simulation.voltage_jitter_v", sim.voltage_jitter_v)?;
        check_jitter("simulation.current_jitter_a", sim.current_jitter_a)?;

        // Alerts
        if !self.alerts.high_temperature_c.is_finite() {
            return Err(CellbenchError::validation(
                "alerts.high_temperature_c",
                "Must be a finite number",
            ));
        }
        if !(0.0..=100.0).contains(&self.alerts.low_soc_percent) {
            return Err(CellbenchError::validation(
                "alerts.low_soc_percent",
                "Must be between 0 and 100",
            ));
        }

        // Logging
        crate::logging::parse_log_level(&self.logging.level)?;
        for level in [
            &self.logging.console_level,
            &self.logging.file_level,
            &self.logging.web_level,
        ]
        .into_iter()
        .flatten()
        {
            crate::logging::parse_log_level(level)?;
        }

        // Web
        if self.web.host.is_empty() {
            return Err(CellbenchError::validation(
                "web.host",
                "Bind address cannot be empty",
            ));
        }
        if self.web.port == 0 {
            return Err(CellbenchError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}
