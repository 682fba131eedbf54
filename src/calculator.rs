//! Cell calculator
//!
//! Pure functions turning a chemistry profile and an instantaneous
//! voltage/current reading into state-of-charge, status and power. Nothing
//! here owns state; the batch evaluator takes its temperature source as an
//! argument so callers decide where synthetic temperatures come from.

use crate::chemistry::{ChemistryProfile, ProfileTable};
use crate::error::Result;
use crate::simulation::TemperatureSource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Voltage at or below `minimum * LOW_VOLTAGE_FACTOR` is LOW
pub const LOW_VOLTAGE_FACTOR: f64 = 1.05;

/// Voltage at or above `maximum * HIGH_VOLTAGE_FACTOR` is HIGH
pub const HIGH_VOLTAGE_FACTOR: f64 = 0.95;

/// Coarse classification of a reading against its chemistry band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum CellStatus {
    Low,
    Normal,
    High,
}

impl CellStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CellStatus::Low => "LOW",
            CellStatus::Normal => "NORMAL",
            CellStatus::High => "HIGH",
        }
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instantaneous reading for one cell slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CellReading {
    /// Chemistry identifier, must exist in the profile table
    #[serde(rename = "type")]
    pub chemistry: String,

    /// Terminal voltage in volts
    pub voltage: f64,

    /// Current in amperes
    pub current: f64,
}

impl CellReading {
    pub fn new(chemistry: &str, voltage: f64, current: f64) -> Self {
        Self {
            chemistry: chemistry.to_string(),
            voltage,
            current,
        }
    }
}

/// Evaluated cell, one per input reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CellResult {
    #[serde(rename = "Cell_ID")]
    pub cell_id: String,
    #[serde(rename = "Type")]
    pub chemistry: String,
    #[serde(rename = "Voltage_V")]
    pub voltage: f64,
    #[serde(rename = "Current_A")]
    pub current: f64,
    #[serde(rename = "Power_W")]
    pub power: f64,
    #[serde(rename = "Temperature_C")]
    pub temperature: f64,
    #[serde(rename = "SOC_%")]
    pub soc: f64,
    #[serde(rename = "Status")]
    pub status: CellStatus,
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// State of charge in percent, linear in the chemistry's voltage band.
///
/// Rounded to one decimal, then clamped to `[0, 100]`; voltages outside the
/// band saturate instead of failing.
pub fn state_of_charge(voltage: f64, profile: &ChemistryProfile) -> f64 {
    let soc = (voltage - profile.minimum_voltage) / profile.voltage_span() * 100.0;
    round_to(soc, 1).clamp(0.0, 100.0)
}

/// Classify a voltage as LOW, NORMAL or HIGH. LOW wins if both thresholds match.
pub fn classify_status(voltage: f64, profile: &ChemistryProfile) -> CellStatus {
    if voltage <= profile.minimum_voltage * LOW_VOLTAGE_FACTOR {
        CellStatus::Low
    } else if voltage >= profile.maximum_voltage * HIGH_VOLTAGE_FACTOR {
        CellStatus::High
    } else {
        CellStatus::Normal
    }
}

/// Unrounded `voltage * current`, for chaining into further computation
pub fn raw_power(voltage: f64, current: f64) -> f64 {
    voltage * current
}

/// Display power in watts, rounded to two decimals
pub fn power(voltage: f64, current: f64) -> f64 {
    round_to(raw_power(voltage, current), 2)
}

/// Evaluate one reading at 1-based position `position`
pub fn evaluate_cell<T>(
    profiles: &ProfileTable,
    position: usize,
    reading: &CellReading,
    temperature: &mut T,
) -> Result<CellResult>
where
    T: TemperatureSource + ?Sized,
{
    let profile = profiles.get(&reading.chemistry)?;
    Ok(CellResult {
        cell_id: format!("Cell_{}", position),
        chemistry: reading.chemistry.clone(),
        voltage: reading.voltage,
        current: reading.current,
        power: power(reading.voltage, reading.current),
        temperature: temperature.sample_temperature(),
        soc: state_of_charge(reading.voltage, profile),
        status: classify_status(reading.voltage, profile),
    })
}

/// Evaluate every reading in order, numbering cells `Cell_1..Cell_N`.
///
/// Fails on the first reading whose chemistry is not in `profiles`.
pub fn evaluate_batch<T>(
    profiles: &ProfileTable,
    readings: &[CellReading],
    temperature: &mut T,
) -> Result<Vec<CellResult>>
where
    T: TemperatureSource + ?Sized,
{
    readings
        .iter()
        .enumerate()
        .map(|(i, reading)| evaluate_cell(profiles, i + 1, reading, temperature))
        .collect()
}
