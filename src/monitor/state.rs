use crate::calculator::CellReading;
use crate::chemistry::ProfileTable;
use crate::config::{Config, validate_reading};
use crate::error::{CellbenchError, Result};
use crate::simulation::Simulator;
use rand::Rng;

/// Explicit application state: bench identity, cell readings and the
/// monitoring flag. Owned by [`super::CellMonitor`], never global.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorState {
    pub bench_name: String,
    pub group_number: u32,
    pub readings: Vec<CellReading>,
    pub monitoring_active: bool,
    pub tick_count: u64,
}

impl MonitorState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bench_name: config.bench.name.clone(),
            group_number: config.bench.group_number,
            readings: config.cells.initial_readings(),
            monitoring_active: config.simulation.start_monitoring,
            tick_count: 0,
        }
    }

    /// Replace the reading in 1-based slot `index`
    pub fn set_cell(
        &mut self,
        index: usize,
        reading: CellReading,
        profiles: &ProfileTable,
    ) -> Result<()> {
        if index == 0 || index > self.readings.len() {
            return Err(CellbenchError::validation(
                "index",
                format!("Cell index must be between 1 and {}", self.readings.len()),
            ));
        }
        validate_reading(&reading, profiles)?;
        self.readings[index - 1] = reading;
        Ok(())
    }

    pub fn set_bench(&mut self, name: &str, group_number: u32) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CellbenchError::validation(
                "bench.name",
                "Bench name cannot be empty",
            ));
        }
        if group_number == 0 {
            return Err(CellbenchError::validation(
                "bench.group_number",
                "Must be 1 or greater",
            ));
        }
        self.bench_name = name.trim().to_string();
        self.group_number = group_number;
        Ok(())
    }

    /// Fresh random voltage (for each slot's chemistry) and current
    pub fn randomize<R: Rng>(
        &mut self,
        simulator: &mut Simulator<R>,
        profiles: &ProfileTable,
    ) -> Result<()> {
        for reading in &mut self.readings {
            let profile = profiles.get(&reading.chemistry)?;
            reading.voltage = simulator.random_voltage(profile);
            reading.current = simulator.random_current();
        }
        Ok(())
    }

    /// Apply one perturbation step when monitoring; returns whether it ran
    pub fn tick<R: Rng>(&mut self, simulator: &mut Simulator<R>) -> bool {
        if !self.monitoring_active {
            return false;
        }
        for reading in &mut self.readings {
            simulator.perturb(reading);
        }
        self.tick_count += 1;
        true
    }
}
