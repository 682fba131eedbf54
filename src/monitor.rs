//! Bench monitor
//!
//! [`CellMonitor`] owns the application state (bench identity, readings,
//! monitoring flag), the profile table and the simulator. Every change is
//! followed by a full re-evaluation whose [`MonitorSnapshot`] is published on
//! a watch channel for the web layer and the SSE feed.

use crate::alerts::{Alert, collect_alerts};
use crate::calculator::{CellReading, evaluate_batch};
use crate::chemistry::ProfileTable;
use crate::config::Config;
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::simulation::Simulator;
use crate::summary::summarize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

mod runtime;
mod state;
mod types;

pub use runtime::{run, supervise};
pub use state::MonitorState;
pub use types::MonitorSnapshot;

/// Version string stamped by build.rs
pub const APP_VERSION: &str = env!("APP_VERSION");

pub struct CellMonitor {
    config: Config,
    profiles: ProfileTable,
    state: MonitorState,
    simulator: Simulator,
    logger: StructuredLogger,
    snapshot_tx: watch::Sender<Arc<MonitorSnapshot>>,
    // Kept so the channel stays open with no external subscribers
    snapshot_rx: watch::Receiver<Arc<MonitorSnapshot>>,
}

fn bench_logger(bench: &str, group_number: u32) -> StructuredLogger {
    get_logger_with_context(
        LogContext::new("monitor")
            .with_bench(bench)
            .with_field("group", group_number.to_string()),
    )
}

impl CellMonitor {
    /// Build the monitor from a validated configuration and publish the
    /// first snapshot.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let profiles = config.profile_table()?;
        let state = MonitorState::from_config(&config);
        let mut simulator = Simulator::from_config(&config.simulation);
        let logger = bench_logger(&config.bench.name, config.bench.group_number);

        let initial = Self::build_snapshot(&config, &profiles, &state, &mut simulator)?;
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(initial));

        logger.info(&format!(
            "Monitoring {} cells across {} chemistries",
            state.readings.len(),
            profiles.len()
        ));

        Ok(Self {
            config,
            profiles,
            state,
            simulator,
            logger,
            snapshot_tx,
            snapshot_rx,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub(crate) fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.config.simulation.refresh_interval_ms)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<MonitorSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<MonitorSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Replace one reading (1-based slot) and re-evaluate
    pub fn set_cell(&mut self, index: usize, reading: CellReading) -> Result<Arc<MonitorSnapshot>> {
        self.state.set_cell(index, reading.clone(), &self.profiles)?;
        self.logger.with_cell(&format!("Cell_{}", index)).info(&format!(
            "Reading set: {} {} V {} A",
            reading.chemistry, reading.voltage, reading.current
        ));
        self.evaluate()
    }

    pub fn set_bench(&mut self, name: &str, group_number: u32) -> Result<Arc<MonitorSnapshot>> {
        self.state.set_bench(name, group_number)?;
        self.logger = bench_logger(&self.state.bench_name, self.state.group_number);
        self.logger
            .info(&format!("Bench set to group {}", group_number));
        self.evaluate()
    }

    /// Draw fresh random readings for every slot
    pub fn randomize(&mut self) -> Result<Arc<MonitorSnapshot>> {
        self.state.randomize(&mut self.simulator, &self.profiles)?;
        self.logger.info("Readings randomized");
        self.evaluate()
    }

    pub fn start_monitoring(&mut self) -> Result<Arc<MonitorSnapshot>> {
        if !self.state.monitoring_active {
            self.state.monitoring_active = true;
            self.logger.info("Live monitoring started");
        }
        self.evaluate()
    }

    pub fn stop_monitoring(&mut self) -> Result<Arc<MonitorSnapshot>> {
        if self.state.monitoring_active {
            self.state.monitoring_active = false;
            self.logger.info("Live monitoring stopped");
        }
        self.evaluate()
    }

    /// One live step; `None` when monitoring is off
    pub fn tick(&mut self) -> Result<Option<Arc<MonitorSnapshot>>> {
        if !self.state.tick(&mut self.simulator) {
            return Ok(None);
        }
        self.logger
            .trace(&format!("Tick {}", self.state.tick_count));
        self.evaluate().map(Some)
    }

    /// Evaluate the current readings and publish the snapshot
    pub fn evaluate(&mut self) -> Result<Arc<MonitorSnapshot>> {
        let snapshot = Arc::new(Self::build_snapshot(
            &self.config,
            &self.profiles,
            &self.state,
            &mut self.simulator,
        )?);
        let previous = self.snapshot_tx.send_replace(snapshot.clone());
        self.log_new_alerts(&previous.alerts, &snapshot.alerts);
        Ok(snapshot)
    }

    fn log_new_alerts(&self, previous: &[Alert], current: &[Alert]) {
        for alert in current {
            let seen = previous
                .iter()
                .any(|p| p.kind == alert.kind && p.cell_id == alert.cell_id);
            if !seen {
                self.logger.with_cell(&alert.cell_id).warn(&alert.message);
            }
        }
    }

    fn build_snapshot(
        config: &Config,
        profiles: &ProfileTable,
        state: &MonitorState,
        simulator: &mut Simulator,
    ) -> Result<MonitorSnapshot> {
        let cells = evaluate_batch(profiles, &state.readings, simulator)?;
        let alerts = collect_alerts(&cells, &config.alerts);
        let summary = summarize(&cells);
        Ok(MonitorSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: APP_VERSION.to_string(),
            bench_name: state.bench_name.clone(),
            group_number: state.group_number,
            monitoring_active: state.monitoring_active,
            tick_count: state.tick_count,
            cells,
            alerts,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::CellStatus;
    use crate::error::CellbenchError;

    fn monitor() -> CellMonitor {
        let mut config = Config::default();
        config.simulation.seed = Some(17);
        CellMonitor::new(config).unwrap()
    }

    #[test]
    fn initial_snapshot_covers_all_slots() {
        let m = monitor();
        let snap = m.snapshot();
        assert_eq!(snap.cells.len(), 8);
        assert_eq!(snap.cells[7].cell_id, "Cell_8");
        assert_eq!(snap.bench_name, "Lab Bench A");
        assert!(!snap.monitoring_active);
        assert_eq!(snap.summary.cell_count, 8);
        assert!(snap.cells.iter().all(|c| c.status == CellStatus::Normal));
    }

    #[test]
    fn set_cell_is_reflected_in_snapshot() {
        let mut m = monitor();
        let snap = m.set_cell(2, CellReading::new("LFP", 2.8, 1.0)).unwrap();
        let cell = &snap.cells[1];
        assert_eq!(cell.cell_id, "Cell_2");
        assert_eq!(cell.status, CellStatus::Low);
        assert_eq!(cell.soc, 0.0);
        assert!(snap.alerts.iter().any(|a| a.cell_id == "Cell_2"));
        assert_eq!(m.snapshot(), snap);
    }

    #[test]
    fn unknown_chemistry_leaves_state_untouched() {
        let mut m = monitor();
        let before = m.state().clone();
        let err = m.set_cell(1, CellReading::new("XYZ", 3.0, 1.0)).unwrap_err();
        assert!(matches!(err, CellbenchError::UnknownChemistry { .. }));
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn start_tick_stop() {
        let mut m = monitor();
        assert!(m.tick().unwrap().is_none());

        assert!(m.start_monitoring().unwrap().monitoring_active);
        let snap = m.tick().unwrap().unwrap();
        assert_eq!(snap.tick_count, 1);

        assert!(!m.stop_monitoring().unwrap().monitoring_active);
        assert!(m.tick().unwrap().is_none());
    }

    #[test]
    fn set_bench_rescopes_logger() {
        let mut m = monitor();
        assert_eq!(m.logger().context().extra_fields.get("group").map(String::as_str), Some("1"));

        m.set_bench("Bench C", 4).unwrap();
        let context = m.logger().context();
        assert_eq!(context.bench.as_deref(), Some("Bench C"));
        assert_eq!(context.extra_fields.get("group").map(String::as_str), Some("4"));
    }

    #[test]
    fn subscribers_see_updates() {
        let mut m = monitor();
        let mut rx = m.subscribe_snapshot();
        let _ = rx.borrow_and_update();
        m.randomize().unwrap();
        assert!(rx.has_changed().unwrap());
    }
}
