use crate::alerts::Alert;
use crate::calculator::CellResult;
use crate::summary::BatchSummary;
use serde::{Deserialize, Serialize};

/// Everything a front-end needs to draw one refresh of the bench
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MonitorSnapshot {
    /// RFC 3339 time the snapshot was evaluated
    pub timestamp: String,
    pub version: String,
    pub bench_name: String,
    pub group_number: u32,
    pub monitoring_active: bool,
    /// Live ticks applied since startup
    pub tick_count: u64,
    pub cells: Vec<CellResult>,
    pub alerts: Vec<Alert>,
    pub summary: BatchSummary,
}

impl MonitorSnapshot {
    /// True when no alert is active
    pub fn all_normal(&self) -> bool {
        self.alerts.is_empty()
    }
}
