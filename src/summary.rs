//! Summary statistics and analytics over an evaluated batch
//!
//! Means, sample standard deviations, totals, distribution counts, per-cell
//! efficiency and a Pearson correlation matrix across the numeric columns.
//! Undefined values (empty input, a single sample, zero variance) are `None`
//! rather than NaN so they serialize cleanly.

use crate::calculator::{CellResult, CellStatus, raw_power};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Mean and sample standard deviation of one column
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ColumnStats {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

impl ColumnStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std_dev: sample_std_dev(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusCounts {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChemistryCount {
    pub chemistry: String,
    pub count: usize,
}

/// `power / (voltage * current) * 100`, `None` when the product is zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CellEfficiency {
    pub cell_id: String,
    pub efficiency_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `values[i][j]` correlates `labels[i]` with `labels[j]`
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BatchSummary {
    pub cell_count: usize,
    pub voltage: ColumnStats,
    pub current: ColumnStats,
    pub temperature: ColumnStats,
    pub total_power: f64,
    pub mean_power: Option<f64>,
    pub status_counts: StatusCounts,
    /// Most common chemistry first
    pub chemistry_counts: Vec<ChemistryCount>,
    pub efficiency: Vec<CellEfficiency>,
    pub correlation: CorrelationMatrix,
}

pub const CORRELATION_COLUMNS: [&str; 5] =
    ["Voltage_V", "Current_A", "Power_W", "Temperature_C", "SOC_%"];

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `n - 1` in the denominator
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation; `None` for mismatched lengths, fewer than two
/// samples or a constant series
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

pub fn efficiency(cell: &CellResult) -> Option<f64> {
    let denominator = raw_power(cell.voltage, cell.current);
    if denominator == 0.0 {
        None
    } else {
        Some(cell.power / denominator * 100.0)
    }
}

fn column(cells: &[CellResult], f: impl Fn(&CellResult) -> f64) -> Vec<f64> {
    cells.iter().map(f).collect()
}

pub fn correlation_matrix(cells: &[CellResult]) -> CorrelationMatrix {
    let columns = [
        column(cells, |c| c.voltage),
        column(cells, |c| c.current),
        column(cells, |c| c.power),
        column(cells, |c| c.temperature),
        column(cells, |c| c.soc),
    ];
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();
    CorrelationMatrix {
        labels: CORRELATION_COLUMNS.iter().map(|s| s.to_string()).collect(),
        values,
    }
}

fn chemistry_counts(cells: &[CellResult]) -> Vec<ChemistryCount> {
    let mut counts: Vec<ChemistryCount> = Vec::new();
    for cell in cells {
        match counts.iter_mut().find(|c| c.chemistry == cell.chemistry) {
            Some(entry) => entry.count += 1,
            None => counts.push(ChemistryCount {
                chemistry: cell.chemistry.clone(),
                count: 1,
            }),
        }
    }
    // stable: ties keep first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn summarize(cells: &[CellResult]) -> BatchSummary {
    let voltages = column(cells, |c| c.voltage);
    let currents = column(cells, |c| c.current);
    let temperatures = column(cells, |c| c.temperature);
    let powers = column(cells, |c| c.power);

    let mut status_counts = StatusCounts::default();
    for cell in cells {
        match cell.status {
            CellStatus::Low => status_counts.low += 1,
            CellStatus::Normal => status_counts.normal += 1,
            CellStatus::High => status_counts.high += 1,
        }
    }

    BatchSummary {
        cell_count: cells.len(),
        voltage: ColumnStats::from_values(&voltages),
        current: ColumnStats::from_values(&currents),
        temperature: ColumnStats::from_values(&temperatures),
        total_power: powers.iter().sum(),
        mean_power: mean(&powers),
        status_counts,
        chemistry_counts: chemistry_counts(cells),
        efficiency: cells
            .iter()
            .map(|c| CellEfficiency {
                cell_id: c.cell_id.clone(),
                efficiency_percent: efficiency(c),
            })
            .collect(),
        correlation: correlation_matrix(cells),
    }
}
