//! On-screen alerts derived from evaluated cells

use crate::calculator::{CellResult, CellStatus};
use crate::config::AlertsConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What triggered an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowVoltage,
    HighVoltage,
    HighTemperature,
    LowStateOfCharge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Alert {
    pub kind: AlertKind,
    pub cell_id: String,
    /// Offending reading in the unit of the alert kind
    pub value: f64,
    pub message: String,
}

/// Whole numbers keep one decimal, so 3.0 reads "3.0" rather than "3"
fn display_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

impl Alert {
    fn new(kind: AlertKind, cell_id: &str, value: f64) -> Self {
        let shown = display_value(value);
        let detail = match kind {
            AlertKind::LowVoltage => format!("Low voltage ({}V)", shown),
            AlertKind::HighVoltage => format!("High voltage ({}V)", shown),
            AlertKind::HighTemperature => format!("High temperature ({}°C)", shown),
            AlertKind::LowStateOfCharge => format!("Low state of charge ({}%)", shown),
        };
        Self {
            kind,
            cell_id: cell_id.to_string(),
            value,
            message: format!("{}: {}", cell_id, detail),
        }
    }
}

/// Alerts for every cell, in cell order; per cell: voltage, temperature, SOC.
pub fn collect_alerts(cells: &[CellResult], limits: &AlertsConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for cell in cells {
        match cell.status {
            CellStatus::Low => alerts.push(Alert::new(AlertKind::LowVoltage, &cell.cell_id, cell.voltage)),
            CellStatus::High => {
                alerts.push(Alert::new(AlertKind::HighVoltage, &cell.cell_id, cell.voltage))
            }
            CellStatus::Normal => {}
        }
        if cell.temperature > limits.high_temperature_c {
            alerts.push(Alert::new(
                AlertKind::HighTemperature,
                &cell.cell_id,
                cell.temperature,
            ));
        }
        if cell.soc < limits.low_soc_percent {
            alerts.push(Alert::new(AlertKind::LowStateOfCharge, &cell.cell_id, cell.soc));
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, voltage: f64, temperature: f64, soc: f64, status: CellStatus) -> CellResult {
        CellResult {
            cell_id: id.to_string(),
            chemistry: "LFP".to_string(),
            voltage,
            current: 1.0,
            power: voltage,
            temperature,
            soc,
            status,
        }
    }

    #[test]
    fn healthy_cells_raise_nothing() {
        let cells = vec![cell("Cell_1", 3.2, 25.0, 50.0, CellStatus::Normal)];
        assert!(collect_alerts(&cells, &AlertsConfig::default()).is_empty());
    }

    #[test]
    fn low_cell_raises_voltage_and_soc_alerts() {
        let cells = vec![cell("Cell_1", 2.8, 25.0, 0.0, CellStatus::Low)];
        let alerts = collect_alerts(&cells, &AlertsConfig::default());
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::LowVoltage, AlertKind::LowStateOfCharge]);
        assert_eq!(alerts[0].message, "Cell_1: Low voltage (2.8V)");
        assert_eq!(alerts[1].message, "Cell_1: Low state of charge (0.0%)");
    }

    #[test]
    fn thresholds_are_strict() {
        let limits = AlertsConfig::default();
        let at_limit = vec![cell("Cell_1", 3.2, 40.0, 20.0, CellStatus::Normal)];
        assert!(collect_alerts(&at_limit, &limits).is_empty());

        let over = vec![cell("Cell_2", 3.5, 40.1, 19.9, CellStatus::High)];
        let alerts = collect_alerts(&over, &limits);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::HighVoltage,
                AlertKind::HighTemperature,
                AlertKind::LowStateOfCharge
            ]
        );
        assert_eq!(alerts[1].message, "Cell_2: High temperature (40.1°C)");
    }

    #[test]
    fn whole_values_keep_one_decimal() {
        let cells = vec![
            cell("Cell_3", 3.0, 45.0, 10.0, CellStatus::Low),
            cell("Cell_4", 4.25, 25.0, 50.0, CellStatus::High),
        ];
        let alerts = collect_alerts(&cells, &AlertsConfig::default());
        let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Cell_3: Low voltage (3.0V)",
                "Cell_3: High temperature (45.0°C)",
                "Cell_3: Low state of charge (10.0%)",
                "Cell_4: High voltage (4.25V)",
            ]
        );
    }

    #[test]
    fn alerts_follow_cell_order() {
        let cells = vec![
            cell("Cell_1", 3.2, 41.0, 50.0, CellStatus::Normal),
            cell("Cell_2", 2.8, 25.0, 30.0, CellStatus::Low),
        ];
        let alerts = collect_alerts(&cells, &AlertsConfig::default());
        let ids: Vec<&str> = alerts.iter().map(|a| a.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["Cell_1", "Cell_2"]);
    }
}
