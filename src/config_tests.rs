#![cfg(test)]

use super::calculator::CellReading;
use super::config::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.bench.name, "Lab Bench A");
    assert_eq!(config.bench.group_number, 1);
    assert_eq!(config.cells.count, 8);
    assert_eq!(config.simulation.refresh_interval_ms, 1000);
    assert!(!config.simulation.start_monitoring);
    assert_eq!(config.web.port, 8090);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.bench.group_number = 0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.cells.count = 0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.cells.default_chemistry = "XYZ".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.simulation.current_min_a = 3.0;
    assert!(config.validate().is_err());

    config = Config::default();
    config.logging.level = "LOUD".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_overflowing_simulation_ranges_rejected() {
    let mut config = Config::default();
    config.simulation.voltage_jitter_v = 1e308;
    assert!(config.validate().is_err());

    config = Config::default();
    config.simulation.current_jitter_a = f64::MAX;
    assert!(config.validate().is_err());

    config = Config::default();
    config.simulation.temperature_min_c = -1e308;
    config.simulation.temperature_max_c = 1e308;
    assert!(config.validate().is_err());

    config = Config::default();
    config.simulation.voltage_jitter_v = 0.5;
    config.simulation.temperature_min_c = -40.0;
    config.simulation.temperature_max_c = 85.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_initial_readings_fill_remaining_slots() {
    let mut config = Config::default();
    config.cells.count = 3;
    config.cells.initial = vec![CellReading::new("NMC", 3.7, 2.0)];
    let readings = config.cells.initial_readings();
    assert_eq!(readings.len(), 3);
    assert_eq!(readings[0].chemistry, "NMC");
    assert_eq!(readings[1], CellReading::new("LFP", 3.2, 1.0));
    assert_eq!(readings[2], CellReading::new("LFP", 3.2, 1.0));
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let yaml = "bench:\n  name: Bench B\ncells:\n  count: 4\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.bench.name, "Bench B");
    assert_eq!(config.bench.group_number, 1);
    assert_eq!(config.cells.count, 4);
    assert_eq!(config.cells.default_chemistry, "LFP");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config.web.port, deserialized.web.port);
    assert_eq!(config.cells.count, deserialized.cells.count);
}
