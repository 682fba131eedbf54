use super::*;

impl Default for Config {
    fn default() -> Self {
        Self {
            bench: BenchConfig::default(),
            cells: CellsConfig::default(),
            chemistries: Vec::new(),
            simulation: SimulationConfig::default(),
            alerts: AlertsConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            name: "Lab Bench A".to_string(),
            group_number: 1,
        }
    }
}

impl Default for CellsConfig {
    fn default() -> Self {
        Self {
            count: 8,
            default_chemistry: "LFP".to_string(),
            default_voltage: 3.2,
            default_current: 1.0,
            initial: Vec::new(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            seed: None,
            start_monitoring: false,
            current_min_a: 0.5,
            current_max_a: 2.5,
            temperature_min_c: 20.0,
            temperature_max_c: 45.0,
            voltage_jitter_v: 0.05,
            current_jitter_a: 0.1,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            high_temperature_c: 40.0,
            low_soc_percent: 20.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            web_level: None,
            file: "/tmp/cellbench.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
            static_dir: "./webui".to_string(),
        }
    }
}
