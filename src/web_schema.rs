//! UI-oriented configuration schema for a web front-end
//!
//! Describes the editable configuration and cell inputs as a form layout
//! (titles, bounds, steps, enum choices) that a front-end can render without
//! hard-coding the chemistry list or input ranges.

use crate::chemistry::ProfileTable;
use crate::config::{INPUT_CURRENT_RANGE, INPUT_VOLTAGE_RANGE, MAX_CELLS};
use serde_json::{Value, json};

/// Build the UI form schema for the given profile table
pub fn build_ui_schema(profiles: &ProfileTable) -> Value {
    let chemistries: Vec<&str> = profiles.ids().collect();
    let (vmin, vmax) = INPUT_VOLTAGE_RANGE;
    let (imin, imax) = INPUT_CURRENT_RANGE;

    json!({
        "sections": {
            "bench": {"title": "Bench", "type": "object", "fields": {
                "name": {"type": "string", "title": "Bench name"},
                "group_number": {"type": "integer", "min": 1, "title": "Group number"}
            }},
            "cells": {"title": "Cell configuration", "type": "object", "fields": {
                "count": {"type": "integer", "min": 1, "max": MAX_CELLS, "title": "Cell slots"},
                "default_chemistry": {"type": "enum", "values": chemistries, "title": "Default type"},
                "default_voltage": {"type": "number", "min": vmin, "max": vmax, "step": 0.1, "title": "Default voltage (V)"},
                "default_current": {"type": "number", "min": imin, "max": imax, "step": 0.1, "title": "Default current (A)"},
                "initial": {"type": "list", "item": {"type": "object", "fields": {
                    "type": {"type": "enum", "values": chemistries, "title": "Type"},
                    "voltage": {"type": "number", "min": vmin, "max": vmax, "step": 0.1, "title": "Voltage (V)"},
                    "current": {"type": "number", "min": imin, "max": imax, "step": 0.1, "title": "Current (A)"}
                }}}
            }},
            "simulation": {"title": "Simulation", "type": "object", "fields": {
                "refresh_interval_ms": {"type": "integer", "min": 100, "max": 60000, "title": "Refresh interval (ms)"},
                "seed": {"type": "integer", "min": 0, "title": "Random seed (optional)"},
                "start_monitoring": {"type": "boolean", "title": "Start monitoring on launch"},
                "current_min_a": {"type": "number", "min": 0.0, "step": 0.1, "title": "Random current min (A)"},
                "current_max_a": {"type": "number", "min": 0.0, "step": 0.1, "title": "Random current max (A)"},
                "temperature_min_c": {"type": "number", "step": 0.5, "title": "Temperature min (°C)"},
                "temperature_max_c": {"type": "number", "step": 0.5, "title": "Temperature max (°C)"},
                "voltage_jitter_v": {"type": "number", "min": 0.0, "step": 0.01, "title": "Voltage jitter per tick (V)"},
                "current_jitter_a": {"type": "number", "min": 0.0, "step": 0.01, "title": "Current jitter per tick (A)"}
            }},
            "alerts": {"title": "Alerts", "type": "object", "fields": {
                "high_temperature_c": {"type": "number", "step": 0.5, "title": "High temperature (°C)"},
                "low_soc_percent": {"type": "number", "min": 0.0, "max": 100.0, "step": 1.0, "title": "Low state of charge (%)"}
            }},
            "logging": {"title": "Logging", "type": "object", "fields": {
                "level": {"type": "enum", "values": ["TRACE","DEBUG","INFO","WARN","ERROR"], "title": "Level"},
                "file": {"type": "string", "title": "File path"},
                "backup_count": {"type": "integer", "min": 0, "title": "Backups"},
                "console_output": {"type": "boolean", "title": "Console output"},
                "json_format": {"type": "boolean", "title": "JSON format"}
            }},
            "web": {"title": "Web", "type": "object", "fields": {
                "host": {"type": "string", "title": "Bind address"},
                "port": {"type": "integer", "min": 1, "max": 65535, "title": "Port"},
                "static_dir": {"type": "string", "title": "Static assets directory"}
            }}
        }
    })
}
