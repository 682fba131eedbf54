use cellbench::calculator::{CellReading, CellStatus, evaluate_batch};
use cellbench::chemistry::ProfileTable;
use cellbench::error::CellbenchError;
use cellbench::simulation::FixedTemperature;

#[test]
fn batch_evaluation_end_to_end() {
    let profiles = ProfileTable::default();
    let readings = vec![
        CellReading::new("LFP", 2.8, 1.0),
        CellReading::new("NMC", 3.6, 2.0),
        CellReading::new("LCO", 4.2, 0.5),
    ];
    let cells = evaluate_batch(&profiles, &readings, &mut FixedTemperature(25.0)).unwrap();
    assert_eq!(cells.len(), 3);

    assert_eq!(cells[0].cell_id, "Cell_1");
    assert_eq!(cells[0].soc, 0.0);
    assert_eq!(cells[0].status, CellStatus::Low);
    assert_eq!(cells[0].power, 2.8);

    assert_eq!(cells[1].cell_id, "Cell_2");
    assert_eq!(cells[1].soc, 50.0);
    assert_eq!(cells[1].status, CellStatus::Normal);
    assert_eq!(cells[1].power, 7.2);

    assert_eq!(cells[2].soc, 100.0);
    assert_eq!(cells[2].status, CellStatus::High);
    assert!(cells.iter().all(|c| c.temperature == 25.0));
}

#[test]
fn unknown_chemistry_aborts_batch() {
    let profiles = ProfileTable::default();
    let readings = vec![
        CellReading::new("LFP", 3.2, 1.0),
        CellReading::new("XYZ", 3.2, 1.0),
    ];
    let err = evaluate_batch(&profiles, &readings, &mut FixedTemperature(25.0)).unwrap_err();
    assert!(matches!(err, CellbenchError::UnknownChemistry { ref chemistry } if chemistry == "XYZ"));
}

#[test]
fn result_rows_use_dashboard_column_names() {
    let profiles = ProfileTable::default();
    let readings = vec![CellReading::new("LTO", 2.4, 1.0)];
    let cells = evaluate_batch(&profiles, &readings, &mut FixedTemperature(30.5)).unwrap();
    let row = serde_json::to_value(&cells[0]).unwrap();
    for key in [
        "Cell_ID",
        "Type",
        "Voltage_V",
        "Current_A",
        "Power_W",
        "Temperature_C",
        "SOC_%",
        "Status",
    ] {
        assert!(row.get(key).is_some(), "missing column {}", key);
    }
    assert_eq!(row["Status"], "NORMAL");
    assert_eq!(row["Temperature_C"], 30.5);
}
