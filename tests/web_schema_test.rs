use cellbench::chemistry::{ChemistryProfile, ProfileTable};

#[test]
fn web_schema_has_expected_sections_and_fields() {
    let schema = cellbench::web_schema::build_ui_schema(&ProfileTable::default());
    let sections = schema.get("sections").and_then(|v| v.as_object()).unwrap();
    for key in ["bench", "cells", "simulation", "alerts", "logging", "web"] {
        assert!(sections.get(key).is_some(), "missing section: {}", key);
    }

    let bench = sections.get("bench").unwrap().get("fields").unwrap();
    assert!(bench.get("name").is_some());
    assert!(bench.get("group_number").is_some());

    let item = &sections["cells"]["fields"]["initial"]["item"]["fields"];
    assert_eq!(item["voltage"]["min"], 0.0);
    assert_eq!(item["voltage"]["max"], 5.0);
    assert_eq!(item["current"]["max"], 10.0);
    assert_eq!(item["voltage"]["step"], 0.1);
}

#[test]
fn chemistry_choices_follow_profile_table() {
    let table = ProfileTable::with_extra(&[ChemistryProfile::new(
        "NCA",
        3.6,
        3.0,
        4.2,
        "Nickel Cobalt Aluminium",
    )])
    .unwrap();
    let schema = cellbench::web_schema::build_ui_schema(&table);
    let values: Vec<&str> = schema["sections"]["cells"]["fields"]["default_chemistry"]["values"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(values, vec!["LFP", "NMC", "LCO", "LTO", "NCA"]);
}
