use cellbench::error::CellbenchError;

#[test]
fn error_constructors() {
    assert!(matches!(
        CellbenchError::config("x"),
        CellbenchError::Config { .. }
    ));
    assert!(matches!(
        CellbenchError::unknown_chemistry("XYZ"),
        CellbenchError::UnknownChemistry { .. }
    ));
    assert!(matches!(
        CellbenchError::validation("f", "m"),
        CellbenchError::Validation { .. }
    ));
    assert!(matches!(CellbenchError::web("x"), CellbenchError::Web { .. }));
    assert!(matches!(CellbenchError::io("x"), CellbenchError::Io { .. }));
}

#[test]
fn conversions_from_library_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(CellbenchError::from(io), CellbenchError::Io { .. }));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        CellbenchError::from(json),
        CellbenchError::Serialization { .. }
    ));
}

#[test]
fn display_messages() {
    let e = CellbenchError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
    assert_eq!(
        CellbenchError::unknown_chemistry("XYZ").to_string(),
        "Unknown chemistry: XYZ"
    );
}
