use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cellbench::calculator::CellReading;
use cellbench::config::Config;
use cellbench::monitor::CellMonitor;
use cellbench::web::{AppState, build_router};
use http_body_util::BodyExt as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;

const EXPECTED: &str = "Cell_1: Low voltage (2.8V)";

#[tokio::test]
async fn low_voltage_alert_reaches_log_stream() {
    let log_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.simulation.seed = Some(5);
    config.logging.console_output = false;
    config.logging.file = log_dir.path().join("bench.log").to_string_lossy().into_owned();
    cellbench::logging::init_logging(&config.logging).unwrap();

    let monitor = Arc::new(Mutex::new(CellMonitor::new(config).unwrap()));
    let snapshot_rx = monitor.lock().await.subscribe_snapshot();
    let router = build_router(AppState::new(monitor.clone(), snapshot_rx), "./webui");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/logs/stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("text/event-stream"));

    // The stream is subscribed once the handler has run
    let snap = monitor
        .lock()
        .await
        .set_cell(1, CellReading::new("LFP", 2.8, 1.0))
        .unwrap();
    assert!(snap.alerts.iter().any(|a| a.message == EXPECTED));

    let mut body = response.into_body();
    let mut received = String::new();
    let found = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(frame)) = body.frame().await {
            if let Some(data) = frame.data_ref() {
                received.push_str(&String::from_utf8_lossy(data));
                if received.contains(EXPECTED) {
                    return true;
                }
            }
        }
        false
    })
    .await;

    assert_eq!(found, Ok(true), "no alert line in stream: {}", received);
    assert!(received.contains("event: log"), "{}", received);
    let alert_line = received
        .lines()
        .find(|l| l.contains(EXPECTED))
        .unwrap_or_default();
    assert!(alert_line.starts_with("data:"), "{}", alert_line);
    assert!(alert_line.contains("WARN"), "{}", alert_line);
}
