//! Axum-based HTTP server: JSON API, snapshot SSE feed and static UI
//!
//! Reads go through the snapshot watch channel and never take the monitor
//! lock; mutations lock the monitor, apply the change and return the freshly
//! published snapshot.

pub mod logs;

use crate::calculator::{CellReading, CellResult};
use crate::chemistry::ChemistryProfile;
use crate::config::WebConfig;
use crate::error::CellbenchError;
use crate::monitor::{APP_VERSION, CellMonitor, MonitorSnapshot};
use axum::response::Redirect;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tower_http::services::ServeDir;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Mutex<CellMonitor>>,
    pub snapshot_rx: watch::Receiver<Arc<MonitorSnapshot>>,
}

impl AppState {
    pub fn new(monitor: Arc<Mutex<CellMonitor>>, snapshot_rx: watch::Receiver<Arc<MonitorSnapshot>>) -> Self {
        Self {
            monitor,
            snapshot_rx,
        }
    }

    fn latest(&self) -> Arc<MonitorSnapshot> {
        self.snapshot_rx.borrow().clone()
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BenchBody {
    pub name: String,
    pub group_number: u32,
}

fn error_response(err: CellbenchError) -> Response {
    let status = match &err {
        CellbenchError::UnknownChemistry { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CellbenchError::Validation { .. } | CellbenchError::Config { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

fn snapshot_response(result: crate::error::Result<Arc<MonitorSnapshot>>) -> Response {
    match result {
        Ok(snapshot) => Json(snapshot.as_ref().clone()).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/health", responses(
    (status = 200, description = "Service is healthy")
)))]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/version", responses((status = 200))))]
pub async fn version() -> impl IntoResponse {
    Json(serde_json::json!({"version": APP_VERSION}))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/snapshot", responses(
    (status = 200, description = "Latest evaluated bench", body = MonitorSnapshot)
)))]
pub async fn snapshot(State(state): State<AppState>) -> Json<MonitorSnapshot> {
    Json(state.latest().as_ref().clone())
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/cells", responses(
    (status = 200, body = [CellResult])
)))]
pub async fn cells(State(state): State<AppState>) -> Json<Vec<CellResult>> {
    Json(state.latest().cells.clone())
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/api/cells/{index}",
    params(("index" = usize, Path, description = "1-based cell slot")),
    request_body = CellReading,
    responses((status = 200, body = MonitorSnapshot), (status = 400), (status = 404), (status = 422))
))]
pub async fn put_cell(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(reading): Json<CellReading>,
) -> Response {
    let mut m = state.monitor.lock().await;
    let slots = m.state().readings.len();
    if index == 0 || index > slots {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("Cell index must be between 1 and {}", slots)
            })),
        )
            .into_response();
    }
    snapshot_response(m.set_cell(index, reading))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/cells/randomize", responses((status = 200, body = MonitorSnapshot))))]
pub async fn randomize(State(state): State<AppState>) -> Response {
    let mut m = state.monitor.lock().await;
    snapshot_response(m.randomize())
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/monitoring/start", responses((status = 200, body = MonitorSnapshot))))]
pub async fn start_monitoring(State(state): State<AppState>) -> Response {
    let mut m = state.monitor.lock().await;
    snapshot_response(m.start_monitoring())
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/monitoring/stop", responses((status = 200, body = MonitorSnapshot))))]
pub async fn stop_monitoring(State(state): State<AppState>) -> Response {
    let mut m = state.monitor.lock().await;
    snapshot_response(m.stop_monitoring())
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/api/bench", request_body = BenchBody,
    responses((status = 200, body = MonitorSnapshot), (status = 400))
))]
pub async fn put_bench(State(state): State<AppState>, Json(body): Json<BenchBody>) -> Response {
    let mut m = state.monitor.lock().await;
    snapshot_response(m.set_bench(&body.name, body.group_number))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/alerts", responses((status = 200))))]
pub async fn alerts(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.latest();
    Json(serde_json::json!({
        "all_normal": snap.all_normal(),
        "alerts": snap.alerts,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/summary", responses((status = 200))))]
pub async fn summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.latest().summary.clone())
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/chemistries", responses((status = 200, body = [ChemistryProfile]))))]
pub async fn chemistries(State(state): State<AppState>) -> Json<Vec<ChemistryProfile>> {
    let m = state.monitor.lock().await;
    Json(m.profiles().profiles().to_vec())
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config", responses((status = 200))))]
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.monitor.lock().await;
    Json(serde_json::to_value(m.config()).unwrap_or(serde_json::json!({"error":"serialization"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config/schema", responses((status = 200))))]
pub async fn get_config_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or(serde_json::json!({"error":"schema"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config/ui_schema", responses((status = 200))))]
pub async fn get_ui_schema(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.monitor.lock().await;
    Json(crate::web_schema::build_ui_schema(m.profiles()))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/events", responses((status = 200))))]
pub async fn events(State(state): State<AppState>) -> impl IntoResponse {
    // The current snapshot is sent first, then one event per publish
    let stream = WatchStream::new(state.snapshot_rx.clone()).filter_map(|snap| {
        serde_json::to_string(snap.as_ref())
            .ok()
            .map(|payload| Ok::<Event, std::convert::Infallible>(Event::default().event("snapshot").data(payload)))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        health, version, snapshot, cells, put_cell, randomize,
        start_monitoring, stop_monitoring, put_bench,
        alerts, summary, chemistries,
        get_config, get_config_schema, get_ui_schema, events,
        logs::logs_tail, logs::logs_head, logs::logs_download, logs::logs_stream,
        logs::set_web_log_level, logs::get_web_log_level,
    ),
    components(schemas(BenchBody, CellReading, CellResult, ChemistryProfile, MonitorSnapshot)),
    tags((name = "cellbench", description = "Cellbench battery bench API"))
)]
pub struct ApiDoc;

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let router = Router::new()
        .route("/", get(|| async { Redirect::to("/ui/index.html") }))
        .route("/api/health", get(health))
        .route("/api/version", get(version))
        .route("/api/snapshot", get(snapshot))
        .route("/api/cells", get(cells))
        .route("/api/cells/randomize", post(randomize))
        .route("/api/cells/{index}", put(put_cell))
        .route("/api/monitoring/start", post(start_monitoring))
        .route("/api/monitoring/stop", post(stop_monitoring))
        .route("/api/bench", put(put_bench))
        .route("/api/alerts", get(alerts))
        .route("/api/summary", get(summary))
        .route("/api/chemistries", get(chemistries))
        .route("/api/config", get(get_config))
        .route("/api/config/schema", get(get_config_schema))
        .route("/api/config/ui_schema", get(get_ui_schema))
        .route("/api/events", get(events))
        .merge(logs::routes())
        .nest_service(
            "/ui",
            ServeDir::new(static_dir).append_index_html_on_directories(true),
        );

    #[cfg(feature = "openapi")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
        )
    };

    let router = router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "compression")]
    let router = router.layer(tower_http::compression::CompressionLayer::new());

    router
}

/// Bind and serve until `shutdown` flips to `true` or its sender is dropped
pub async fn serve(
    monitor: Arc<Mutex<CellMonitor>>,
    web: &WebConfig,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let snapshot_rx = monitor.lock().await.subscribe_snapshot();
    let router = build_router(AppState::new(monitor, snapshot_rx), &web.static_dir);

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        web.host, web.port
    ));

    let addr = match web.host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, web.port),
        Err(_) => {
            logger.warn(&format!(
                "Invalid host '{}'; falling back to 127.0.0.1",
                web.host
            ));
            SocketAddr::from(([127, 0, 0, 1], web.port))
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CellbenchError::web(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (UI /ui, API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;
    logger.info("Web server stopped");
    Ok(())
}
