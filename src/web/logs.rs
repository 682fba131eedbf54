//! Log file access and live log streaming

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use super::AppState;

const DEFAULT_LINES: usize = 200;
const MAX_LINES: usize = 10_000;
const FALLBACK_PREFIX: &str = "cellbench";

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct LinesParams {
    pub lines: Option<usize>,
}

impl LinesParams {
    fn limit(&self) -> usize {
        self.lines.unwrap_or(DEFAULT_LINES).min(MAX_LINES)
    }
}

#[derive(Clone, Copy)]
enum Window {
    Head,
    Tail,
}

fn select_lines(contents: &str, window: Window, max_lines: usize) -> String {
    let lines: Vec<&str> = contents.lines().collect();
    let picked = match window {
        Window::Head => &lines[..lines.len().min(max_lines)],
        Window::Tail => &lines[lines.len().saturating_sub(max_lines)..],
    };
    picked.join("\n")
}

fn not_available() -> Response {
    (StatusCode::NOT_FOUND, "Log file not available").into_response()
}

async fn configured_log_path(state: &AppState) -> String {
    state.monitor.lock().await.config().logging.file.clone()
}

async fn read_window(state: &AppState, window: Window, max_lines: usize) -> Response {
    let configured = configured_log_path(state).await;
    let Some(path) = resolve_log_file_path(&configured).await else {
        return not_available();
    };
    match fs::read_to_string(&path).await {
        Ok(contents) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            select_lines(&contents, window, max_lines),
        )
            .into_response(),
        Err(_) => not_available(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/tail", params(LinesParams), responses((status = 200), (status = 404))))]
pub async fn logs_tail(State(state): State<AppState>, Query(params): Query<LinesParams>) -> Response {
    read_window(&state, Window::Tail, params.limit()).await
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/head", params(LinesParams), responses((status = 200), (status = 404))))]
pub async fn logs_head(State(state): State<AppState>, Query(params): Query<LinesParams>) -> Response {
    read_window(&state, Window::Head, params.limit()).await
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/download", responses((status = 200), (status = 404))))]
pub async fn logs_download(State(state): State<AppState>) -> Response {
    let configured = configured_log_path(&state).await;
    let Some(path) = resolve_log_file_path(&configured).await else {
        return not_available();
    };
    match fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response(),
        Err(_) => not_available(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/stream", responses((status = 200))))]
pub async fn logs_stream() -> impl IntoResponse {
    let rx = crate::logging::subscribe_log_lines();
    // Lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|res| match res {
        Ok(line) if crate::logging::should_emit_to_web(&line) => Some(Ok::<
            Event,
            std::convert::Infallible,
        >(
            Event::default().event("log").data(line),
        )),
        _ => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Rotated files are named `<stem>.<date>.<ext>` or `<stem>.<ext>.<date>`
fn name_matches(file_name: &str, prefix: &str, suffix: &str) -> bool {
    if file_name == format!("{prefix}.{suffix}") {
        return true;
    }
    (file_name.starts_with(prefix) && file_name.ends_with(&format!(".{suffix}")))
        || (file_name.starts_with(&format!("{prefix}."))
            && file_name.contains(&format!(".{suffix}.")))
}

fn derive_search_spec(configured: &Path) -> (PathBuf, String, String) {
    match (configured.file_stem(), configured.extension()) {
        (Some(stem), Some(ext)) => (
            configured
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
            stem.to_string_lossy().into_owned(),
            ext.to_string_lossy().into_owned(),
        ),
        _ => (
            configured.to_path_buf(),
            FALLBACK_PREFIX.to_string(),
            "log".to_string(),
        ),
    }
}

async fn find_latest_matching(search_dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    let mut best: Option<(SystemTime, PathBuf)> = None;
    let mut stack = vec![search_dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(mut rd) = fs::read_dir(&dir).await else {
            continue;
        };
        while let Ok(Some(entry)) = rd.next_entry().await {
            let Ok(ft) = entry.file_type().await else {
                continue;
            };
            if ft.is_dir() {
                stack.push(entry.path());
                continue;
            }
            if ft.is_file()
                && let Some(name) = entry.file_name().to_str()
                && name_matches(name, prefix, suffix)
                && let Ok(md) = entry.metadata().await
                && let Ok(modified) = md.modified()
                && best.as_ref().is_none_or(|(t, _)| modified > *t)
            {
                best = Some((modified, entry.path()));
            }
        }
    }
    best.map(|(_, path)| path)
}

/// The configured file when it exists, otherwise the newest rotated sibling
async fn resolve_log_file_path(configured_path: &str) -> Option<PathBuf> {
    let configured = Path::new(configured_path);
    if let Ok(md) = fs::metadata(configured).await
        && md.is_file()
    {
        return Some(configured.to_path_buf());
    }
    let (search_dir, prefix, suffix) = derive_search_spec(configured);
    find_latest_matching(&search_dir, &prefix, &suffix).await
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct WebLevelQuery {
    level: String,
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/logs/web_level", params(WebLevelQuery), responses((status = 200), (status = 400))))]
pub async fn set_web_log_level(Query(q): Query<WebLevelQuery>) -> impl IntoResponse {
    match crate::logging::set_web_log_level_str(&q.level) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "level": q.level.to_uppercase()})),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        ),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/web_level", responses((status = 200))))]
pub async fn get_web_log_level() -> impl IntoResponse {
    let level = crate::logging::get_web_log_level();
    Json(serde_json::json!({"level": level.to_string()}))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/logs/tail", get(logs_tail))
        .route("/api/logs/head", get(logs_head))
        .route("/api/logs/download", get(logs_download))
        .route("/api/logs/stream", get(logs_stream))
        .route(
            "/api/logs/web_level",
            get(get_web_log_level).post(set_web_log_level),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "one\ntwo\nthree\nfour";

    #[test]
    fn head_and_tail_windows() {
        assert_eq!(select_lines(LOG, Window::Head, 2), "one\ntwo");
        assert_eq!(select_lines(LOG, Window::Tail, 2), "three\nfour");
        assert_eq!(select_lines(LOG, Window::Tail, 10), LOG);
        assert_eq!(select_lines("", Window::Head, 5), "");
    }

    #[test]
    fn rotated_names_match() {
        assert!(name_matches("cellbench.log", "cellbench", "log"));
        assert!(name_matches("cellbench.2026-10-19.log", "cellbench", "log"));
        assert!(name_matches("cellbench.log.2026-10-19", "cellbench", "log"));
        assert!(!name_matches("other.txt", "cellbench", "log"));
    }

    #[test]
    fn search_spec_from_file_path() {
        let (dir, prefix, suffix) = derive_search_spec(Path::new("/var/log/bench.log"));
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(prefix, "bench");
        assert_eq!(suffix, "log");

        let (dir, prefix, _) = derive_search_spec(Path::new("/var/log/cellbench"));
        assert_eq!(dir, PathBuf::from("/var/log/cellbench"));
        assert_eq!(prefix, FALLBACK_PREFIX);
    }

    #[tokio::test]
    async fn resolves_newest_rotated_file() {
        let dir = tempfile::tempdir().unwrap();
        let rotated = dir.path().join("bench.log.2026-10-19");
        std::fs::write(&rotated, "x").unwrap();
        let configured = dir.path().join("bench.log");
        let found = resolve_log_file_path(configured.to_str().unwrap()).await;
        assert_eq!(found, Some(rotated));
    }
}
