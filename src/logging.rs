//! Structured logging and tracing for Cellbench
//!
//! Console, rotating file and web-stream layers on top of `tracing`, each
//! with its own level. The web layer feeds a broadcast channel that the
//! `/api/logs/stream` endpoint turns into server-sent events.

use crate::config::LoggingConfig;
use crate::error::{CellbenchError, Result};
use std::path::Path;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod broadcast;
mod level;
mod state;
mod structured;

pub use broadcast::subscribe_log_lines;
pub use level::{level_rank, parse_line_level, parse_log_level, set_web_log_level_str};
pub use state::{get_web_log_level, set_web_log_level};
pub use structured::{LogContext, StructuredLogger, get_logger, get_logger_with_context};

use broadcast::LogLineSink;
use level::min_level;
use state::{INIT_ERROR, INIT_ONCE, LOG_GUARD};

/// Environment flag that forces console-only logging
pub const DISABLE_FILE_LOG_ENV: &str = "CELLBENCH_DISABLE_FILE_LOG";

/// Initialize logging system based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let base_level = parse_log_level(&config.level)?;

            let override_or_base = |s: &Option<String>| {
                s.as_deref()
                    .and_then(|s| parse_log_level(s).ok())
                    .unwrap_or(base_level)
            };
            let console_level = override_or_base(&config.console_level);
            let file_level = override_or_base(&config.file_level);
            let web_level = override_or_base(&config.web_level);

            // Most verbose of the three so per-layer filters can narrow it down
            let most_verbose = min_level(min_level(console_level, file_level), web_level);
            let filter = build_env_filter(most_verbose);

            if should_use_console_only() {
                init_console_only_logging(filter, config.json_format, console_level, web_level);
            } else {
                init_file_logging(config, filter, console_level, file_level, web_level)?;
            }
            set_web_log_level(web_level);
            Ok(())
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(CellbenchError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("cellbench={},tower_http=warn", level).into())
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os(DISABLE_FILE_LOG_ENV).is_some()
}

fn broadcast_layer<S>(json_format: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let base = fmt::layer()
        .with_writer(LogLineSink::new())
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    // Capture everything; the SSE endpoint applies the runtime web level
    if json_format {
        base.json().with_filter(LevelFilter::TRACE).boxed()
    } else {
        base.with_filter(LevelFilter::TRACE).boxed()
    }
}

fn console_layer<S>(json_format: bool, level: Level) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let base = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json_format {
        base.json()
            .with_filter(LevelFilter::from_level(level))
            .boxed()
    } else {
        base.with_filter(LevelFilter::from_level(level)).boxed()
    }
}

fn init_console_only_logging(
    filter: EnvFilter,
    json_format: bool,
    console_level: Level,
    web_level: Level,
) {
    // try_init: a subscriber may already be installed (tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(json_format, console_level))
        .with(broadcast_layer(json_format))
        .try_init();

    info!(
        "Logging initialized - console_level: {:?}, web_level: {:?}, console-only",
        console_level, web_level
    );
}

fn init_file_logging(
    config: &LoggingConfig,
    filter: EnvFilter,
    console_level: Level,
    file_level: Level,
    web_level: Level,
) -> Result<()> {
    // "<dir>/<stem>.<ext>" rotates as "<dir>/<stem>.<date>.<ext>"; a bare
    // directory gets "cellbench.<date>.log"
    let configured = Path::new(&config.file);
    let (dir, prefix, suffix) = match (configured.file_stem(), configured.extension()) {
        (Some(stem), Some(ext)) => (
            configured
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(".")),
            stem.to_string_lossy().into_owned(),
            ext.to_string_lossy().into_owned(),
        ),
        _ => (configured, "cellbench".to_string(), "log".to_string()),
    };
    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(suffix)
        .max_log_files(config.backup_count.max(1) as usize)
        .build(dir)
        .map_err(|e| CellbenchError::io(format!("Failed to create log file appender: {}", e)))?;

    let (non_blocking_appender, guard) = non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let file_layer = {
        let base = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false);
        if config.json_format {
            base.json()
                .with_filter(LevelFilter::from_level(file_level))
                .boxed()
        } else {
            base.with_filter(LevelFilter::from_level(file_level))
                .boxed()
        }
    };

    let console = config
        .console_output
        .then(|| console_layer(config.json_format, console_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(broadcast_layer(config.json_format))
        .with(console)
        .try_init()
        .map_err(|e| CellbenchError::config(format!("Logging already initialized: {}", e)))?;

    info!(
        "Logging initialized - console_level: {:?}, file_level: {:?}, web_level: {:?}, file: {}",
        console_level, file_level, web_level, config.file
    );
    Ok(())
}

/// Whether a formatted line passes the current runtime web level
pub fn should_emit_to_web(line: &str) -> bool {
    let current = get_web_log_level();
    match parse_line_level(line) {
        Some(line_lvl) => level_rank(line_lvl) >= level_rank(current),
        None => true,
    }
}
