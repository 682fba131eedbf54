use anyhow::Result;
use cellbench::config::Config;
use cellbench::logging::{get_logger, init_logging};
use cellbench::monitor::{APP_VERSION, CellMonitor, supervise};
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let logger = get_logger("main");
    logger.info(&format!("Cellbench {} starting up", APP_VERSION));

    let web_config = config.web.clone();
    let bench = CellMonitor::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to create monitor: {}", e))?;
    let bench = Arc::new(Mutex::new(bench));

    let ctrl_c_logger = logger.clone();
    supervise(bench, web_config, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            ctrl_c_logger.error(&format!("Failed to listen for Ctrl-C: {}", e));
            std::future::pending::<()>().await;
        }
    })
    .await
}
