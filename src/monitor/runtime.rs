use super::CellMonitor;
use crate::config::WebConfig;
use crate::error::Result;
use crate::logging::{StructuredLogger, get_logger};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval, timeout};

/// How long a task may take to stop once shutdown is signalled
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Timer-driven tick handler.
///
/// Every refresh interval, perturbs and re-evaluates the bench if monitoring
/// is on. Runs until `shutdown` flips to `true` or its sender is dropped.
pub async fn run(
    monitor: Arc<Mutex<CellMonitor>>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (period, logger) = {
        let m = monitor.lock().await;
        (m.refresh_interval(), m.logger().clone())
    };
    logger.info(&format!(
        "Tick loop started; refresh interval {} ms",
        period.as_millis()
    ));

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut m = monitor.lock().await;
                if let Err(e) = m.tick() {
                    logger.error(&format!("Tick evaluation failed: {}", e));
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    logger.info("Tick loop stopped");
    Ok(())
}

type Joined<E> = std::result::Result<std::result::Result<(), E>, JoinError>;

fn task_failure<E: Display>(name: &str, joined: Joined<E>) -> Option<String> {
    match joined {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(format!("{} failed: {}", name, e)),
        Err(e) => Some(format!("{} task aborted: {}", name, e)),
    }
}

async fn drain<E: Display>(
    name: &str,
    mut handle: JoinHandle<std::result::Result<(), E>>,
    logger: &StructuredLogger,
) -> Option<String> {
    match timeout(SHUTDOWN_GRACE, &mut handle).await {
        Ok(joined) => task_failure(name, joined),
        Err(_) => {
            logger.warn(&format!(
                "{} still busy after {} s; aborting",
                name,
                SHUTDOWN_GRACE.as_secs()
            ));
            handle.abort();
            None
        }
    }
}

/// Run the web server and the tick loop until `stop` resolves.
///
/// Either task ending on its own (bind failure, panic, early return) stops
/// the other one and is reported as an error.
pub async fn supervise<F>(
    monitor: Arc<Mutex<CellMonitor>>,
    web: WebConfig,
    stop: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let logger = get_logger("runtime");
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let web_monitor = monitor.clone();
    let web_shutdown = shutdown_rx.clone();
    let mut web_task = tokio::spawn(async move {
        crate::web::serve(web_monitor, &web, web_shutdown).await
    });
    let mut tick_task = tokio::spawn(run(monitor, shutdown_rx));

    let mut web_exit = None;
    let mut tick_exit = None;
    tokio::select! {
        _ = stop => logger.info("Shutdown requested"),
        joined = &mut web_task => {
            web_exit = Some(task_failure("Web server", joined)
                .unwrap_or_else(|| "Web server stopped unexpectedly".to_string()));
        }
        joined = &mut tick_task => {
            tick_exit = Some(task_failure("Tick loop", joined)
                .unwrap_or_else(|| "Tick loop stopped unexpectedly".to_string()));
        }
    }
    let _ = shutdown_tx.send(true);

    let web_failure = match web_exit {
        Some(msg) => Some(msg),
        None => drain("Web server", web_task, &logger).await,
    };
    let tick_failure = match tick_exit {
        Some(msg) => Some(msg),
        None => drain("Tick loop", tick_task, &logger).await,
    };

    let failures: Vec<String> = web_failure.into_iter().chain(tick_failure).collect();
    if failures.is_empty() {
        logger.info("Shutdown complete");
        return Ok(());
    }
    for failure in &failures {
        logger.error(failure);
    }
    Err(anyhow::anyhow!(failures.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn local_web(port: u16) -> WebConfig {
        let mut web = Config::default().web;
        web.host = "127.0.0.1".to_string();
        web.port = port;
        web
    }

    #[tokio::test]
    async fn publishes_snapshots_while_monitoring_and_stops_on_shutdown() {
        let mut config = Config::default();
        config.simulation.refresh_interval_ms = 10;
        config.simulation.start_monitoring = true;
        config.simulation.seed = Some(1);
        let monitor = Arc::new(Mutex::new(CellMonitor::new(config).unwrap()));
        let mut snapshots = monitor.lock().await.subscribe_snapshot();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(monitor.clone(), shutdown_rx));

        let saw_tick = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if snapshots.changed().await.is_err() {
                    return false;
                }
                if snapshots.borrow().tick_count > 0 {
                    return true;
                }
            }
        })
        .await;
        assert_eq!(saw_tick, Ok(true));

        shutdown_tx.send(true).unwrap();
        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(matches!(joined, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn idle_monitor_does_not_tick() {
        let mut config = Config::default();
        config.simulation.refresh_interval_ms = 5;
        let monitor = Arc::new(Mutex::new(CellMonitor::new(config).unwrap()));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(monitor.clone(), shutdown_rx));
        tokio::time::sleep(Duration::from_millis(40)).await;
        drop(shutdown_tx);
        let _ = handle.await;

        assert_eq!(monitor.lock().await.state().tick_count, 0);
    }

    #[tokio::test]
    async fn supervise_stops_cleanly_on_request() {
        let monitor = Arc::new(Mutex::new(CellMonitor::new(Config::default()).unwrap()));
        let stop = tokio::time::sleep(Duration::from_millis(50));
        let outcome = timeout(Duration::from_secs(5), supervise(monitor, local_web(0), stop)).await;
        assert!(matches!(outcome, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn supervise_fails_fast_when_port_is_taken() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let monitor = Arc::new(Mutex::new(CellMonitor::new(Config::default()).unwrap()));

        // never asks to stop; only the bind failure can end it
        let outcome = timeout(
            Duration::from_secs(5),
            supervise(monitor, local_web(port), std::future::pending()),
        )
        .await
        .expect("supervise kept running after the web server failed");
        let err = outcome.unwrap_err();
        assert!(err.to_string().contains("Web server failed"), "{}", err);
    }
}
