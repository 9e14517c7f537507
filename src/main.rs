//! Privacy monitor - command-line front end
//!
//! Feeds node snapshots from a replay file, the REPL or stdin into the
//! monitor and renders the indicators on the console or as status-line JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use privacy_monitor::backend::{JsonLinesSource, NodeSource, ReplaySource, Scenario};
use privacy_monitor::cli::ReplSource;
use privacy_monitor::config::{ConfigWatcher, PrivacyConfig};
use privacy_monitor::monitor::{MonitorActor, MonitorHandle};
use privacy_monitor::paths::AppPaths;
use privacy_monitor::presentation::{ConsoleSink, PresentationSink, StatusLineSink};
use privacy_monitor::visibility::VisibilityDebouncer;

/// Extra time after a source finishes so a pending hide can still land
const LINGER_GRACE: Duration = Duration::from_millis(250);

/// Privacy monitor - debounced camera, microphone and screen-share indicators
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to a daily rolling file in the logs directory
    #[arg(long)]
    log_file: bool,

    /// Replay a scenario file instead of reading snapshots from stdin
    #[arg(long, value_name = "SCENARIO", conflicts_with = "repl")]
    replay: Option<PathBuf>,

    /// Drive the monitor interactively
    #[arg(long)]
    repl: bool,

    /// Print one JSON status line per change on stdout (logs go to stderr)
    #[arg(long)]
    status_line: bool,

    /// Start with the container visible, as if something had been in use
    #[arg(long)]
    start_visible: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let paths = AppPaths::detect();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args.log_level, args.log_file.then_some(&paths))?;

    info!("Starting privacy monitor v{}...", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    info!("Configuration file: {}", config_path.display());

    // Hot reload only makes sense for a file that exists
    let (mut config_watcher, config) = if config_path.exists() {
        let (watcher, config) = ConfigWatcher::new(config_path.clone()).await?;
        (Some(watcher), config)
    } else {
        (None, PrivacyConfig::load(&config_path).await?)
    };

    if args.dump_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let source: Box<dyn NodeSource> = if let Some(path) = &args.replay {
        let scenario = Scenario::load(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?;
        Box::new(ReplaySource::new(scenario))
    } else if args.repl {
        Box::new(ReplSource::new())
    } else {
        Box::new(JsonLinesSource::stdin())
    };

    let sink: Box<dyn PresentationSink> = if args.status_line {
        Box::new(StatusLineSink::stdout())
    } else {
        Box::new(ConsoleSink::default())
    };

    let monitor = if args.start_visible {
        let debouncer = VisibilityDebouncer::from_config(&config).starting_visible();
        MonitorActor::spawn_with_debouncer(&config, debouncer, sink)
    } else {
        MonitorActor::spawn(&config, sink)
    };

    info!("Reading nodes from '{}'", source.name());
    let source_done = spawn_source(source, monitor.clone())?;

    run_app(monitor, config, &mut config_watcher, source_done, shutdown_signal()).await;

    info!("Privacy monitor shutdown complete");
    Ok(())
}

async fn run_app(
    monitor: MonitorHandle,
    mut config: PrivacyConfig,
    config_watcher: &mut Option<ConfigWatcher>,
    mut source_done: oneshot::Receiver<Result<()>>,
    shutdown: impl std::future::Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Source exhausted or user quit
            result = &mut source_done => {
                match result {
                    Ok(Ok(())) => info!("Node source finished"),
                    Ok(Err(e)) => error!("Node source failed: {:#}", e),
                    Err(_) => error!("Node source thread exited unexpectedly"),
                }

                let linger = Duration::from_millis(config.transition_duration) + LINGER_GRACE;
                tokio::select! {
                    _ = tokio::time::sleep(linger) => {}
                    _ = &mut shutdown => {}
                }
                break;
            }

            // Handle config reload
            Some(new_config) = next_reload(config_watcher) => {
                info!("📝 Configuration file changed, reloading...");
                if new_config == config {
                    info!("Configuration unchanged");
                    continue;
                }
                monitor.reconfigure(new_config.clone());
                config = new_config;
                info!("✅ Configuration reloaded (tracking {:?})", config.tracked_categories());
            }

            // Handle shutdown signal
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    monitor.shutdown();
}

/// Run a source on its own named OS thread
///
/// Not a `spawn_blocking` task: a source blocked on stdin would otherwise
/// keep the runtime from shutting down.
fn spawn_source(
    source: Box<dyn NodeSource>,
    monitor: MonitorHandle,
) -> Result<oneshot::Receiver<Result<()>>> {
    let (done_tx, done_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name(format!("source-{}", source.name()))
        .spawn(move || {
            let _ = done_tx.send(source.run(monitor));
        })
        .context("Failed to spawn node source thread")?;
    Ok(done_rx)
}

async fn next_reload(watcher: &mut Option<ConfigWatcher>) -> Option<PrivacyConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str, file_paths: Option<&AppPaths>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout may carry status-line JSON, so terminal logs go to stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match file_paths {
        Some(paths) => {
            paths.ensure_directories()?;
            let appender = tracing_appender::rolling::daily(&paths.logs_dir, "privacy-monitor.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(paths) = file_paths {
        info!("Logging to {}", paths.logs_dir.display());
    }

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
