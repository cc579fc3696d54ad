//! `sse-clock`: show the local date and time on a SteelSeries Engine screen.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use futures::FutureExt;
use tracing::{error, info, warn};

use sse_clock::clock::{DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};
use sse_clock::core::REQUEST_TIMEOUT;
use sse_clock::logging::{self, LogOptions};
use sse_clock::prelude::*;

#[derive(Parser)]
#[command(name = "sse-clock")]
#[command(version, about = "Show the local date and time on a SteelSeries Engine screen")]
struct Cli {
    /// Path of the engine's coreProps.json (default: platform location)
    #[arg(long, env = "SSE_CLOCK_CORE_PROPS")]
    core_props: Option<PathBuf>,

    /// Directory of sseClock.log (default: system temp directory)
    #[arg(long, env = "SSE_CLOCK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,

    /// strftime pattern of the date line
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// strftime pattern of the time line
    #[arg(long, default_value = DEFAULT_TIME_FORMAT)]
    time_format: String,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT.as_millis() as u64)]
    request_timeout_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_options = LogOptions {
        directory: if cli.no_log_file {
            None
        } else {
            Some(cli.log_dir.clone().unwrap_or_else(std::env::temp_dir))
        },
        ..LogOptions::default()
    };
    let log_path = logging::init(&log_options).context("failed to initialize logging")?;

    let discovery = match &cli.core_props {
        Some(path) => FileDiscovery::new(path),
        None => FileDiscovery::from_default_location().context("cannot locate coreProps.json")?,
    };
    let config = ClockConfigBuilder::new()
        .request_timeout(Duration::from_millis(cli.request_timeout_ms))
        .build();
    let transport = HttpTransport::new(config.identity.clone(), config.request_timeout)
        .context("failed to build HTTP client")?;
    let clock = LocalClock::new(&cli.date_format, &cli.time_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        core_props = %discovery.path().display(),
        log_file = ?log_path,
        "starting"
    );

    let (trigger, token) = shutdown_channel();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("received shutdown signal");
        trigger.stop();
    });

    let watcher = match AddressWatcher::new(discovery.path()) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            warn!(error = %err, "cannot watch coreProps.json, polling only");
            None
        }
    };

    let mut session = SessionStateMachine::new(config, discovery, transport, clock, token);
    if let Some(watcher) = &watcher {
        session = session.with_wake(watcher.wake());
    }
    if let Err(panic) = AssertUnwindSafe(session.run()).catch_unwind().await {
        error!(reason = panic_message(panic.as_ref()), "fatal error, exiting");
        std::process::exit(1);
    }

    info!("stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(err) => warn!(error = %err, "cannot listen for SIGTERM"),
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
