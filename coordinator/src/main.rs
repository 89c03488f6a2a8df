use clap::Parser;
use coordinator::cli::Cli;
use coordinator::config::{Config, SystemClock};
use coordinator::connection::{self, AppState};
use coordinator::coordinator::Coordinator;
use coordinator::scanner;
use engine::ReferenceEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("fatal: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }
    for raw in &cli.overrides {
        config.apply_override(raw)?;
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    let close_timeout = Duration::from_secs(config.close_timeout_sec);
    let bind_addr = format!("{}:{}", config.server_host, config.server_port);

    let coordinator = Coordinator::new(config.clone(), Box::new(ReferenceEngine), Arc::new(SystemClock));
    let gates = coordinator.tick_gates();

    let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();

    scanner::spawn_timers(&config, gates, tick_tx);

    let coordinator_task = tokio::spawn(coordinator.run(mailbox_rx, tick_rx));

    let shutdown_mailbox = mailbox_tx.clone();
    tokio::spawn(coordinator::shutdown::wait_for_signal(shutdown_mailbox));

    let app = connection::router(AppState { mailbox: mailbox_tx });
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind_addr}: {e}"))?;
    tracing::info!(address = %bind_addr, "listening");

    let serve_task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(?err, "http server error");
        }
    });

    coordinator::shutdown::drain(coordinator_task, close_timeout).await;
    serve_task.abort();
    Ok(())
}
