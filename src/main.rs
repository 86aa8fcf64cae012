//! SMS Relay
//!
//! Accepts SMS uploads from phones over HTTP, keeps an archive for the
//! dashboard and export endpoints, and forwards records downstream in
//! batches: on reaching the batch size, or after an idle window with no
//! new uploads.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use clickhouse_client::ClickHouseSink;
use outbox::{FlushOutcome, IngestBuffer, LogSink, MailRelaySink, RecordArchive, SinkKind};
use relay_core::RecordSink;
use telemetry::{health, init_tracing_from_env};

use crate::config::{load_config, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting SMS Relay v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    config.validate()?;

    info!(
        sink = ?config.outbox.sink,
        batch_size = config.outbox.batch_size,
        idle_window_secs = config.outbox.idle_window_secs,
        "Loaded outbox config"
    );

    let sink = build_sink(&config).await?;
    check_health(sink.as_ref()).await;

    let archive = Arc::new(match config.outbox.archive_path {
        Some(ref path) => RecordArchive::open(path)
            .await
            .context("Failed to open archive file")?,
        None => RecordArchive::in_memory(),
    });

    let buffer = IngestBuffer::new(config.outbox.buffer_config(), sink);

    let state = AppState::new(buffer.clone(), archive);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");

    // Send whatever is still buffered
    match buffer.shutdown().await {
        FlushOutcome::Requeued(count) => {
            error!(count = count, "Final flush failed; buffered records were not delivered")
        }
        outcome => info!(outcome = ?outcome, "Final flush complete"),
    }

    info!("Shutdown complete");
    Ok(())
}

/// Build the configured downstream sink.
async fn build_sink(config: &Config) -> Result<Arc<dyn RecordSink>> {
    let sink: Arc<dyn RecordSink> = match config.outbox.sink {
        SinkKind::Mail => Arc::new(
            MailRelaySink::new(config.mail.clone()).context("Failed to create mail relay sink")?,
        ),
        SinkKind::ClickHouse => {
            let sink = ClickHouseSink::new(config.clickhouse.clone())
                .context("Failed to create ClickHouse client")?;

            if let Err(e) = sink.init_schema().await {
                // Flushes fail and requeue until ClickHouse is reachable
                error!("Failed to initialize ClickHouse schema: {}", e);
            }
            Arc::new(sink)
        }
        SinkKind::Log => Arc::new(LogSink),
    };

    Ok(sink)
}

/// Probe the sink on startup. Failure is reported, not fatal.
async fn check_health(sink: &dyn RecordSink) {
    if sink.health_check().await {
        health().sink.set_healthy();
        info!(sink = sink.name(), "Sink: healthy");
    } else {
        health().sink.set_unhealthy("Startup check failed");
        warn!(sink = sink.name(), "Sink: unhealthy, records will buffer until it recovers");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
